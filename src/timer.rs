use tokio::task::JoinHandle;

/// Owns the background task behind a poller or countdown.
///
/// Stopping the handle, or dropping it, cancels any pending delay or
/// in-flight request, so a display that goes away never leaves a timer
/// running behind it.
#[derive(Debug)]
pub struct TimerHandle {
    task: Option<JoinHandle<()>>,
}

impl TimerHandle {
    pub fn spawn<F>(future: F) -> Self
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        Self {
            task: Some(tokio::spawn(future)),
        }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    #[cfg(test)]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|t| t.is_finished())
    }

    /// Wait for the task to end on its own. Returns immediately if the
    /// handle was already stopped.
    #[cfg(test)]
    pub async fn finished(&mut self) {
        if let Some(task) = self.task.as_mut() {
            // a cancelled or panicked task still counts as finished
            let _ = task.await;
            self.task = None;
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn ticking(counter: Arc<AtomicU32>) -> impl std::future::Future<Output = ()> + Send {
        async move {
            loop {
                tokio::time::sleep(Duration::from_secs(1)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_timer() {
        let counter = Arc::new(AtomicU32::new(0));
        let mut handle = TimerHandle::spawn(ticking(counter.clone()));
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        handle.stop();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels_the_task() {
        let counter = Arc::new(AtomicU32::new(0));
        drop(TimerHandle::spawn(ticking(counter.clone())));
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn finished_waits_for_natural_end() {
        let mut handle = TimerHandle::spawn(async {
            tokio::time::sleep(Duration::from_secs(3)).await;
        });
        assert!(!handle.is_finished());
        handle.finished().await;
        assert!(handle.is_finished());
    }
}
