use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::countdown::target::{CountdownTarget, InvalidTarget, Remaining};
use crate::timer::TimerHandle;

pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// Text shown in place of a countdown whose target could not be parsed.
pub const INVALID_TARGET_TEXT: &str = "Invalid date";

/// Wall clock in epoch milliseconds.
pub trait Clock: Send + Sync + 'static {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub trait CountdownDisplay: Send + 'static {
    fn set_text(&mut self, text: &str);
}

/// Renders the time left until one target into one display, once a second.
pub struct CountdownTimer<D> {
    target: CountdownTarget,
    display: D,
    clock: Arc<dyn Clock>,
}

impl<D: CountdownDisplay> CountdownTimer<D> {
    pub fn new(target: CountdownTarget, display: D, clock: Arc<dyn Clock>) -> Self {
        Self {
            target,
            display,
            clock,
        }
    }

    /// Parse `raw` and start ticking into `display`.
    ///
    /// An unparseable target is reported once: the display gets a static
    /// error text and no timer is started.
    pub fn attach(
        raw: &str,
        mut display: D,
        clock: Arc<dyn Clock>,
    ) -> Result<TimerHandle, InvalidTarget> {
        match CountdownTarget::parse(raw) {
            Ok(target) => Ok(Self::new(target, display, clock).spawn()),
            Err(err) => {
                warn!(countdown = raw, error = %err, "invalid countdown target");
                display.set_text(INVALID_TARGET_TEXT);
                Err(err)
            }
        }
    }

    pub fn tick(&mut self) -> Remaining {
        let remaining = self.target.remaining_at(self.clock.now_millis());
        self.display.set_text(&remaining.to_string());
        remaining
    }

    /// Tick now, then every second until the handle is stopped.
    ///
    /// Ticking carries on past expiry, re-rendering "Expired".
    pub fn spawn(mut self) -> TimerHandle {
        let expired = self.tick().is_expired();
        TimerHandle::spawn(self.tick_forever(expired))
    }

    async fn tick_forever(mut self, mut expired: bool) {
        let mut ticks = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticks.tick().await;
            if self.tick().is_expired() && !expired {
                debug!(at = self.target.epoch_millis(), "countdown expired");
                expired = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Clock that follows tokio's (pausable) time from a fixed epoch.
    struct TokioClock {
        epoch_ms: i64,
        start: Instant,
    }

    impl TokioClock {
        fn at(epoch_ms: i64) -> Arc<dyn Clock> {
            Arc::new(Self {
                epoch_ms,
                start: Instant::now(),
            })
        }
    }

    impl Clock for TokioClock {
        fn now_millis(&self) -> i64 {
            self.epoch_ms + self.start.elapsed().as_millis() as i64
        }
    }

    #[derive(Clone, Default)]
    struct Texts(Arc<Mutex<Vec<String>>>);

    impl Texts {
        fn all(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }

        fn last(&self) -> Option<String> {
            self.0.lock().unwrap().last().cloned()
        }
    }

    impl CountdownDisplay for Texts {
        fn set_text(&mut self, text: &str) {
            self.0.lock().unwrap().push(text.to_string());
        }
    }

    const NOW: i64 = 1_900_000_000_000;

    fn target_in(ms: i64) -> CountdownTarget {
        CountdownTarget::from_epoch_millis(NOW + ms).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn renders_immediately_on_spawn() {
        let texts = Texts::default();
        let _handle =
            CountdownTimer::new(target_in(90_061_001), texts.clone(), TokioClock::at(NOW)).spawn();
        assert_eq!(texts.all(), vec!["1d 1h 1m 1s"]);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_every_second() {
        let texts = Texts::default();
        let _handle =
            CountdownTimer::new(target_in(90_061_001), texts.clone(), TokioClock::at(NOW)).spawn();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(
            texts.all(),
            vec!["1d 1h 1m 1s", "1d 1h 1m 0s", "1d 1h 0m 59s", "1d 1h 0m 58s"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn keeps_ticking_after_expiry() {
        let texts = Texts::default();
        let _handle =
            CountdownTimer::new(target_in(2_500), texts.clone(), TokioClock::at(NOW)).spawn();

        tokio::time::sleep(Duration::from_millis(4500)).await;
        assert_eq!(
            texts.all(),
            vec![
                "0d 0h 0m 2s",
                "0d 0h 0m 1s",
                "0d 0h 0m 0s",
                "Expired",
                "Expired"
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn past_target_is_expired() {
        let texts = Texts::default();
        let mut timer = CountdownTimer::new(target_in(-1), texts.clone(), TokioClock::at(NOW));
        assert_eq!(timer.tick(), Remaining::Expired);
        assert_eq!(texts.last().as_deref(), Some("Expired"));
    }

    #[tokio::test(start_paused = true)]
    async fn timers_are_independent() {
        let first = Texts::default();
        let second = Texts::default();
        let clock = TokioClock::at(NOW);
        let mut a = CountdownTimer::new(target_in(60_000), first.clone(), clock.clone()).spawn();
        tokio::time::sleep(Duration::from_millis(500)).await;
        let _b = CountdownTimer::new(target_in(-5_000), second.clone(), clock).spawn();

        tokio::time::sleep(Duration::from_millis(2000)).await;
        a.stop();
        tokio::time::sleep(Duration::from_millis(5200)).await;

        assert_eq!(first.all().len(), 3);
        assert_eq!(first.last().as_deref(), Some("0d 0h 0m 58s"));
        assert_eq!(second.all().len(), 8);
        assert!(second.all().iter().all(|t| t == "Expired"));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_target_is_reported_once() {
        let texts = Texts::default();
        let err = CountdownTimer::attach("next tuesday", texts.clone(), TokioClock::at(NOW))
            .unwrap_err();
        assert_eq!(err.raw, "next tuesday");

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(texts.all(), vec![INVALID_TARGET_TEXT]);
    }

    #[tokio::test(start_paused = true)]
    async fn attach_starts_a_valid_countdown() {
        let texts = Texts::default();
        let handle = CountdownTimer::attach(
            "2030-01-01T00:00:00Z",
            texts.clone(),
            Arc::new(SystemClock),
        )
        .unwrap();
        assert!(!handle.is_finished());
        assert_eq!(texts.all().len(), 1);
    }
}
