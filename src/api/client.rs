use std::future::Future;

use reqwest::header::{CONTENT_TYPE, COOKIE};
use reqwest::{Client, Method, RequestBuilder, Url};

use crate::api::types::{
    http_client, ApiError, ProcessOutcome, ProcessResponse, StatusResponse,
};

/// Anything that can report the status of an airdrop job.
///
/// The progress poller only depends on this seam, so it can be driven by the
/// real backend or by a scripted source in tests.
pub trait StatusSource: Send + Sync + 'static {
    fn fetch_status(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<StatusResponse, ApiError>> + Send;
}

/// Client for the airdrop dashboard REST endpoints.
#[derive(Debug, Clone)]
pub struct AirdropClient {
    http: Client,
    base_url: Url,
    session_cookie: Option<String>,
}

impl AirdropClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_client(http_client(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, ApiError> {
        let mut base_url = Url::parse(base_url).map_err(|e| ApiError::Url(e.to_string()))?;
        // `Url::join` replaces the last segment unless the path ends in a slash
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            session_cookie: None,
        })
    }

    /// Send the dashboard's session cookie with every request.
    pub fn with_session_cookie(mut self, cookie: Option<String>) -> Self {
        self.session_cookie = cookie.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn status_url(&self, job_id: &str) -> Result<Url, ApiError> {
        self.endpoint(&format!("api/airdrops/{}/status", urlencoding::encode(job_id)))
    }

    pub fn process_url(&self, job_id: &str) -> Result<Url, ApiError> {
        self.endpoint(&format!("api/airdrop/{}/process", urlencoding::encode(job_id)))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::Url(e.to_string()))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.session_cookie {
            Some(cookie) => builder.header(COOKIE, cookie),
            None => builder,
        }
    }

    /// Fetch one status snapshot. Non-2xx responses and bodies that are not
    /// a valid status document are errors.
    pub async fn fetch_status(&self, job_id: &str) -> Result<StatusResponse, ApiError> {
        let url = self.status_url(job_id)?;
        let resp = self.request(Method::GET, url).send().await?;
        if !resp.status().is_success() {
            return Err(ApiError::Status(resp.status()));
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Ask the backend to start sending tokens for an airdrop.
    ///
    /// Any 2xx is success. Otherwise the `error` field of the JSON body is
    /// returned when present; a body that is not JSON is not an error here.
    pub async fn process(&self, job_id: &str) -> Result<ProcessOutcome, ApiError> {
        let url = self.process_url(job_id)?;
        let resp = self
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(ProcessOutcome::Started);
        }
        let body = resp.bytes().await?;
        let error = serde_json::from_slice::<ProcessResponse>(&body)
            .ok()
            .and_then(|r| r.error);
        Ok(ProcessOutcome::Rejected { status, error })
    }
}

impl StatusSource for AirdropClient {
    async fn fetch_status(&self, job_id: &str) -> Result<StatusResponse, ApiError> {
        AirdropClient::fetch_status(self, job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn urls_keep_base_path_and_encode_job_id() {
        let client = AirdropClient::new("http://dash.local/admin").unwrap();
        assert_eq!(
            client.status_url("abc123").unwrap().as_str(),
            "http://dash.local/admin/api/airdrops/abc123/status"
        );
        assert_eq!(
            client.process_url("a b/c").unwrap().as_str(),
            "http://dash.local/admin/api/airdrop/a%20b%2Fc/process"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            AirdropClient::new("not a url"),
            Err(ApiError::Url(_))
        ));
    }

    #[tokio::test]
    async fn fetch_status_decodes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/airdrops/abc123/status"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "in_progress",
                "total": 10,
                "completed": 3
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AirdropClient::new(&server.uri()).unwrap();
        let resp = client.fetch_status("abc123").await.unwrap();
        assert_eq!(resp.total(), 10);
        assert_eq!(resp.completed(), 3);
        assert!(!resp.is_terminal());
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/airdrops/1/status"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "error": "Access denied" })),
            )
            .mount(&server)
            .await;

        let client = AirdropClient::new(&server.uri()).unwrap();
        let err = client.fetch_status("1").await.unwrap_err();
        assert!(matches!(err, ApiError::Status(StatusCode::FORBIDDEN)));
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/airdrops/1/status"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let client = AirdropClient::new(&server.uri()).unwrap();
        let err = client.fetch_status("1").await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn session_cookie_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/airdrops/9/status"))
            .and(header("cookie", "session=xyz"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "completed" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = AirdropClient::new(&server.uri())
            .unwrap()
            .with_session_cookie(Some("session=xyz".to_string()));
        assert!(client.fetch_status("9").await.unwrap().is_terminal());
    }

    #[tokio::test]
    async fn process_reports_backend_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/airdrop/5/process"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "error": "Airdrop already processed" })),
            )
            .mount(&server)
            .await;

        let client = AirdropClient::new(&server.uri()).unwrap();
        let outcome = client.process("5").await.unwrap();
        assert_eq!(
            outcome,
            ProcessOutcome::Rejected {
                status: StatusCode::BAD_REQUEST,
                error: Some("Airdrop already processed".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn process_accepts_any_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/airdrop/5/process"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let client = AirdropClient::new(&server.uri()).unwrap();
        assert_eq!(client.process("5").await.unwrap(), ProcessOutcome::Started);
    }
}
