//! The root `Client`: credentials, transport and request construction.
//!
//! # Design
//! `Client` holds only immutable state behind an `Arc`, so clones are cheap
//! and every entity handle keeps its own clone as the back-reference used to
//! authenticate follow-up calls. Each operation is split into a `build_*`
//! method producing an `HttpRequest` and a `parse_*` method consuming an
//! `HttpResponse`; `execute` sits between them and hands the request to the
//! configured `Transport`.

use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use url::Url;

use crate::board::BoardService;
use crate::error::{ApiError, Result};
use crate::http::{redact, HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::list::ListService;
use crate::types::{BoardData, ListData};

/// Public Trello API host.
pub const DEFAULT_BASE_URL: &str = "https://api.trello.com";

/// API version prefix shared by every endpoint.
const API_VERSION: &str = "1";

/// Handle to the Trello API for one key/token pair.
#[derive(Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

struct Inner {
    key: String,
    token: String,
    base_url: String,
    transport: Box<dyn Transport>,
}

impl Client {
    /// Create a client against the public API host. Performs no I/O and
    /// never fails; credentials are validated by the remote service.
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self::builder(key, token).build()
    }

    pub fn builder(key: impl Into<String>, token: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            key: key.into(),
            token: token.into(),
            base_url: None,
            transport: None,
        }
    }

    /// Create a client from `TRELLO_KEY`, `TRELLO_TOKEN` and, optionally,
    /// `TRELLO_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let key = std::env::var("TRELLO_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ApiError::MissingCredentials("TRELLO_KEY"))?;
        let token = std::env::var("TRELLO_TOKEN").unwrap_or_default();

        let mut builder = Self::builder(key, token);
        if let Ok(base_url) = std::env::var("TRELLO_BASE_URL") {
            if !base_url.trim().is_empty() {
                builder = builder.base_url(base_url);
            }
        }
        Ok(builder.build())
    }

    pub fn board_service(&self) -> BoardService {
        BoardService::new(self.clone())
    }

    pub fn list_service(&self) -> ListService {
        ListService::new(self.clone())
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn has_token(&self) -> bool {
        !self.inner.token.is_empty()
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    // -----------------------------------------------------------------------
    // Request building
    // -----------------------------------------------------------------------

    pub fn build_get_board(&self, id: &str, include_lists: bool) -> Result<HttpRequest> {
        let params: &[(&str, &str)] = if include_lists {
            &[("lists", "all")]
        } else {
            &[]
        };
        Ok(request(HttpMethod::Get, self.endpoint(&["boards", id], params)?))
    }

    pub fn build_rename_list(&self, id: &str, new_name: &str) -> Result<HttpRequest> {
        let url = self.endpoint(&["lists", id, "name"], &[("value", new_name)])?;
        Ok(request(HttpMethod::Put, url))
    }

    pub fn build_close_list(&self, id: &str) -> Result<HttpRequest> {
        let url = self.endpoint(&["lists", id, "closed"], &[("value", "true")])?;
        Ok(request(HttpMethod::Put, url))
    }

    /// `pos` is an ordering hint (`top`, `bottom` or a number) and is only
    /// sent when non-empty.
    pub fn build_create_list(&self, name: &str, board_id: &str, pos: &str) -> Result<HttpRequest> {
        let mut params = vec![("name", name), ("idBoard", board_id)];
        if !pos.is_empty() {
            params.push(("pos", pos));
        }
        Ok(request(HttpMethod::Post, self.endpoint(&["lists"], &params)?))
    }

    /// `{base}/1/{segments..}?key=..&{params..}[&token=..]`
    fn endpoint(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<String> {
        let mut url = Url::parse(&self.inner.base_url)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .push(API_VERSION)
            .extend(segments);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", &self.inner.key);
            for (name, value) in params {
                query.append_pair(name, value);
            }
            if self.has_token() {
                query.append_pair("token", &self.inner.token);
            }
        }
        Ok(url.into())
    }

    // -----------------------------------------------------------------------
    // Execution
    // -----------------------------------------------------------------------

    /// Run one request through the transport. Never retries.
    pub fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!("HTTP {} {}", request.method.as_str(), redact(&request.url));
        let response = self.inner.transport.execute(request)?;
        if !response.is_success() {
            warn!("remote service answered {}", response.status_line());
        }
        Ok(response)
    }

    // -----------------------------------------------------------------------
    // Response parsing
    // -----------------------------------------------------------------------

    pub fn parse_board(&self, response: HttpResponse) -> Result<BoardData> {
        let response = response.error_for_status()?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    pub fn parse_list(&self, response: HttpResponse) -> Result<ListData> {
        let response = response.error_for_status()?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Field updates only report success through the status code.
    pub fn parse_update(&self, response: HttpResponse) -> Result<()> {
        response.error_for_status()?;
        Ok(())
    }
}

fn request(method: HttpMethod, url: String) -> HttpRequest {
    HttpRequest {
        method,
        url,
        headers: Vec::new(),
        body: None,
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("key", &"***")
            .field("token", &if self.has_token() { "***" } else { "" })
            .field("base_url", &self.inner.base_url)
            .finish()
    }
}

/// Optional knobs for `Client`. Both default to the public API over
/// `UreqTransport`.
pub struct ClientBuilder {
    key: String,
    token: String,
    base_url: Option<String>,
    transport: Option<Box<dyn Transport>>,
}

impl ClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn build(self) -> Client {
        Client {
            inner: Arc::new(Inner {
                key: self.key,
                token: self.token,
                base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                transport: self
                    .transport
                    .unwrap_or_else(|| Box::new(UreqTransport::new())),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: &str) -> Client {
        Client::builder("K", token)
            .base_url("http://localhost:3000")
            .build()
    }

    fn ok(body: &[u8]) -> HttpResponse {
        HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: body.to_vec(),
        }
    }

    /// Guards the process environment for tests that mutate it.
    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn set_env(key: Option<&str>, token: Option<&str>, base_url: Option<&str>) {
        for (name, value) in [
            ("TRELLO_KEY", key),
            ("TRELLO_TOKEN", token),
            ("TRELLO_BASE_URL", base_url),
        ] {
            match value {
                Some(v) => std::env::set_var(name, v),
                None => std::env::remove_var(name),
            }
        }
    }

    #[test]
    fn from_env_reads_credentials_and_base_url() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        set_env(None, Some("T"), None);
        let err = Client::from_env().unwrap_err();
        assert!(matches!(err, ApiError::MissingCredentials("TRELLO_KEY")), "{err}");
        assert_eq!(err.to_string(), "missing credentials: TRELLO_KEY is not set");

        set_env(Some("  "), Some("T"), None);
        let err = Client::from_env().unwrap_err();
        assert!(matches!(err, ApiError::MissingCredentials("TRELLO_KEY")), "{err}");

        set_env(Some("K"), None, None);
        let c = Client::from_env().unwrap();
        assert_eq!(c.key(), "K");
        assert!(!c.has_token());
        assert_eq!(c.base_url(), DEFAULT_BASE_URL);
        let req = c.build_get_board("B1", false).unwrap();
        assert_eq!(req.url, "https://api.trello.com/1/boards/B1?key=K");

        set_env(Some("K"), Some("T"), Some("http://localhost:3000"));
        let c = Client::from_env().unwrap();
        assert!(c.has_token());
        assert_eq!(c.base_url(), "http://localhost:3000");
        let req = c.build_get_board("B1", false).unwrap();
        assert_eq!(req.url, "http://localhost:3000/1/boards/B1?key=K&token=T");

        set_env(Some("K"), Some("T"), Some(" "));
        assert_eq!(Client::from_env().unwrap().base_url(), DEFAULT_BASE_URL);

        set_env(None, None, None);
    }

    #[test]
    fn new_defaults_to_public_host() {
        let c = Client::new("K", "T");
        assert_eq!(c.base_url(), DEFAULT_BASE_URL);
        assert_eq!(c.key(), "K");
        assert!(c.has_token());
    }

    #[test]
    fn build_get_board_without_token() {
        let req = client("").build_get_board("B1", false).unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:3000/1/boards/B1?key=K");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_get_board_with_lists_and_token() {
        let req = client("T").build_get_board("B1", true).unwrap();
        assert_eq!(
            req.url,
            "http://localhost:3000/1/boards/B1?key=K&lists=all&token=T"
        );
    }

    #[test]
    fn build_rename_list_escapes_value() {
        let req = client("T").build_rename_list("L1", "Sprint 1 & 2").unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.url,
            "http://localhost:3000/1/lists/L1/name?key=K&value=Sprint+1+%26+2&token=T"
        );
    }

    #[test]
    fn build_close_list_targets_closed_field() {
        let req = client("").build_close_list("L1").unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "http://localhost:3000/1/lists/L1/closed?key=K&value=true");
    }

    #[test]
    fn build_create_list_orders_params() {
        let req = client("T").build_create_list("To do", "B 1", "top").unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "http://localhost:3000/1/lists?key=K&name=To+do&idBoard=B+1&pos=top&token=T"
        );
    }

    #[test]
    fn build_create_list_omits_empty_pos() {
        let req = client("").build_create_list("Done", "B1", "").unwrap();
        assert_eq!(req.url, "http://localhost:3000/1/lists?key=K&name=Done&idBoard=B1");
    }

    #[test]
    fn path_ids_are_percent_encoded() {
        let req = client("").build_get_board("a/b c", false).unwrap();
        assert_eq!(req.url, "http://localhost:3000/1/boards/a%2Fb%20c?key=K");
    }

    #[test]
    fn base_url_path_prefix_is_kept() {
        let c = Client::builder("K", "").base_url("http://localhost:3000/proxy/").build();
        let req = c.build_get_board("B1", false).unwrap();
        assert_eq!(req.url, "http://localhost:3000/proxy/1/boards/B1?key=K");
    }

    #[test]
    fn invalid_base_url_is_a_construction_error() {
        let c = Client::builder("K", "").base_url("not a url").build();
        let err = c.build_get_board("B1", false).unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn parse_board_success() {
        let board = client("").parse_board(ok(br#"{"id":"B1","name":"Roadmap"}"#)).unwrap();
        assert_eq!(board.name, "Roadmap");
    }

    #[test]
    fn parse_board_bad_json() {
        let err = client("").parse_board(ok(b"not json")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn parse_board_invalid_utf8_is_a_decode_error() {
        let err = client("")
            .parse_board(ok(b"{\"id\":\"B1\",\"name\":\"\xff\xfe\"}"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "{err}");
    }

    #[test]
    fn parse_list_invalid_utf8_is_a_decode_error() {
        let err = client("").parse_list(ok(b"{\"id\":\"\xc3\"}")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)), "{err}");
    }

    #[test]
    fn parse_board_rejected() {
        let response = HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: b"The requested resource was not found.".to_vec(),
        };
        let err = client("").parse_board(response).unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 404, .. }));
    }

    #[test]
    fn parse_update_accepts_empty_2xx() {
        let response = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(client("").parse_update(response).is_ok());
    }

    #[test]
    fn debug_masks_credentials() {
        let out = format!("{:?}", Client::new("secret-key", "secret-token"));
        assert!(!out.contains("secret"));
    }
}
