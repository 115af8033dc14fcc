//! Request resolution and preparation shared by the async and blocking clients.
//!
//! A call is described by an [`Api`] root, a relative path and
//! [`RequestOptions`]. [`prepare`] turns that into a [`PreparedRequest`]
//! without touching the network, so encoding rules can be checked in isolation.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::ClientError;

/// Header carrying the account login on every request.
pub const LOGIN_HEADER: &str = "login";
/// Header carrying the account password on every request.
pub const PASSWORD_HEADER: &str = "password";

/// Characters escaped in a single path segment (the URL standard's
/// path-percent-encode set plus `/` and `%`).
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/')
    .add(b'%');

/// Verbs the SmartData APIs accept.
pub const SUPPORTED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::PUT, Method::DELETE];

/// API root a request is sent to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Api {
    /// Control plane: stream and source administration.
    In,
    /// Data plane: stream contents.
    Out,
}

/// Parameters and method of a single call.
///
/// GET requests carry `params` as a query string, every other method as a
/// JSON body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestOptions {
    /// Query or body parameters. `None` sends neither.
    pub params: Option<Value>,
    /// HTTP method. `None` means `GET`.
    pub method: Option<Method>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_params(mut self, params: impl Into<Value>) -> Self {
        self.params = Some(params.into());
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Interprets a slot that holds either parameters or a method name.
    ///
    /// A JSON string equal (ignoring case) to one of [`SUPPORTED_METHODS`]
    /// becomes the method and clears the parameters. Any other value is kept as
    /// parameters with the method left unset. A string parameter that happens
    /// to spell a verb is therefore read as a method; use [`Self::with_params`]
    /// when that matters.
    pub fn resolve(slot: Option<Value>) -> Self {
        match slot {
            Some(Value::String(candidate)) => match parse_verb(&candidate) {
                Some(method) => {
                    tracing::warn!(value = %candidate, "string argument interpreted as HTTP method");
                    Self {
                        params: None,
                        method: Some(method),
                    }
                }
                None => Self {
                    params: Some(Value::String(candidate)),
                    method: None,
                },
            },
            params => Self {
                params,
                method: None,
            },
        }
    }

    /// Effective method, defaulting to `GET`.
    pub fn method(&self) -> Method {
        self.method.clone().unwrap_or(Method::GET)
    }
}

fn parse_verb(candidate: &str) -> Option<Method> {
    SUPPORTED_METHODS
        .iter()
        .find(|method| method.as_str().eq_ignore_ascii_case(candidate))
        .cloned()
}

/// A fully resolved request, ready for a transport to send.
#[derive(Clone, Debug, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// Resolves `path` against `base` and places `options.params` in the query
/// string (GET) or the JSON body (any other method).
pub fn prepare(
    base: &Url,
    path: &str,
    options: RequestOptions,
) -> Result<PreparedRequest, ClientError> {
    let method = options.method();
    let url = build_url(base, path)?;
    let (query, body) = match options.params {
        None => (Vec::new(), None),
        Some(params) if method == Method::GET => (query_pairs(&params)?, None),
        Some(params) => (Vec::new(), Some(params)),
    };

    Ok(PreparedRequest {
        method,
        url,
        query,
        body,
    })
}

/// Flattens a JSON object into query-string pairs.
///
/// Scalars are rendered as text, `null` as an empty value and arrays as
/// repeated keys. Nested objects (and arrays nested in arrays) have no query
/// representation and are sent as empty values.
pub fn query_pairs(params: &Value) -> Result<Vec<(String, String)>, ClientError> {
    let Value::Object(map) = params else {
        return Err(ClientError::InvalidParams(format!(
            "GET parameters must be a JSON object, got {params}"
        )));
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    pairs.push((key.clone(), scalar_text(item)));
                }
            }
            other => pairs.push((key.clone(), scalar_text(other))),
        }
    }
    Ok(pairs)
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Parses an API root, normalizing it to end with a slash so relative paths
/// join underneath it.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let parsed = Url::parse(raw).map_err(|_| ClientError::InvalidBaseUrl(raw.to_owned()))?;
    Ok(ensure_trailing_slash(parsed))
}

fn build_url(base: &Url, path: &str) -> Result<Url, ClientError> {
    let relative = path.trim_start_matches('/');
    base.join(relative)
        .map_err(|_| ClientError::InvalidPath(path.to_owned()))
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let mut path = url.path().to_owned();
        path.push('/');
        url.set_path(&path);
    }
    url
}

/// Validates an entity identifier and encodes it as one path segment.
pub(crate) fn id_segment(kind: &'static str, id: &str) -> Result<String, ClientError> {
    if id.trim().is_empty() {
        return Err(ClientError::MissingIdentifier(kind));
    }
    Ok(utf8_percent_encode(id, PATH_SEGMENT).to_string())
}

pub(crate) fn log_dispatch(request: &PreparedRequest) {
    tracing::debug!(
        method = %request.method,
        url = %request.url,
        query = !request.query.is_empty(),
        body = request.body.is_some(),
        "dispatching SmartData request"
    );
}

pub(crate) fn log_transport_error(request: &PreparedRequest, error: &reqwest::Error) {
    tracing::warn!(method = %request.method, url = %request.url, %error, "SmartData request failed");
}

/// Turns a non-success status into [`ClientError::HttpStatus`], otherwise
/// hands back the raw body.
pub(crate) fn check_status(
    request: &PreparedRequest,
    status: reqwest::StatusCode,
    body: String,
) -> Result<String, ClientError> {
    if status.is_success() {
        return Ok(body);
    }
    tracing::warn!(
        method = %request.method,
        url = %request.url,
        status = status.as_u16(),
        "SmartData request returned an error status"
    );
    Err(ClientError::HttpStatus { status, body })
}

pub(crate) const STREAMS_PATH: &str = "/stream/";
pub(crate) const SOURCES_PATH: &str = "/source/";

/// `/stream/{id}` on the in API.
pub(crate) fn stream_path(id: &str) -> Result<String, ClientError> {
    Ok(format!("{STREAMS_PATH}{}", id_segment("stream", id)?))
}

/// `/{id}` on the out API.
pub(crate) fn stream_data_path(id: &str) -> Result<String, ClientError> {
    Ok(format!("/{}", id_segment("stream", id)?))
}

pub(crate) fn stream_fields_path(id: &str) -> Result<String, ClientError> {
    Ok(format!("{}/fields", stream_data_path(id)?))
}

pub(crate) fn stream_values_path(id: &str) -> Result<String, ClientError> {
    Ok(format!("{}/values", stream_data_path(id)?))
}

/// `/source/{id}` on the in API.
pub(crate) fn source_path(id: &str) -> Result<String, ClientError> {
    Ok(format!("{SOURCES_PATH}{}", id_segment("source", id)?))
}

pub(crate) fn mapping_preview_path(id: &str) -> Result<String, ClientError> {
    Ok(format!("{}/mapping-preview", source_path(id)?))
}

#[cfg(test)]
mod tests {
    use reqwest::Method;
    use serde_json::json;

    use super::{
        RequestOptions, id_segment, mapping_preview_path, parse_base_url, prepare, query_pairs,
        source_path, stream_fields_path, stream_path, stream_values_path,
    };
    use crate::ClientError;

    fn base() -> reqwest::Url {
        parse_base_url("http://in.example.com/api").expect("valid url")
    }

    #[test]
    fn joins_paths_from_base_with_nested_prefix() {
        let url = super::build_url(&base(), "/stream/").expect("valid path");
        assert_eq!(url.as_str(), "http://in.example.com/api/stream/");
    }

    #[test]
    fn rejects_relative_base_url() {
        let error = parse_base_url("not a url").expect_err("relative url");
        assert!(matches!(error, ClientError::InvalidBaseUrl(raw) if raw == "not a url"));
    }

    #[test]
    fn get_params_become_query_and_never_body() {
        let options = RequestOptions::new().with_params(json!({"from": 0, "size": 2}));
        let prepared = prepare(&base(), "/stream/", options).expect("prepares");
        assert_eq!(prepared.method, Method::GET);
        assert_eq!(
            prepared.query,
            vec![
                ("from".to_owned(), "0".to_owned()),
                ("size".to_owned(), "2".to_owned())
            ]
        );
        assert!(prepared.body.is_none());
    }

    #[test]
    fn non_get_params_become_body_and_never_query() {
        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let options = RequestOptions::new()
                .with_params(json!({"name": "x"}))
                .with_method(method.clone());
            let prepared = prepare(&base(), "/source/abc123", options).expect("prepares");
            assert_eq!(prepared.method, method);
            assert!(prepared.query.is_empty());
            assert_eq!(prepared.body, Some(json!({"name": "x"})));
        }
    }

    #[test]
    fn absent_params_send_neither_query_nor_body() {
        let options = RequestOptions::new().with_method(Method::DELETE);
        let prepared = prepare(&base(), "/source/abc123", options).expect("prepares");
        assert!(prepared.query.is_empty());
        assert!(prepared.body.is_none());
        assert_eq!(prepared.url.as_str(), "http://in.example.com/api/source/abc123");
    }

    #[test]
    fn get_params_must_be_an_object() {
        let options = RequestOptions::new().with_params(json!("flat"));
        let error = prepare(&base(), "/stream/", options).expect_err("string query");
        assert!(matches!(error, ClientError::InvalidParams(_)));
    }

    #[test]
    fn resolve_reads_verbs_case_insensitively() {
        for raw in ["delete", "DELETE", "Delete"] {
            let options = RequestOptions::resolve(Some(json!(raw)));
            assert_eq!(options.method, Some(Method::DELETE));
            assert!(options.params.is_none());
        }
        assert_eq!(
            RequestOptions::resolve(Some(json!("post"))).method(),
            Method::POST
        );
    }

    #[test]
    fn resolve_keeps_other_values_as_params() {
        let options = RequestOptions::resolve(Some(json!({"size": 10})));
        assert_eq!(options.params, Some(json!({"size": 10})));
        assert!(options.method.is_none());
        assert_eq!(options.method(), Method::GET);

        let options = RequestOptions::resolve(Some(json!("patch")));
        assert_eq!(options.params, Some(json!("patch")));
        assert!(options.method.is_none());

        assert_eq!(RequestOptions::resolve(None), RequestOptions::new());
    }

    #[test]
    fn query_pairs_follow_querystring_conventions() {
        let pairs = query_pairs(&json!({
            "flag": true,
            "nested": {"a": 1},
            "none": null,
            "ratio": 1.5,
            "tags": ["a", "b"],
        }))
        .expect("object params");
        assert_eq!(
            pairs,
            vec![
                ("flag".to_owned(), "true".to_owned()),
                ("nested".to_owned(), String::new()),
                ("none".to_owned(), String::new()),
                ("ratio".to_owned(), "1.5".to_owned()),
                ("tags".to_owned(), "a".to_owned()),
                ("tags".to_owned(), "b".to_owned()),
            ]
        );
    }

    #[test]
    fn id_segment_rejects_blank_and_encodes_reserved_characters() {
        assert!(matches!(
            id_segment("stream", " "),
            Err(ClientError::MissingIdentifier("stream"))
        ));
        assert_eq!(id_segment("source", "a/b").expect("non-empty"), "a%2Fb");
        assert_eq!(id_segment("source", "a b").expect("non-empty"), "a%20b");
        assert_eq!(id_segment("source", "a+b").expect("non-empty"), "a+b");
        assert_eq!(id_segment("source", "50%?").expect("non-empty"), "50%25%3F");
        assert_eq!(id_segment("source", "abc123").expect("non-empty"), "abc123");
    }

    #[test]
    fn entity_paths_use_the_given_identifier() {
        assert_eq!(stream_path("s1").expect("id"), "/stream/s1");
        assert_eq!(stream_fields_path("s1").expect("id"), "/s1/fields");
        assert_eq!(stream_values_path("s1").expect("id"), "/s1/values");
        assert_eq!(source_path("abc123").expect("id"), "/source/abc123");
        assert_eq!(
            mapping_preview_path("abc123").expect("id"),
            "/source/abc123/mapping-preview"
        );
        assert!(matches!(
            source_path(""),
            Err(ClientError::MissingIdentifier("source"))
        ));
    }
}
