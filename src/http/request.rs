use bytes::Bytes;

/// HTTP request method.
///
/// Only GET drives the hardware. Any other token is kept verbatim so it can
/// be logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    GET,
    Other(String),
}

impl Method {
    /// Parses a method token (case-sensitive).
    ///
    /// ```
    /// # use pinserve::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::Other("get".to_string()));
    /// ```
    pub fn from_token(s: &str) -> Self {
        match s {
            "GET" => Method::GET,
            other => Method::Other(other.to_string()),
        }
    }

    /// Returns the method token as it appeared on the request line.
    ///
    /// # Example
    ///
    /// ```
    /// # use pinserve::http::request::Method;
    /// assert_eq!(Method::GET.as_str(), "GET");
    /// assert_eq!(Method::from_token("POST").as_str(), "POST");
    /// ```
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::Other(s) => s.as_str(),
        }
    }
}

/// The request line of one connection's request.
///
/// When the first line is not `<METHOD> <PATH> <VERSION>`, the method, path
/// and version are all empty and [`ParsedRequest::is_malformed`] is true.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    /// The request method (empty `Other` for a malformed request)
    pub method: Method,
    /// The request path (e.g. "/on")
    pub path: String,
    /// Protocol version token (e.g. "HTTP/1.1")
    pub version: String,
    /// Everything read from the connection, headers and body included
    pub raw: Bytes,
}

impl ParsedRequest {
    /// Creates a request from its already-split request line.
    ///
    /// # Arguments
    ///
    /// * `method` - The request method
    /// * `path` - Request target, matched verbatim against the route table
    /// * `version` - Protocol token, kept only for logging
    /// * `raw` - The bytes read from the connection
    ///
    /// # Example
    ///
    /// ```
    /// # use bytes::Bytes;
    /// # use pinserve::http::request::{Method, ParsedRequest};
    /// let req = ParsedRequest::new(Method::GET, "/on", "HTTP/1.1", Bytes::new());
    /// assert_eq!(req.path, "/on");
    /// assert!(!req.is_malformed());
    /// ```
    pub fn new(
        method: Method,
        path: impl Into<String>,
        version: impl Into<String>,
        raw: Bytes,
    ) -> Self {
        Self {
            method,
            path: path.into(),
            version: version.into(),
            raw,
        }
    }

    /// The sentinel for a request whose first line could not be split.
    pub fn malformed(raw: Bytes) -> Self {
        Self::new(Method::Other(String::new()), "", "", raw)
    }

    /// True for the sentinel built by [`ParsedRequest::malformed`].
    pub fn is_malformed(&self) -> bool {
        self.path.is_empty() && self.version.is_empty() && self.method.as_str().is_empty()
    }
}
