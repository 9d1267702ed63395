use crate::control::ActionResult;
use crate::router::Action;

/// HTTP status codes the server answers with.
///
/// - `Ok` (200): the action was carried out
/// - `NotFound` (404): malformed or unroutable request
/// - `InternalServerError` (500): the hardware call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// ```
    /// # use pinserve::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Reason phrase sent after the numeric code on the status line.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// A complete response, ready to be serialized.
///
/// Headers keep insertion order so the same response always serializes to
/// the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Builder for constructing responses in a fluent style.
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "text/html")
///     .body(b"<html></html>".to_vec())
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl ResponseBuilder {
    /// Starts a response with no headers and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Adds a header, replacing an earlier one with the same name in place.
    ///
    /// # Arguments
    ///
    /// * `key` - Header name (compared case-insensitively)
    /// * `value` - Header value
    ///
    /// # Example
    ///
    /// ```ignore
    /// builder.header("Content-Type", "text/plain")
    ///     .header("content-type", "text/html")
    /// ```
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&key)) {
            Some(slot) => slot.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Sets the response body, replacing any earlier one.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Content-Length` when there is a body and none was set. Bodyless
    /// responses stay a bare status line.
    pub fn build(mut self) -> Response {
        let has_length = self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("Content-Length"));
        if !self.body.is_empty() && !has_length {
            self.headers
                .push(("Content-Length".to_string(), self.body.len().to_string()));
        }

        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    /// A 200 OK HTML page.
    ///
    /// # Arguments
    ///
    /// * `body` - The complete HTML document
    ///
    /// # Example
    ///
    /// ```
    /// # use pinserve::http::response::{Response, StatusCode};
    /// let resp = Response::ok_html("<html></html>");
    /// assert_eq!(resp.status, StatusCode::Ok);
    /// assert_eq!(resp.headers[0], ("Content-Type".to_string(), "text/html".to_string()));
    /// ```
    pub fn ok_html(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Content-Type", "text/html")
            .body(body.into())
            .build()
    }

    /// A bare `404 Not Found` status line.
    ///
    /// ```
    /// # use pinserve::http::response::Response;
    /// let resp = Response::not_found();
    /// assert!(resp.headers.is_empty() && resp.body.is_empty());
    /// ```
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound).build()
    }

    /// A bare `500 Internal Server Error` status line. Never carries a stale
    /// reading.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError).build()
    }

    /// Renders the response for a carried-out action.
    ///
    /// Unknown actions give 404, hardware faults give 500. Only a succeeded
    /// action gets a body.
    pub fn for_result(result: &ActionResult) -> Self {
        if result.action == Action::Unknown {
            return Self::not_found();
        }
        if !result.succeeded {
            return Self::internal_error();
        }

        let message = match (result.action, result.payload.as_deref()) {
            (Action::TurnOn, _) => "Device is turned on!".to_string(),
            (Action::TurnOff, _) => "Device is turned off!".to_string(),
            (Action::ReadSensor, Some(reading)) => format!("<h1>{}</h1>", reading),
            // A sensor action without a reading is not a success.
            (Action::ReadSensor, None) => return Self::internal_error(),
            (Action::Unknown, _) => return Self::not_found(),
        };

        Self::ok_html(success_page(&message))
    }
}

fn success_page(content: &str) -> String {
    format!(
        "<html>\n<head>\n<title>Success</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        content
    )
}
