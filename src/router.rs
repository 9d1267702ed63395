//! Request routing.
//!
//! A [`RouteTable`] is built once from configuration and never changes. It
//! maps a parsed request to an [`Action`] without side effects; the
//! connection performs whatever the action dictates.

use serde::Deserialize;

use crate::config::RoutesConfig;
use crate::http::request::{Method, ParsedRequest};

/// What a request asks the hardware to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnOn,
    TurnOff,
    ReadSensor,
    Unknown,
}

/// One table entry. `pattern` must equal the request path exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub pattern: String,
    pub action: Action,
}

#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: Action,
}

impl Route {
    pub fn new(pattern: impl Into<String>, action: Action) -> Self {
        Self {
            pattern: pattern.into(),
            action,
        }
    }
}

impl RouteTable {
    /// Creates a table whose unmatched paths route to [`Action::Unknown`].
    ///
    /// # Arguments
    ///
    /// * `routes` - Entries in priority order; the first matching pattern wins
    ///
    /// # Example
    ///
    /// ```
    /// # use pinserve::http::parser::parse_request_line;
    /// # use pinserve::router::{Action, Route, RouteTable};
    /// let table = RouteTable::new(vec![Route::new("/lamp", Action::TurnOn)]);
    /// let req = parse_request_line(b"GET /lamp HTTP/1.1\r\n\r\n");
    /// assert_eq!(table.route(&req), Action::TurnOn);
    ///
    /// let req = parse_request_line(b"GET /other HTTP/1.1\r\n\r\n");
    /// assert_eq!(table.route(&req), Action::Unknown);
    /// ```
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            fallback: Action::Unknown,
        }
    }

    /// Action for well-formed GET requests whose path is not in the table.
    pub fn with_fallback(mut self, fallback: Action) -> Self {
        self.fallback = fallback;
        self
    }

    /// Builds the table and fallback from the `routes` config section.
    pub fn from_config(cfg: &RoutesConfig) -> Self {
        let routes = cfg
            .table
            .iter()
            .map(|r| Route::new(r.path.clone(), r.action))
            .collect();
        Self::new(routes).with_fallback(cfg.fallback)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Resolves a request to an action.
    ///
    /// Malformed requests and methods other than GET are always `Unknown`.
    /// Otherwise the first route whose pattern equals the path wins, and the
    /// fallback applies when none does.
    pub fn route(&self, req: &ParsedRequest) -> Action {
        if req.is_malformed() || req.method != Method::GET {
            return Action::Unknown;
        }

        self.routes
            .iter()
            .find(|r| r.pattern == req.path)
            .map(|r| r.action)
            .unwrap_or(self.fallback)
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::from_config(&RoutesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::parser::parse_request_line;

    #[test]
    fn first_match_wins() {
        let table = RouteTable::new(vec![
            Route::new("/x", Action::TurnOn),
            Route::new("/x", Action::TurnOff),
        ]);
        let req = parse_request_line(b"GET /x HTTP/1.1\r\n\r\n");
        assert_eq!(table.route(&req), Action::TurnOn);
    }

    #[test]
    fn prefix_is_not_a_match() {
        let table = RouteTable::default();
        let req = parse_request_line(b"GET /onwards HTTP/1.1\r\n\r\n");
        assert_eq!(table.route(&req), Action::Unknown);
    }
}
