//! pinserve - drive a board's GPIO pin and read its sensors over HTTP
//!
//! One request per connection, one connection at a time: `GET /on` drives the
//! output pin high, `GET /off` drives it low and `GET /temp` reports a sensor
//! reading.

pub mod config;
pub mod control;
pub mod hardware;
pub mod http;
pub mod router;
pub mod server;
