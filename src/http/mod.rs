//! The minimal HTTP/1.0 front end.
//!
//! Only the request line is understood. Each connection serves one request
//! and is closed.
//!
//! - **`connection`**: per-connection state machine
//! - **`parser`**: request-line tokenizer
//! - **`request`**: parsed request representation
//! - **`response`**: status codes, responses and the action-result renderer
//! - **`writer`**: serialization and partial-write handling
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← One bounded read
//!        └──────┬──────┘
//!               │ Request line parsed (possibly malformed)
//!               ▼
//!        ┌──────────────────┐
//!        │     Routing      │ ← Route lookup + hardware call
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │      Acted       │ ← Response built from the result
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │     Writing      │ ← Send response to client
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │      Closed      │ ← Reached from every state, exactly once
//!        └──────────────────┘
//! ```
//!
//! A read or write failure jumps straight to `Closed`.

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
