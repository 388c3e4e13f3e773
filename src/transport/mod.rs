//! HTTP transport: header construction, the authenticated request executor,
//! and event stream framing.

pub mod headers;
pub mod http;
pub mod sse;
