//! HTTP endpoints: message send and session info.

pub mod info;
pub mod send;
