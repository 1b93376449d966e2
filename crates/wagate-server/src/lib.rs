//! # wagate-server
//!
//! Axum HTTP + `WebSocket` facade over the external messaging client.
//!
//! - HTTP endpoints: landing page, `/send-message`, `/info`, `/health`
//! - `WebSocket` status channel: per-subscriber heartbeats while pairing,
//!   global fan-out of lifecycle events (QR image, scanned, ready, logout)
//! - Lifecycle bridge: client events → session-state transitions → broadcast
//! - Request gate: sends are admitted only while the session is ready
//! - Graceful shutdown via `tokio::signal` + `CancellationToken`

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod qr;
pub mod server;
pub mod shutdown;
pub mod ws;
