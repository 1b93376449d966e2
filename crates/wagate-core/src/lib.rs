//! # wagate-core
//!
//! Core state for the WhatsApp gateway:
//!
//! - Session lifecycle state machine ([`session::SessionState`]) and its
//!   process-wide shared handle ([`session::SharedSession`])
//! - Destination address normalization ([`address::normalize`])
//!
//! Pure logic, no IO — everything here is exercised by the server crate.

#![deny(unsafe_code)]

pub mod address;
pub mod session;

pub use address::{Address, AddressError, normalize};
pub use session::{LifecycleEvent, SessionStatus, SharedSession, Transition};
