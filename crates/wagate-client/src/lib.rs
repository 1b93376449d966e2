//! # wagate-client
//!
//! The seam between the gateway and the external messaging client.
//!
//! The actual protocol work — web automation, message framing, session
//! persistence — lives behind [`MessagingClient`]; the gateway only consumes
//! its lifecycle events and capability methods. [`sim::SimulatedClient`]
//! implements the trait in-process so the server can be exercised end to end
//! without browser automation.

#![deny(unsafe_code)]

pub mod sim;
mod traits;
mod types;

pub use traits::MessagingClient;
pub use types::{BatteryInfo, ClientError, ClientInfo};
