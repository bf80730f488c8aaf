//! Confirm Gate - timed confirmation gates served over HTTP
//!
//! A confirmation gate puts a cancellable countdown in front of a committing
//! action: following an external booking link once the pointer settles in the
//! confirm zone, or redirecting after a booking request has been submitted.

pub mod config;
pub mod gate;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use gate::{ConfirmationGate, GateEffect, GateEvent, GateSettings, GateSnapshot};
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
