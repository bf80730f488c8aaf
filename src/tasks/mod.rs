//! Background tasks module
//!
//! The per-gate event loops, the timer handle they own, and the navigation
//! log that runs alongside the HTTP server.

pub mod gate_session;
pub mod navigation_log;
pub mod ticker;

// Re-export main types and functions
pub use gate_session::{
    ConfirmAction, GateHandle, GateSession, SessionCommand, SessionError, SessionSnapshot,
};
pub use navigation_log::navigation_log_task;
pub use ticker::{Ticker, DEFAULT_TICK_PERIOD};
