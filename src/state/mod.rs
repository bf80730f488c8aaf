//! State management module
//!
//! This module contains the countdown primitive and the server-wide registry
//! of live gates.

pub mod app_state;
pub mod countdown_state;

// Re-export main types
pub use app_state::{AppState, MountError, DEFAULT_MAX_GATES};
pub use countdown_state::{Countdown, Tick, DEFAULT_COUNTDOWN};
