//! Confirmation gates
//!
//! A confirmation gate delays a committing action behind a visible countdown
//! that the user can cancel, restart or bypass. Both variants are plain state
//! machines: `handle` maps an event to the next state plus a list of effects,
//! and the session runtime in `tasks::gate_session` carries the effects out.

pub mod arbiter;
pub mod coordinator;
pub mod region;

use serde::{Deserialize, Serialize};

pub use arbiter::{PointerArbiter, PointerSnapshot};
pub use coordinator::{BookingCoordinator, BookingSnapshot};
pub use region::{classify, ContainerGeometry, ContainerRect, Region};

/// Everything a gate can react to
#[derive(Debug, Clone, PartialEq)]
pub enum GateEvent {
    /// Pointer moved; `container` is the box measured for this event
    PointerMove {
        client_x: f64,
        container: Option<ContainerRect>,
    },
    /// Pointer left the container entirely
    PointerLeave,
    /// Owner changed the open state of the dialog
    SetOpen(bool),
    /// User asked to proceed with the submit action
    Proceed { parent_busy: bool },
    /// The submit action started under `epoch` finished
    SubmitSettled {
        epoch: u64,
        outcome: Result<(), String>,
    },
    /// User asked to skip the remaining wait
    RedirectNow,
    /// One countdown period elapsed
    Tick,
    /// The owning instance is going away
    Teardown,
}

/// Side effects requested by a transition, executed in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEffect {
    ArmTimer,
    DisarmTimer,
    /// Start the owner-supplied submit action
    Submit { epoch: u64 },
    /// Open a destination in a new browsing context
    Navigate(String),
    /// Invoke the owner-supplied confirm action
    Confirm,
    /// Ask the owner to close the dialog
    RequestClose,
}

/// Which controls the view should present. Mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Footer {
    Actions,
    Submitting,
    CountingDown { remaining: u32 },
}

/// Serializable projection of a gate's current state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum GateSnapshot {
    Pointer(PointerSnapshot),
    Booking(BookingSnapshot),
}

impl GateSnapshot {
    pub fn footer(&self) -> Footer {
        match self {
            GateSnapshot::Pointer(s) => s.footer,
            GateSnapshot::Booking(s) => s.footer,
        }
    }

    pub fn timer_running(&self) -> bool {
        match self {
            GateSnapshot::Pointer(s) => s.timer_running,
            GateSnapshot::Booking(s) => s.timer_running,
        }
    }

    pub fn remaining(&self) -> u32 {
        match self {
            GateSnapshot::Pointer(s) => s.remaining,
            GateSnapshot::Booking(s) => s.countdown,
        }
    }
}

/// Transition function shared by both gate variants.
///
/// Events that do not apply to a variant are ignored and yield no effects.
pub trait ConfirmationGate: Send {
    fn handle(&mut self, event: GateEvent) -> Vec<GateEffect>;

    fn snapshot(&self) -> GateSnapshot;
}

/// Tunables shared by every gate created by one server
#[derive(Debug, Clone, PartialEq)]
pub struct GateSettings {
    pub countdown: u32,
    pub confirm_split: f64,
    pub pointer_leave_confirms: bool,
    pub surface_submit_errors: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            countdown: crate::state::DEFAULT_COUNTDOWN,
            confirm_split: region::DEFAULT_CONFIRM_SPLIT,
            pointer_leave_confirms: true,
            surface_submit_errors: false,
        }
    }
}
