//! Pointer-region arbiter: drives a countdown from pointer position

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    region::classify, ConfirmationGate, ContainerRect, Footer, GateEffect, GateEvent,
    GateSettings, GateSnapshot, Region,
};
use crate::state::{Countdown, Tick};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerSnapshot {
    pub region: Region,
    pub remaining: u32,
    pub timer_running: bool,
    pub confirmations: u64,
    pub footer: Footer,
}

/// Confirm zone starts the countdown, cancel zone stops it. Only a change
/// of region triggers anything.
#[derive(Debug, Clone)]
pub struct PointerArbiter {
    region: Region,
    countdown: Countdown,
    split: f64,
    leave_confirms: bool,
    confirmations: u64,
}

impl PointerArbiter {
    pub fn new(settings: &GateSettings) -> Self {
        Self {
            region: Region::None,
            countdown: Countdown::new(settings.countdown),
            split: settings.confirm_split,
            leave_confirms: settings.pointer_leave_confirms,
            confirmations: 0,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    fn start(&mut self) -> Vec<GateEffect> {
        if self.countdown.start() {
            vec![GateEffect::ArmTimer]
        } else {
            Vec::new()
        }
    }

    fn cancel(&mut self) -> Vec<GateEffect> {
        if self.countdown.cancel() {
            vec![GateEffect::DisarmTimer]
        } else {
            Vec::new()
        }
    }

    fn pointer_move(&mut self, client_x: f64, container: Option<ContainerRect>) -> Vec<GateEffect> {
        let Some(rect) = container else {
            debug!("Pointer move without a container, skipping");
            return Vec::new();
        };
        let Some(region) = classify(client_x, &rect, self.split) else {
            debug!("Unclassifiable pointer geometry, skipping");
            return Vec::new();
        };
        if region == self.region {
            return Vec::new();
        }

        debug!("Pointer region {:?} -> {:?}", self.region, region);
        self.region = region;
        match region {
            Region::Right => self.start(),
            Region::Left => {
                let effects = self.cancel();
                // a completed countdown stops at zero; show the initial value again
                self.countdown.reset();
                effects
            }
            Region::None => Vec::new(),
        }
    }

    fn pointer_leave(&mut self) -> Vec<GateEffect> {
        self.region = Region::None;
        if self.leave_confirms {
            self.start()
        } else {
            self.cancel()
        }
    }

    fn tick(&mut self) -> Vec<GateEffect> {
        match self.countdown.tick() {
            Tick::Idle | Tick::Remaining(_) => Vec::new(),
            Tick::Completed => {
                self.confirmations += 1;
                debug!("Pointer gate countdown completed, confirming");
                vec![GateEffect::DisarmTimer, GateEffect::Confirm]
            }
        }
    }
}

impl ConfirmationGate for PointerArbiter {
    fn handle(&mut self, event: GateEvent) -> Vec<GateEffect> {
        match event {
            GateEvent::PointerMove {
                client_x,
                container,
            } => self.pointer_move(client_x, container),
            GateEvent::PointerLeave => self.pointer_leave(),
            GateEvent::Tick => self.tick(),
            GateEvent::Teardown => {
                self.region = Region::None;
                self.cancel()
            }
            other => {
                debug!("Pointer gate ignoring {:?}", other);
                Vec::new()
            }
        }
    }

    fn snapshot(&self) -> GateSnapshot {
        let footer = if self.countdown.is_running() {
            Footer::CountingDown {
                remaining: self.countdown.remaining(),
            }
        } else {
            Footer::Actions
        };
        GateSnapshot::Pointer(PointerSnapshot {
            region: self.region,
            remaining: self.countdown.remaining(),
            timer_running: self.countdown.is_running(),
            confirmations: self.confirmations,
            footer,
        })
    }
}
