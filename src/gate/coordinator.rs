//! Booking coordinator: async submit followed by a countdown redirect

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::{ConfirmationGate, Footer, GateEffect, GateEvent, GateSettings, GateSnapshot};
use crate::state::{Countdown, Tick};

/// Message shown while the redirect countdown runs
pub const REDIRECT_MESSAGE: &str = "Booking received! Redirecting you to schedule your call...";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSnapshot {
    pub open: bool,
    pub submitting: bool,
    pub redirect_message: Option<String>,
    pub countdown: u32,
    pub timer_running: bool,
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_error: Option<String>,
    pub footer: Footer,
}

/// Sequences proceed → submit → countdown → redirect for one dialog.
#[derive(Debug, Clone)]
pub struct BookingCoordinator {
    open: bool,
    submitting: bool,
    redirect_message: Option<String>,
    countdown: Countdown,
    destination: String,
    epoch: u64,
    last_error: Option<String>,
    surface_errors: bool,
}

impl BookingCoordinator {
    pub fn new(destination: impl Into<String>, settings: &GateSettings) -> Self {
        Self {
            open: false,
            submitting: false,
            redirect_message: None,
            countdown: Countdown::new(settings.countdown),
            destination: destination.into(),
            epoch: 0,
            last_error: None,
            surface_errors: settings.surface_submit_errors,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn redirect_message(&self) -> Option<&str> {
        self.redirect_message.as_deref()
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn counting_down(&self) -> bool {
        self.redirect_message.is_some() && self.countdown.is_running()
    }

    fn set_open(&mut self, open: bool) -> Vec<GateEffect> {
        let was_open = self.open;
        self.open = open;

        if open && !was_open {
            debug!("Booking dialog opened, resetting coordinator");
            self.submitting = false;
            self.redirect_message = None;
            self.last_error = None;
            self.countdown.reset();
            // anything still in flight belongs to the previous opening
            self.epoch += 1;
            return vec![GateEffect::DisarmTimer];
        }

        if !open && was_open {
            if self.submitting {
                // the result must not redirect a dialog the user dismissed
                debug!("Booking dialog closed mid-submit, abandoning epoch {}", self.epoch);
                self.submitting = false;
                self.epoch += 1;
            }
            if self.countdown.cancel() {
                debug!("Booking dialog closed mid-countdown, cancelling");
                return vec![GateEffect::DisarmTimer];
            }
        }

        Vec::new()
    }

    fn proceed(&mut self, parent_busy: bool) -> Vec<GateEffect> {
        if !self.open {
            warn!("Proceed ignored: dialog is closed");
            return Vec::new();
        }
        if self.submitting || parent_busy {
            debug!(
                "Proceed ignored: submitting={}, parent_busy={}",
                self.submitting, parent_busy
            );
            return Vec::new();
        }
        if self.counting_down() {
            debug!("Proceed ignored: redirect already counting down");
            return Vec::new();
        }

        self.submitting = true;
        self.last_error = None;
        info!("Submitting booking (epoch {})", self.epoch);
        vec![GateEffect::Submit { epoch: self.epoch }]
    }

    fn submit_settled(&mut self, epoch: u64, outcome: Result<(), String>) -> Vec<GateEffect> {
        if epoch != self.epoch || !self.submitting {
            warn!(
                "Discarding stale submit result (epoch {}, current {})",
                epoch, self.epoch
            );
            return Vec::new();
        }
        self.submitting = false;

        match outcome {
            Ok(()) => {
                info!("Booking submitted, redirecting in {}s", self.countdown.initial());
                self.redirect_message = Some(REDIRECT_MESSAGE.to_string());
                if self.countdown.start() {
                    vec![GateEffect::ArmTimer]
                } else {
                    Vec::new()
                }
            }
            Err(e) => {
                error!("Error submitting booking: {}", e);
                self.last_error = Some(e);
                Vec::new()
            }
        }
    }

    fn redirect(&self) -> Vec<GateEffect> {
        vec![
            GateEffect::DisarmTimer,
            GateEffect::Navigate(self.destination.clone()),
            GateEffect::RequestClose,
        ]
    }

    fn tick(&mut self) -> Vec<GateEffect> {
        match self.countdown.tick() {
            Tick::Idle => Vec::new(),
            Tick::Remaining(n) => {
                debug!("Redirecting in {}s", n);
                Vec::new()
            }
            Tick::Completed => {
                info!("Redirect countdown completed, opening {}", self.destination);
                self.redirect()
            }
        }
    }

    fn redirect_now(&mut self) -> Vec<GateEffect> {
        if !self.counting_down() {
            debug!("Redirect-now ignored: no countdown in progress");
            return Vec::new();
        }
        self.countdown.cancel();
        info!("Manual redirect to {}", self.destination);
        self.redirect()
    }

    fn teardown(&mut self) -> Vec<GateEffect> {
        self.submitting = false;
        self.epoch += 1;
        if self.countdown.cancel() {
            vec![GateEffect::DisarmTimer]
        } else {
            Vec::new()
        }
    }

    fn footer(&self) -> Footer {
        if self.submitting {
            Footer::Submitting
        } else if self.counting_down() {
            Footer::CountingDown {
                remaining: self.countdown.remaining(),
            }
        } else {
            Footer::Actions
        }
    }
}

impl ConfirmationGate for BookingCoordinator {
    fn handle(&mut self, event: GateEvent) -> Vec<GateEffect> {
        match event {
            GateEvent::SetOpen(open) => self.set_open(open),
            GateEvent::Proceed { parent_busy } => self.proceed(parent_busy),
            GateEvent::SubmitSettled { epoch, outcome } => self.submit_settled(epoch, outcome),
            GateEvent::Tick => self.tick(),
            GateEvent::RedirectNow => self.redirect_now(),
            GateEvent::Teardown => self.teardown(),
            other => {
                debug!("Booking gate ignoring {:?}", other);
                Vec::new()
            }
        }
    }

    fn snapshot(&self) -> GateSnapshot {
        GateSnapshot::Booking(BookingSnapshot {
            open: self.open,
            submitting: self.submitting,
            redirect_message: self.redirect_message.clone(),
            countdown: self.countdown.remaining(),
            timer_running: self.countdown.is_running(),
            destination: self.destination.clone(),
            submit_error: if self.surface_errors {
                self.last_error.clone()
            } else {
                None
            },
            footer: self.footer(),
        })
    }
}
