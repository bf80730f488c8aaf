//! Per-gate event loop
//!
//! Every gate instance runs as one task that owns the gate state machine, its
//! single `Ticker` and any in-flight submit. Commands, ticks and submit
//! results are processed one at a time, so no two transitions of the same
//! gate ever overlap. Ending the loop drops the ticker with it.

use std::{collections::VecDeque, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::ticker::Ticker;
use crate::{
    gate::{ConfirmationGate, ContainerGeometry, ContainerRect, GateEffect, GateEvent, GateSnapshot},
    services::{NavigationSink, SubmitAction},
};

/// Called once per completed pointer-gate countdown with the gate id
pub type ConfirmAction = Arc<dyn Fn(u64) + Send + Sync>;

/// User commands forwarded by the view layer
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// `container`, when present, replaces the last reported container box
    PointerMove {
        client_x: f64,
        container: Option<ContainerRect>,
    },
    PointerLeave,
    SetOpen(bool),
    Proceed,
    RedirectNow,
    Unmount,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("gate {0} not found")]
    NotFound(u64),
    #[error("gate {0} is no longer mounted")]
    Unmounted(u64),
}

/// Gate state plus what the session itself has done on the gate's behalf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: u64,
    pub mounted: bool,
    pub gate: GateSnapshot,
    pub navigations: u64,
    pub close_signals: u64,
}

/// A command plus, optionally, where to report the state it produced
#[derive(Debug)]
struct Envelope {
    command: SessionCommand,
    reply: Option<oneshot::Sender<SessionSnapshot>>,
}

struct PendingSubmit {
    epoch: u64,
    future: BoxFuture<'static, anyhow::Result<()>>,
}

/// A gate waiting to be spawned
pub struct GateSession {
    id: u64,
    gate: Box<dyn ConfirmationGate>,
    ticker: Ticker,
    geometry: Option<ContainerRect>,
    navigator: Arc<dyn NavigationSink>,
    submit: Option<Arc<dyn SubmitAction>>,
    on_confirm: Option<ConfirmAction>,
    confirm_destination: Option<String>,
    pending: Option<PendingSubmit>,
    navigations: u64,
    close_signals: u64,
}

impl GateSession {
    pub fn new(
        id: u64,
        gate: Box<dyn ConfirmationGate>,
        navigator: Arc<dyn NavigationSink>,
        tick_period: Duration,
    ) -> Self {
        Self {
            id,
            gate,
            ticker: Ticker::new(tick_period),
            geometry: None,
            navigator,
            submit: None,
            on_confirm: None,
            confirm_destination: None,
            pending: None,
            navigations: 0,
            close_signals: 0,
        }
    }

    pub fn with_submit(mut self, action: Arc<dyn SubmitAction>) -> Self {
        self.submit = Some(action);
        self
    }

    pub fn with_confirm(mut self, action: ConfirmAction) -> Self {
        self.on_confirm = Some(action);
        self
    }

    /// Open `url` through the navigator whenever the gate confirms
    pub fn with_confirm_destination(mut self, url: impl Into<String>) -> Self {
        self.confirm_destination = Some(url.into());
        self
    }

    pub fn with_container(mut self, rect: ContainerRect) -> Self {
        self.geometry = Some(rect);
        self
    }

    fn snapshot(&self, mounted: bool) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            mounted,
            gate: self.gate.snapshot(),
            navigations: self.navigations,
            close_signals: self.close_signals,
        }
    }

    /// Start the event loop on the current runtime
    pub fn spawn(self) -> GateHandle {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(self.snapshot(true));
        let (busy_tx, busy_rx) = watch::channel(false);
        let id = self.id;

        tokio::spawn(self.run(command_rx, snapshot_tx, busy_rx));

        GateHandle {
            id,
            commands: command_tx,
            snapshots: snapshot_rx,
            parent_busy: Arc::new(busy_tx),
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Envelope>,
        snapshots: watch::Sender<SessionSnapshot>,
        parent_busy: watch::Receiver<bool>,
    ) {
        info!("Gate {} mounted", self.id);
        let mut unmount_reply = None;

        loop {
            tokio::select! {
                envelope = commands.recv() => match envelope {
                    None => break,
                    Some(Envelope { command: SessionCommand::Unmount, reply }) => {
                        unmount_reply = reply;
                        break;
                    }
                    Some(Envelope { command, reply }) => {
                        let busy = *parent_busy.borrow();
                        if let Some(event) = self.resolve(command, busy) {
                            self.apply(event);
                        }
                        if let Some(reply) = reply {
                            let _ = reply.send(self.snapshot(true));
                        }
                    }
                },
                _ = self.ticker.tick() => self.apply(GateEvent::Tick),
                (epoch, outcome) = settle(&mut self.pending), if self.pending.is_some() => {
                    self.pending = None;
                    let outcome = outcome.map_err(|e| format!("{:#}", e));
                    self.apply(GateEvent::SubmitSettled { epoch, outcome });
                }
            }
            snapshots.send_replace(self.snapshot(true));
        }

        self.apply(GateEvent::Teardown);
        self.ticker.disarm();
        if self.pending.take().is_some() {
            debug!("Gate {} dropped an unfinished submit", self.id);
        }
        let last = self.snapshot(false);
        snapshots.send_replace(last.clone());
        if let Some(reply) = unmount_reply {
            let _ = reply.send(last);
        }
        info!("Gate {} unmounted", self.id);
    }

    /// Turn a view command into a gate event, filling in what the gate
    /// cannot know by itself
    fn resolve(&mut self, command: SessionCommand, parent_busy: bool) -> Option<GateEvent> {
        match command {
            SessionCommand::PointerMove {
                client_x,
                container,
            } => {
                if container.is_some() {
                    self.geometry = container;
                }
                Some(GateEvent::PointerMove {
                    client_x,
                    container: self.geometry.container_rect(),
                })
            }
            SessionCommand::PointerLeave => Some(GateEvent::PointerLeave),
            SessionCommand::SetOpen(open) => Some(GateEvent::SetOpen(open)),
            SessionCommand::Proceed => Some(GateEvent::Proceed { parent_busy }),
            SessionCommand::RedirectNow => Some(GateEvent::RedirectNow),
            SessionCommand::Unmount => None,
        }
    }

    fn navigate(&mut self, url: &str) {
        self.navigations += 1;
        self.navigator.open(self.id, url);
    }

    /// Run an event through the gate and carry out the effects in order.
    /// Effects may feed further events back (close requests, missing submit
    /// action); those are handled before returning.
    fn apply(&mut self, event: GateEvent) {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            for effect in self.gate.handle(event) {
                match effect {
                    GateEffect::ArmTimer => {
                        self.ticker.arm();
                    }
                    GateEffect::DisarmTimer => {
                        self.ticker.disarm();
                    }
                    GateEffect::Submit { epoch } => match &self.submit {
                        Some(action) => {
                            if self.pending.is_some() {
                                debug!("Gate {} abandoning an older submit", self.id);
                            }
                            self.pending = Some(PendingSubmit {
                                epoch,
                                future: action.submit(),
                            });
                        }
                        None => {
                            warn!("Gate {} has no submit action", self.id);
                            queue.push_back(GateEvent::SubmitSettled {
                                epoch,
                                outcome: Err("no submit action configured".to_string()),
                            });
                        }
                    },
                    GateEffect::Navigate(url) => self.navigate(&url),
                    GateEffect::Confirm => {
                        if let Some(url) = self.confirm_destination.clone() {
                            self.navigate(&url);
                        }
                        match &self.on_confirm {
                            Some(confirm) => confirm(self.id),
                            None if self.confirm_destination.is_none() => {
                                debug!("Gate {} confirmed with no confirm action", self.id)
                            }
                            None => {}
                        }
                    }
                    GateEffect::RequestClose => {
                        self.close_signals += 1;
                        queue.push_back(GateEvent::SetOpen(false));
                    }
                }
            }
        }
    }
}

async fn settle(pending: &mut Option<PendingSubmit>) -> (u64, anyhow::Result<()>) {
    match pending.as_mut() {
        Some(submit) => {
            let outcome = (&mut submit.future).await;
            (submit.epoch, outcome)
        }
        None => std::future::pending().await,
    }
}

/// Owner-side handle to a running gate
#[derive(Debug, Clone)]
pub struct GateHandle {
    id: u64,
    commands: mpsc::UnboundedSender<Envelope>,
    snapshots: watch::Receiver<SessionSnapshot>,
    parent_busy: Arc<watch::Sender<bool>>,
}

impl GateHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a command without waiting for it to be processed
    pub fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.commands
            .send(Envelope {
                command,
                reply: None,
            })
            .map_err(|_| SessionError::Unmounted(self.id))
    }

    /// Queue a command and wait for the state it produced
    pub async fn request(&self, command: SessionCommand) -> Result<SessionSnapshot, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Envelope {
                command,
                reply: Some(reply_tx),
            })
            .map_err(|_| SessionError::Unmounted(self.id))?;
        reply_rx.await.map_err(|_| SessionError::Unmounted(self.id))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until the gate publishes a new snapshot
    pub async fn changed(&mut self) -> Result<SessionSnapshot, SessionError> {
        self.snapshots
            .changed()
            .await
            .map_err(|_| SessionError::Unmounted(self.id))?;
        Ok(self.snapshots.borrow_and_update().clone())
    }

    /// The parent owns this flag; the gate only reads it
    pub fn set_parent_busy(&self, busy: bool) {
        self.parent_busy.send_replace(busy);
    }

    pub fn parent_busy(&self) -> bool {
        *self.parent_busy.borrow()
    }

    pub fn unmount(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Unmount)
    }

    pub fn is_mounted(&self) -> bool {
        !self.commands.is_closed()
    }
}
