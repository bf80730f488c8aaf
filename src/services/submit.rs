//! Submit actions run by booking gates

use std::sync::Arc;

use futures::future::BoxFuture;

use super::inbox::{ContactRequest, Inbox};

/// Zero-argument async operation awaited by a booking gate before it
/// starts the redirect countdown.
pub trait SubmitAction: Send + Sync {
    fn submit(&self) -> BoxFuture<'static, anyhow::Result<()>>;
}

/// Any `Fn() -> Future` closure works as a submit action
impl<F> SubmitAction for F
where
    F: Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync,
{
    fn submit(&self) -> BoxFuture<'static, anyhow::Result<()>> {
        (self)()
    }
}

/// Delivers one booking request to the inbox
#[derive(Debug, Clone)]
pub struct InboxSubmit {
    inbox: Arc<Inbox>,
    request: ContactRequest,
}

impl InboxSubmit {
    pub fn new(inbox: Arc<Inbox>, request: ContactRequest) -> Self {
        Self { inbox, request }
    }
}

impl SubmitAction for InboxSubmit {
    fn submit(&self) -> BoxFuture<'static, anyhow::Result<()>> {
        let inbox = Arc::clone(&self.inbox);
        let request = self.request.clone();
        Box::pin(async move {
            inbox.accept(&request)?;
            Ok(())
        })
    }
}
