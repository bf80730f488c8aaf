//! External collaborators of the gates
//!
//! Navigation sinks, submit actions, and the inbox that booking and contact
//! requests are delivered to.

pub mod inbox;
pub mod navigation;
pub mod submit;

// Re-export main types
pub use inbox::{ContactRequest, Inbox, StoredRequest, ValidationError};
pub use navigation::{ChannelNavigator, NavigationRequest, NavigationSink};
pub use submit::{InboxSubmit, SubmitAction};
