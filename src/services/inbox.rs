//! Contact and booking request intake
//!
//! Requests are validated, stamped and kept in memory. This is the hand-off
//! point where a mail relay would pick them up.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const MAX_MESSAGE_LEN: usize = 5000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRequest {
    pub id: u64,
    pub received_at: DateTime<Utc>,
    #[serde(flatten)]
    pub request: ContactRequest,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
    #[error("message is too long ({0} characters, at most {MAX_MESSAGE_LEN})")]
    MessageTooLong(usize),
}

impl ContactRequest {
    /// Check the request and return a trimmed copy
    pub fn validate(&self) -> Result<ContactRequest, ValidationError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if name.is_empty() {
            return Err(ValidationError::Missing("name"));
        }
        if email.is_empty() {
            return Err(ValidationError::Missing("email"));
        }
        if message.is_empty() {
            return Err(ValidationError::Missing("message"));
        }
        if !is_plausible_email(email) {
            return Err(ValidationError::InvalidEmail(email.to_string()));
        }
        let len = message.chars().count();
        if len > MAX_MESSAGE_LEN {
            return Err(ValidationError::MessageTooLong(len));
        }

        Ok(ContactRequest {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
            service: self
                .service
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.contains(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// In-memory store of accepted requests
#[derive(Debug, Default)]
pub struct Inbox {
    entries: Mutex<Vec<StoredRequest>>,
}

impl Inbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a request
    pub fn accept(&self, request: &ContactRequest) -> anyhow::Result<StoredRequest> {
        let request = request.validate().map_err(|e| {
            warn!("Rejected contact request: {}", e);
            e
        })?;

        let mut entries = self
            .entries
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to lock inbox: {}", e))?;
        let stored = StoredRequest {
            id: entries.len() as u64 + 1,
            received_at: Utc::now(),
            request,
        };
        info!(
            "Accepted request #{} from {} <{}>",
            stored.id, stored.request.name, stored.request.email
        );
        entries.push(stored.clone());
        Ok(stored)
    }

    pub fn list(&self) -> Result<Vec<StoredRequest>, String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .map_err(|e| format!("Failed to lock inbox: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ContactRequest {
        ContactRequest {
            name: "  Ada Lovelace ".to_string(),
            email: "ada@example.com".to_string(),
            message: "We need a new brand identity.".to_string(),
            service: Some(" Branding ".to_string()),
        }
    }

    #[test]
    fn validation_trims_fields() {
        let clean = request().validate().unwrap();
        assert_eq!(clean.name, "Ada Lovelace");
        assert_eq!(clean.service.as_deref(), Some("Branding"));
    }

    #[test]
    fn rejects_missing_and_malformed_fields() {
        let mut r = request();
        r.name = "   ".to_string();
        assert_eq!(r.validate(), Err(ValidationError::Missing("name")));

        for bad in ["ada", "ada@", "@example.com", "ada@example", "a@b@c.com", "ada @example.com"] {
            let mut r = request();
            r.email = bad.to_string();
            assert!(
                matches!(r.validate(), Err(ValidationError::InvalidEmail(_))),
                "{} should be rejected",
                bad
            );
        }

        let mut r = request();
        r.message = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert_eq!(
            r.validate(),
            Err(ValidationError::MessageTooLong(MAX_MESSAGE_LEN + 1))
        );
    }

    #[test]
    fn inbox_numbers_accepted_requests() {
        let inbox = Inbox::new();
        assert_eq!(inbox.accept(&request()).unwrap().id, 1);
        assert!(inbox
            .accept(&ContactRequest {
                email: "nope".to_string(),
                ..request()
            })
            .is_err());
        assert_eq!(inbox.accept(&request()).unwrap().id, 2);
        assert_eq!(inbox.list().unwrap().len(), 2);
    }
}
