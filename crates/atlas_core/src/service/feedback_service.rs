//! Feedback composition and delivery.
//!
//! # Responsibility
//! - Turn free text plus category tags into the endpoint payload.
//! - Deliver through the configured endpoint, falling back to the clipboard once.
//!
//! # Invariants
//! - No retries: one network attempt at most, then one clipboard attempt.
//! - Log events never include the feedback text.

use crate::validation::sanitize_string;
use log::{info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const MAX_FEEDBACK_LENGTH: usize = 5000;
const SUBJECT_PREFIX: &str = "Atlas feedback";

/// Tag attached to a feedback message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Bug,
    Feature,
    Content,
    Usability,
    Other,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 5] = [
        Self::Bug,
        Self::Feature,
        Self::Content,
        Self::Usability,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Content => "content",
            Self::Usability => "usability",
            Self::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bug => "Bug report",
            Self::Feature => "Feature request",
            Self::Content => "Content issue",
            Self::Usability => "Usability",
            Self::Other => "Other",
        }
    }
}

impl FromStr for FeedbackCategory {
    type Err = FeedbackError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| FeedbackError::UnknownCategory(value.to_string()))
    }
}

/// JSON body accepted by the feedback endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackPayload {
    pub message: String,
    #[serde(rename = "_subject")]
    pub subject: String,
}

impl FeedbackPayload {
    /// Plain-text rendering used for the clipboard fallback.
    pub fn clipboard_text(&self) -> String {
        format!("Subject: {}\n\n{}", self.subject, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackError {
    EmptyMessage,
    UnknownCategory(String),
    /// Neither the endpoint nor the clipboard accepted the message.
    Undeliverable {
        send_error: Option<String>,
        copy_error: String,
    },
}

impl Display for FeedbackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyMessage => write!(f, "feedback message must not be empty"),
            Self::UnknownCategory(value) => write!(
                f,
                "unknown feedback category `{value}`; expected bug|feature|content|usability|other"
            ),
            Self::Undeliverable {
                send_error: Some(send_error),
                copy_error,
            } => write!(
                f,
                "could not send feedback ({send_error}) or copy it to the clipboard ({copy_error})"
            ),
            Self::Undeliverable {
                send_error: None,
                copy_error,
            } => write!(f, "could not copy feedback to the clipboard ({copy_error})"),
        }
    }
}

impl Error for FeedbackError {}

/// How a submission was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackOutcome {
    Sent,
    CopiedToClipboard,
}

/// Network delivery of a payload to an endpoint.
pub trait FeedbackTransport {
    fn post(&self, endpoint: &str, payload: &FeedbackPayload) -> Result<(), String>;
}

/// Fallback sink for the formatted message.
pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<(), String>;
}

/// Builds the endpoint payload.
///
/// The message is sanitized (nulls stripped, trimmed, at most
/// [`MAX_FEEDBACK_LENGTH`] chars). Categories are deduplicated in the order given.
pub fn compose_feedback(
    message: &str,
    categories: &[FeedbackCategory],
) -> Result<FeedbackPayload, FeedbackError> {
    let message = sanitize_string(message, MAX_FEEDBACK_LENGTH);
    if message.is_empty() {
        return Err(FeedbackError::EmptyMessage);
    }

    let mut labels: Vec<&str> = Vec::new();
    for category in categories {
        if !labels.contains(&category.label()) {
            labels.push(category.label());
        }
    }
    let subject = if labels.is_empty() {
        SUBJECT_PREFIX.to_string()
    } else {
        format!("{SUBJECT_PREFIX}: {}", labels.join(", "))
    };

    Ok(FeedbackPayload { message, subject })
}

/// Submits feedback through an endpoint with a clipboard fallback.
pub struct FeedbackService<T: FeedbackTransport, C: Clipboard> {
    endpoint: Option<String>,
    transport: T,
    clipboard: C,
}

impl<T: FeedbackTransport, C: Clipboard> FeedbackService<T, C> {
    pub fn new(endpoint: Option<String>, transport: T, clipboard: C) -> Self {
        Self {
            endpoint,
            transport,
            clipboard,
        }
    }

    /// Composes and delivers one message.
    ///
    /// # Contract
    /// - With an endpoint: post once; on failure copy to the clipboard.
    /// - Without an endpoint: copy to the clipboard directly.
    /// - `Undeliverable` only when the clipboard copy fails too.
    pub fn submit(
        &self,
        message: &str,
        categories: &[FeedbackCategory],
    ) -> Result<FeedbackOutcome, FeedbackError> {
        let payload = compose_feedback(message, categories)?;

        let send_error = match self.endpoint.as_deref() {
            Some(endpoint) => match self.transport.post(endpoint, &payload) {
                Ok(()) => {
                    info!(
                        "event=feedback_submit module=service status=ok channel=endpoint chars={}",
                        payload.message.chars().count()
                    );
                    return Ok(FeedbackOutcome::Sent);
                }
                Err(err) => {
                    warn!("event=feedback_submit module=service status=error channel=endpoint");
                    Some(err)
                }
            },
            None => None,
        };

        match self.clipboard.copy(&payload.clipboard_text()) {
            Ok(()) => {
                info!("event=feedback_submit module=service status=ok channel=clipboard");
                Ok(FeedbackOutcome::CopiedToClipboard)
            }
            Err(copy_error) => {
                warn!("event=feedback_submit module=service status=error channel=clipboard");
                Err(FeedbackError::Undeliverable {
                    send_error,
                    copy_error,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        compose_feedback, Clipboard, FeedbackCategory, FeedbackError, FeedbackOutcome,
        FeedbackPayload, FeedbackService, FeedbackTransport, MAX_FEEDBACK_LENGTH,
    };
    use std::cell::RefCell;

    struct FakeTransport {
        fail: bool,
        posted: RefCell<Vec<(String, FeedbackPayload)>>,
    }

    impl FakeTransport {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                posted: RefCell::new(Vec::new()),
            }
        }
    }

    impl FeedbackTransport for FakeTransport {
        fn post(&self, endpoint: &str, payload: &FeedbackPayload) -> Result<(), String> {
            self.posted
                .borrow_mut()
                .push((endpoint.to_string(), payload.clone()));
            if self.fail {
                Err("503 Service Unavailable".to_string())
            } else {
                Ok(())
            }
        }
    }

    struct FakeClipboard {
        fail: bool,
        copied: RefCell<Vec<String>>,
    }

    impl FakeClipboard {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                copied: RefCell::new(Vec::new()),
            }
        }
    }

    impl Clipboard for FakeClipboard {
        fn copy(&self, text: &str) -> Result<(), String> {
            if self.fail {
                return Err("clipboard unavailable".to_string());
            }
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    const ENDPOINT: &str = "https://forms.example.com/f/atlas";

    #[test]
    fn compose_sanitizes_and_builds_subject() {
        let payload = compose_feedback(
            "  Great atlas\0!  ",
            &[
                FeedbackCategory::Bug,
                FeedbackCategory::Usability,
                FeedbackCategory::Bug,
            ],
        )
        .expect("payload");
        assert_eq!(payload.message, "Great atlas!");
        assert_eq!(payload.subject, "Atlas feedback: Bug report, Usability");

        let json = serde_json::to_value(&payload).expect("json");
        assert_eq!(json["_subject"], "Atlas feedback: Bug report, Usability");
    }

    #[test]
    fn compose_rejects_empty_and_caps_length() {
        assert_eq!(compose_feedback(" \0 ", &[]), Err(FeedbackError::EmptyMessage));
        let payload = compose_feedback(&"a".repeat(6000), &[]).expect("payload");
        assert_eq!(payload.message.chars().count(), MAX_FEEDBACK_LENGTH);
        assert_eq!(payload.subject, "Atlas feedback");
    }

    #[test]
    fn category_parsing_is_case_insensitive() {
        assert_eq!("Feature".parse(), Ok(FeedbackCategory::Feature));
        assert!(matches!(
            "praise".parse::<FeedbackCategory>(),
            Err(FeedbackError::UnknownCategory(_))
        ));
    }

    #[test]
    fn sends_through_endpoint_when_configured() {
        let service = FeedbackService::new(
            Some(ENDPOINT.to_string()),
            FakeTransport::new(false),
            FakeClipboard::new(false),
        );
        let outcome = service.submit("hello", &[]).expect("submit");
        assert_eq!(outcome, FeedbackOutcome::Sent);
        assert_eq!(service.transport.posted.borrow()[0].0, ENDPOINT);
        assert!(service.clipboard.copied.borrow().is_empty());
    }

    #[test]
    fn falls_back_to_clipboard_once() {
        let service = FeedbackService::new(
            Some(ENDPOINT.to_string()),
            FakeTransport::new(true),
            FakeClipboard::new(false),
        );
        let outcome = service
            .submit("hello", &[FeedbackCategory::Content])
            .expect("submit");
        assert_eq!(outcome, FeedbackOutcome::CopiedToClipboard);
        assert_eq!(service.transport.posted.borrow().len(), 1);
        assert_eq!(
            service.clipboard.copied.borrow()[0],
            "Subject: Atlas feedback: Content issue\n\nhello"
        );
    }

    #[test]
    fn without_endpoint_never_touches_transport() {
        let service = FeedbackService::new(None, FakeTransport::new(false), FakeClipboard::new(false));
        assert_eq!(
            service.submit("hello", &[]).expect("submit"),
            FeedbackOutcome::CopiedToClipboard
        );
        assert!(service.transport.posted.borrow().is_empty());
    }

    #[test]
    fn reports_final_error_when_both_channels_fail() {
        let service = FeedbackService::new(
            Some(ENDPOINT.to_string()),
            FakeTransport::new(true),
            FakeClipboard::new(true),
        );
        let err = service.submit("hello", &[]).unwrap_err();
        assert_eq!(
            err,
            FeedbackError::Undeliverable {
                send_error: Some("503 Service Unavailable".to_string()),
                copy_error: "clipboard unavailable".to_string(),
            }
        );
    }
}
