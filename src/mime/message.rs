//! In-memory MIME message model.

use chrono::{DateTime, FixedOffset};

use crate::model::address::EmailAddress;

/// `text/*` subtypes emitted for message bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Plain,
    Html,
}

impl TextKind {
    pub fn subtype(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Html => "html",
        }
    }
}

/// `multipart/*` subtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipartKind {
    /// Same content in different formats, simplest first.
    Alternative,
    /// Body followed by attachments.
    Mixed,
}

impl MultipartKind {
    pub fn subtype(self) -> &'static str {
        match self {
            Self::Alternative => "alternative",
            Self::Mixed => "mixed",
        }
    }
}

/// A file attachment, always written Base64 with `attachment` disposition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentPart {
    pub content_type: String,
    pub filename: String,
    pub data: Vec<u8>,
}

/// One node of the body tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text { kind: TextKind, content: String },
    Attachment(AttachmentPart),
    Multipart { kind: MultipartKind, parts: Vec<Part> },
}

impl Part {
    pub fn plain(content: impl Into<String>) -> Self {
        Self::Text {
            kind: TextKind::Plain,
            content: content.into(),
        }
    }

    pub fn html(content: impl Into<String>) -> Self {
        Self::Text {
            kind: TextKind::Html,
            content: content.into(),
        }
    }

    /// The empty `text/plain` body used when an item has no body at all.
    pub fn empty() -> Self {
        Self::plain(String::new())
    }

    /// Attachment parts reachable from this node, in document order.
    pub fn attachments(&self) -> Vec<&AttachmentPart> {
        match self {
            Self::Attachment(a) => vec![a],
            Self::Text { .. } => Vec::new(),
            Self::Multipart { parts, .. } => parts.iter().flat_map(Part::attachments).collect(),
        }
    }
}

/// A complete message ready for serialization.
///
/// Built once per converted item and dropped after it has been written.
#[derive(Debug, Clone, PartialEq)]
pub struct MimeMessage {
    pub from: Option<EmailAddress>,
    pub to: Vec<EmailAddress>,
    pub cc: Vec<EmailAddress>,
    pub bcc: Vec<EmailAddress>,
    pub subject: String,
    pub date: DateTime<FixedOffset>,
    pub message_id: Option<String>,
    pub in_reply_to: Option<String>,
    pub body: Part,
}

impl MimeMessage {
    /// An empty message dated `date`.
    pub fn new(date: DateTime<FixedOffset>) -> Self {
        Self {
            from: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: String::new(),
            date,
            message_id: None,
            in_reply_to: None,
            body: Part::empty(),
        }
    }
}
