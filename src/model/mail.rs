//! The mailbox item as exposed by the container reader.

use chrono::{DateTime, FixedOffset};

use super::address::EmailAddress;
use super::attachment::Attachment;

/// Which header a recipient belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientRole {
    To,
    Cc,
    Bcc,
    /// Any other `PR_RECIPIENT_TYPE` value (originator entries, vendor values).
    Unknown(u32),
}

impl RecipientRole {
    /// Flag set on recipients of a resent message; not part of the role itself.
    const RESEND_FLAG: u32 = 0x1000_0000;

    /// Map a MAPI `PR_RECIPIENT_TYPE` value to a role.
    pub fn from_mapi(value: u32) -> Self {
        match value & !Self::RESEND_FLAG {
            1 => Self::To,
            2 => Self::Cc,
            3 => Self::Bcc,
            _ => Self::Unknown(value),
        }
    }
}

/// A single recipient row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub address: EmailAddress,
    pub role: RecipientRole,
}

/// Everything the converter needs from one Outlook item.
///
/// Built in one pass by the reader; the source file is already closed by the
/// time a caller sees this value.
#[derive(Debug, Clone, Default)]
pub struct MailItem {
    /// Sender, if the item carries one.
    pub sender: Option<EmailAddress>,

    /// Recipients in the order of their storages inside the item.
    pub recipients: Vec<Recipient>,

    /// Subject line (`None` when the property is absent or empty).
    pub subject: Option<String>,

    /// Submit time, or the `Date:` of the original transport headers.
    pub sent_on: Option<DateTime<FixedOffset>>,

    /// Plain-text body.
    pub body_text: Option<String>,

    /// HTML body.
    pub body_html: Option<String>,

    /// File attachments in storage order.
    pub attachments: Vec<Attachment>,

    /// Internet `Message-ID`, angle brackets included.
    pub message_id: Option<String>,

    /// Internet `In-Reply-To`, angle brackets included.
    pub in_reply_to: Option<String>,
}
