//! Map an Outlook [`MailItem`] onto a [`MimeMessage`].

use chrono::{DateTime, FixedOffset};

use crate::mime::types::mime_type_from_filename;
use crate::mime::{AttachmentPart, MimeMessage, MultipartKind, Part};
use crate::model::mail::{MailItem, RecipientRole};

/// Build the MIME message for one item.
///
/// `fallback_date` is used when the item carries no sent date. No I/O.
pub fn map_message(item: MailItem, fallback_date: DateTime<FixedOffset>) -> MimeMessage {
    let mut msg = MimeMessage::new(item.sent_on.unwrap_or(fallback_date));

    msg.from = item.sender.filter(|s| s.has_address());

    for recipient in item.recipients {
        match recipient.role {
            RecipientRole::To => msg.to.push(recipient.address),
            RecipientRole::Cc => msg.cc.push(recipient.address),
            RecipientRole::Bcc => msg.bcc.push(recipient.address),
            RecipientRole::Unknown(value) => {
                tracing::trace!(role = value, "Dropping recipient with unknown role");
            }
        }
    }

    msg.subject = item.subject.unwrap_or_default();
    msg.message_id = item.message_id;
    msg.in_reply_to = item.in_reply_to;

    let attachments: Vec<Part> = item
        .attachments
        .into_iter()
        .map(|att| {
            Part::Attachment(AttachmentPart {
                content_type: mime_type_from_filename(&att.filename).to_string(),
                filename: att.filename,
                data: att.data,
            })
        })
        .collect();

    msg.body = build_body(item.body_text, item.body_html, attachments);
    msg
}

/// Assemble the body tree.
///
/// - text + html → `multipart/alternative`
/// - one of them → that part alone
/// - neither → empty `text/plain`
/// - attachments wrap the above in `multipart/mixed`; an absent body is
///   then left out rather than sent as an empty part
fn build_body(text: Option<String>, html: Option<String>, attachments: Vec<Part>) -> Part {
    let text = text.filter(|t| !t.is_empty());
    let html = html.filter(|h| !h.is_empty());

    let body = match (text, html) {
        (Some(text), Some(html)) => Some(Part::Multipart {
            kind: MultipartKind::Alternative,
            parts: vec![Part::plain(text), Part::html(html)],
        }),
        (Some(text), None) => Some(Part::plain(text)),
        (None, Some(html)) => Some(Part::html(html)),
        (None, None) => None,
    };

    if attachments.is_empty() {
        return body.unwrap_or_else(Part::empty);
    }

    let mut parts = Vec::with_capacity(attachments.len() + 1);
    parts.extend(body);
    parts.extend(attachments);
    Part::Multipart {
        kind: MultipartKind::Mixed,
        parts,
    }
}
