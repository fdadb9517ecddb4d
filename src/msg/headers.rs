//! Original internet headers saved with received items.
//!
//! Received messages keep their transport headers in
//! `PR_TRANSPORT_MESSAGE_HEADERS`. They are only consulted when the MAPI
//! properties themselves lack a sender, date or Message-ID.

use chrono::{DateTime, FixedOffset};
use mail_parser::MessageParser;

use crate::model::address::EmailAddress;

/// The handful of transport header fields used as fallbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportHeaders {
    pub from: Option<EmailAddress>,
    pub date: Option<DateTime<FixedOffset>>,
    pub message_id: Option<String>,
}

impl TransportHeaders {
    /// Parse a raw header block. Unparseable input yields empty headers.
    pub fn parse(raw: &str) -> Self {
        // Terminate the header block so mail-parser sees an (empty) body.
        let block = format!("{}\r\n\r\n", raw.trim_end());
        let parser = MessageParser::default();
        let Some(msg) = parser.parse(block.as_bytes()) else {
            tracing::debug!("Transport headers could not be parsed");
            return Self::default();
        };

        let from = msg.from().and_then(|a| a.first()).and_then(|addr| {
            let address = addr.address().unwrap_or_default();
            if address.is_empty() {
                None
            } else {
                Some(EmailAddress::new(addr.name().unwrap_or_default(), address))
            }
        });

        let date = msg
            .date()
            .and_then(|d| DateTime::parse_from_rfc3339(&d.to_rfc3339()).ok());

        let message_id = msg
            .message_id()
            .filter(|id| !id.is_empty())
            .map(|id| format!("<{id}>"));

        Self {
            from,
            date,
            message_id,
        }
    }
}
