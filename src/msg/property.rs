//! MAPI property streams ([MS-OXMSG] §2.4).
//!
//! Every storage of a `.msg` file (the message root, each recipient and each
//! attachment) carries a `__properties_version1.0` stream: a header followed
//! by 16-byte entries. Fixed-size values (integers, booleans, times) live in
//! the entry itself; variable-size values (strings, binaries) only record
//! their length there and are stored in a sibling `__substg1.0_IIIITTTT`
//! stream.

use std::collections::HashMap;

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::{DateTime, Utc};

use crate::error::{ConvertError, Result};

/// Name of the property stream inside every storage.
pub const PROPERTIES_STREAM: &str = "__properties_version1.0";

/// Header length of the top-level message property stream.
pub const MESSAGE_HEADER_LEN: usize = 32;

/// Header length of recipient and attachment property streams.
pub const OBJECT_HEADER_LEN: usize = 8;

const ENTRY_LEN: usize = 16;

/// Seconds between 1601-01-01 (FILETIME epoch) and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;

/// Property value types used by the reader.
pub mod kind {
    pub const LONG: u16 = 0x0003;
    pub const OBJECT: u16 = 0x000D;
    pub const STRING8: u16 = 0x001E;
    pub const UNICODE: u16 = 0x001F;
    pub const SYSTIME: u16 = 0x0040;
    pub const BINARY: u16 = 0x0102;
}

/// Property identifiers used by the reader.
pub mod id {
    pub const SUBJECT: u16 = 0x0037;
    pub const CLIENT_SUBMIT_TIME: u16 = 0x0039;
    pub const SENT_REPRESENTING_NAME: u16 = 0x0042;
    pub const SENT_REPRESENTING_EMAIL_ADDRESS: u16 = 0x0065;
    pub const TRANSPORT_MESSAGE_HEADERS: u16 = 0x007D;
    pub const RECIPIENT_TYPE: u16 = 0x0C15;
    pub const SENDER_NAME: u16 = 0x0C1A;
    pub const SENDER_EMAIL_ADDRESS: u16 = 0x0C1F;
    pub const MESSAGE_DELIVERY_TIME: u16 = 0x0E06;
    pub const BODY: u16 = 0x1000;
    pub const HTML: u16 = 0x1013;
    pub const INTERNET_MESSAGE_ID: u16 = 0x1035;
    pub const IN_REPLY_TO_ID: u16 = 0x1042;
    pub const DISPLAY_NAME: u16 = 0x3001;
    pub const EMAIL_ADDRESS: u16 = 0x3003;
    pub const ATTACH_DATA: u16 = 0x3701;
    pub const ATTACH_FILENAME: u16 = 0x3704;
    pub const ATTACH_METHOD: u16 = 0x3705;
    pub const ATTACH_LONG_FILENAME: u16 = 0x3707;
    pub const SMTP_ADDRESS: u16 = 0x39FE;
    pub const INTERNET_CPID: u16 = 0x3FDE;
    pub const MESSAGE_CODEPAGE: u16 = 0x3FFD;
    pub const SENDER_SMTP_ADDRESS: u16 = 0x5D01;
    pub const SENT_REPRESENTING_SMTP_ADDRESS: u16 = 0x5D02;
}

/// Name of the stream holding a variable-size property value.
pub fn value_stream_name(prop_id: u16, prop_kind: u16) -> String {
    format!("__substg1.0_{prop_id:04X}{prop_kind:04X}")
}

/// A fixed-size property entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    kind: u16,
    value: [u8; 8],
}

/// Fixed-size properties of one storage, keyed by property id.
#[derive(Debug, Clone, Default)]
pub struct PropertySet {
    entries: HashMap<u16, Entry>,
}

impl PropertySet {
    /// Parse a `__properties_version1.0` stream.
    ///
    /// `header_len` is [`MESSAGE_HEADER_LEN`] for the message root and
    /// [`OBJECT_HEADER_LEN`] for recipients and attachments. A trailing
    /// partial entry is ignored.
    pub fn parse(data: &[u8], header_len: usize, stream: &str) -> Result<Self> {
        if data.len() < header_len {
            return Err(ConvertError::InvalidProperty {
                stream: stream.to_string(),
                reason: format!(
                    "{} bytes, shorter than the {header_len}-byte header",
                    data.len()
                ),
            });
        }

        let body = &data[header_len..];
        if body.len() % ENTRY_LEN != 0 {
            tracing::debug!(
                stream = stream,
                trailing = body.len() % ENTRY_LEN,
                "Ignoring partial property entry"
            );
        }

        let mut entries = HashMap::new();
        for mut chunk in body.chunks_exact(ENTRY_LEN) {
            let tag = chunk
                .read_u32::<LittleEndian>()
                .map_err(|e| truncated(stream, e))?;
            let _flags = chunk
                .read_u32::<LittleEndian>()
                .map_err(|e| truncated(stream, e))?;
            let mut value = [0u8; 8];
            value.copy_from_slice(chunk);

            let prop_id = (tag >> 16) as u16;
            let kind = (tag & 0xFFFF) as u16;
            entries.insert(prop_id, Entry { kind, value });
        }

        Ok(Self { entries })
    }

    /// Number of properties in the set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if the stream declared no properties.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A `PT_LONG` value.
    pub fn long(&self, prop_id: u16) -> Option<u32> {
        self.entries
            .get(&prop_id)
            .filter(|e| e.kind == kind::LONG)
            .map(|e| u32::from_le_bytes([e.value[0], e.value[1], e.value[2], e.value[3]]))
    }

    /// A `PT_SYSTIME` value converted from FILETIME.
    pub fn time(&self, prop_id: u16) -> Option<DateTime<Utc>> {
        self.entries
            .get(&prop_id)
            .filter(|e| e.kind == kind::SYSTIME)
            .and_then(|e| filetime_to_datetime(u64::from_le_bytes(e.value)))
    }

    /// The declared type of a property, if present.
    pub fn kind_of(&self, prop_id: u16) -> Option<u16> {
        self.entries.get(&prop_id).map(|e| e.kind)
    }
}

fn truncated(stream: &str, e: std::io::Error) -> ConvertError {
    ConvertError::InvalidProperty {
        stream: stream.to_string(),
        reason: e.to_string(),
    }
}

/// Convert a Windows FILETIME (100 ns ticks since 1601) to UTC.
///
/// Zero means "not set" and yields `None`.
pub fn filetime_to_datetime(ticks: u64) -> Option<DateTime<Utc>> {
    if ticks == 0 {
        return None;
    }
    let secs = (ticks / 10_000_000) as i64 - FILETIME_UNIX_OFFSET;
    let nanos = ((ticks % 10_000_000) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}
