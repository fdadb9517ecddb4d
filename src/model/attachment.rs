//! File attachments read from an Outlook item.

/// A by-value file attachment.
///
/// Unlike index metadata, the payload is loaded eagerly: the source handle is
/// released as soon as the item has been read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name (long name preferred over the 8.3 short name).
    pub filename: String,

    /// Raw attachment bytes, exactly as stored in the item.
    pub data: Vec<u8>,
}
