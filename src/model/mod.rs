//! Core data model types for Outlook items: addresses, recipients and attachments.

pub mod address;
pub mod attachment;
pub mod mail;
