//! MIME message model and serializer.
//!
//! Only the subset this tool emits is implemented: single text parts,
//! `multipart/alternative`, `multipart/mixed` and Base64 attachment parts.

pub mod encode;
pub mod message;
pub mod types;
pub mod writer;

pub use message::{AttachmentPart, MimeMessage, MultipartKind, Part, TextKind};
