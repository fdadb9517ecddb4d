//! `msg2eml`: convert Outlook `.msg` items into standard MIME `.eml` files.
//!
//! The pipeline is linear: [`msg`] reads the compound file into a
//! [`model::mail::MailItem`], [`convert`] maps it onto a [`mime::MimeMessage`]
//! and writes the serialized document, and [`batch`] drives single-file or
//! recursive directory runs.

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod i18n;
pub mod mime;
pub mod model;
pub mod msg;
