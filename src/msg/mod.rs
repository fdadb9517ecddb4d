//! Outlook `.msg` container reader.
//!
//! A `.msg` file is an OLE compound file ([MS-CFB]) whose streams hold MAPI
//! properties ([MS-OXMSG]). The `cfb` crate handles the container; this
//! module decodes the property streams into a [`MailItem`](crate::model::mail::MailItem).

pub mod codepage;
pub mod headers;
pub mod property;
pub mod reader;

pub use codepage::CodepageTable;
pub use reader::{read_msg, MsgReader};
