//! Synthesises Outlook `.msg` compound files for the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;

use cfb::CompoundFile;
use chrono::{DateTime, Utc};

const PT_LONG: u32 = 0x0003;
const PT_SYSTIME: u32 = 0x0040;

const MESSAGE_HEADER_LEN: usize = 32;
const OBJECT_HEADER_LEN: usize = 8;

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: i64 = 11_644_473_600;

pub const ROLE_TO: u32 = 1;
pub const ROLE_CC: u32 = 2;
pub const ROLE_BCC: u32 = 3;

struct RecipientSpec {
    name: String,
    address: String,
    role: Option<u32>,
}

struct AttachmentSpec {
    filename: String,
    data: Vec<u8>,
    method: u32,
}

/// Builder for a minimal but well-formed `.msg` file.
#[derive(Default)]
pub struct MsgBuilder {
    subject: Option<String>,
    sender: Option<(String, String)>,
    sent: Option<DateTime<Utc>>,
    body: Option<String>,
    html: Option<String>,
    message_id: Option<String>,
    recipients: Vec<RecipientSpec>,
    attachments: Vec<AttachmentSpec>,
}

impl MsgBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn sender(mut self, name: &str, address: &str) -> Self {
        self.sender = Some((name.to_string(), address.to_string()));
        self
    }

    pub fn sent(mut self, at: DateTime<Utc>) -> Self {
        self.sent = Some(at);
        self
    }

    pub fn body(mut self, text: &str) -> Self {
        self.body = Some(text.to_string());
        self
    }

    pub fn html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    pub fn message_id(mut self, id: &str) -> Self {
        self.message_id = Some(id.to_string());
        self
    }

    /// Add a recipient with a raw MAPI `PR_RECIPIENT_TYPE` (`None` omits it).
    pub fn recipient(mut self, name: &str, address: &str, role: Option<u32>) -> Self {
        self.recipients.push(RecipientSpec {
            name: name.to_string(),
            address: address.to_string(),
            role,
        });
        self
    }

    pub fn to(self, address: &str) -> Self {
        self.recipient("", address, Some(ROLE_TO))
    }

    pub fn cc(self, address: &str) -> Self {
        self.recipient("", address, Some(ROLE_CC))
    }

    pub fn bcc(self, address: &str) -> Self {
        self.recipient("", address, Some(ROLE_BCC))
    }

    pub fn attachment(mut self, filename: &str, data: &[u8]) -> Self {
        self.attachments.push(AttachmentSpec {
            filename: filename.to_string(),
            data: data.to_vec(),
            method: 1,
        });
        self
    }

    /// An embedded-message attachment, which the converter skips.
    pub fn embedded_message(mut self, filename: &str) -> Self {
        self.attachments.push(AttachmentSpec {
            filename: filename.to_string(),
            data: Vec::new(),
            method: 5,
        });
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut comp = CompoundFile::create(Cursor::new(Vec::new())).unwrap();

        let mut root_props = vec![0u8; MESSAGE_HEADER_LEN];
        if let Some(sent) = self.sent {
            root_props.extend(systime_entry(0x0039, sent));
        }
        stream(&mut comp, "/__properties_version1.0", &root_props);

        if let Some(subject) = &self.subject {
            stream(&mut comp, "/__substg1.0_0037001F", &utf16(subject));
        }
        if let Some((name, address)) = &self.sender {
            stream(&mut comp, "/__substg1.0_0C1A001F", &utf16(name));
            stream(&mut comp, "/__substg1.0_5D01001F", &utf16(address));
        }
        if let Some(body) = &self.body {
            stream(&mut comp, "/__substg1.0_1000001F", &utf16(body));
        }
        if let Some(html) = &self.html {
            stream(&mut comp, "/__substg1.0_10130102", html.as_bytes());
        }
        if let Some(id) = &self.message_id {
            stream(&mut comp, "/__substg1.0_1035001F", &utf16(id));
        }

        for (i, recip) in self.recipients.iter().enumerate() {
            let dir = format!("/__recip_version1.0_#{i:08X}");
            comp.create_storage(&dir).unwrap();
            let mut props = vec![0u8; OBJECT_HEADER_LEN];
            if let Some(role) = recip.role {
                props.extend(long_entry(0x0C15, role));
            }
            stream(&mut comp, &format!("{dir}/__properties_version1.0"), &props);
            if !recip.name.is_empty() {
                stream(&mut comp, &format!("{dir}/__substg1.0_3001001F"), &utf16(&recip.name));
            }
            stream(
                &mut comp,
                &format!("{dir}/__substg1.0_39FE001F"),
                &utf16(&recip.address),
            );
        }

        for (i, att) in self.attachments.iter().enumerate() {
            let dir = format!("/__attach_version1.0_#{i:08X}");
            comp.create_storage(&dir).unwrap();
            let mut props = vec![0u8; OBJECT_HEADER_LEN];
            props.extend(long_entry(0x3705, att.method));
            stream(&mut comp, &format!("{dir}/__properties_version1.0"), &props);
            stream(
                &mut comp,
                &format!("{dir}/__substg1.0_3707001F"),
                &utf16(&att.filename),
            );
            if att.method == 1 {
                stream(&mut comp, &format!("{dir}/__substg1.0_37010102"), &att.data);
            }
        }

        comp.flush().unwrap();
        comp.into_inner().into_inner()
    }

    pub fn write_to(&self, path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, self.build()).unwrap();
    }
}

fn stream(comp: &mut CompoundFile<Cursor<Vec<u8>>>, path: &str, data: &[u8]) {
    let mut s = comp.create_stream(path).unwrap();
    s.write_all(data).unwrap();
    s.flush().unwrap();
}

fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

fn long_entry(prop_id: u16, value: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(&((u32::from(prop_id) << 16) | PT_LONG).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&value.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out
}

fn systime_entry(prop_id: u16, at: DateTime<Utc>) -> Vec<u8> {
    let filetime = ((at.timestamp() + FILETIME_UNIX_OFFSET) as u64) * 10_000_000;
    let mut out = Vec::with_capacity(16);
    out.extend_from_slice(&((u32::from(prop_id) << 16) | PT_SYSTIME).to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&filetime.to_le_bytes());
    out
}
