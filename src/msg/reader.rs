//! Reads an Outlook item out of its compound file.

use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use cfb::CompoundFile;
use chrono::{DateTime, FixedOffset, Local, Utc};
use tracing::debug;

use crate::error::{ConvertError, Result};
use crate::model::address::EmailAddress;
use crate::model::attachment::Attachment;
use crate::model::mail::{MailItem, Recipient, RecipientRole};

use super::codepage::{decode_utf16le, CodepageTable};
use super::headers::TransportHeaders;
use super::property::{
    id, kind, value_stream_name, PropertySet, MESSAGE_HEADER_LEN, OBJECT_HEADER_LEN,
    PROPERTIES_STREAM,
};

const RECIPIENT_PREFIX: &str = "__recip_version1.0_#";
const ATTACHMENT_PREFIX: &str = "__attach_version1.0_#";

/// `PR_ATTACH_METHOD` values that carry no file payload.
const ATTACH_EMBEDDED_MSG: u32 = 5;
const ATTACH_OLE: u32 = 6;

/// One storage of the item together with its fixed-size properties.
struct Storage {
    path: PathBuf,
    props: PropertySet,
}

/// Reader over an open `.msg` compound file.
///
/// The underlying handle lives exactly as long as the reader.
pub struct MsgReader<'a, F> {
    comp: CompoundFile<F>,
    codepages: &'a CodepageTable,
    source: PathBuf,
    codepage: Option<u32>,
}

impl<'a> MsgReader<'a, File> {
    /// Open a `.msg` file from disk.
    pub fn open(path: impl AsRef<Path>, codepages: &'a CodepageTable) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConvertError::FileNotFound(path.to_path_buf())
            } else {
                ConvertError::io(path, e)
            }
        })?;
        Self::from_reader(file, path, codepages)
    }
}

impl<'a, F: Read + Seek> MsgReader<'a, F> {
    /// Wrap any seekable source. `source` is only used in error messages.
    pub fn from_reader(
        inner: F,
        source: impl Into<PathBuf>,
        codepages: &'a CodepageTable,
    ) -> Result<Self> {
        let source = source.into();
        let comp = CompoundFile::open(inner).map_err(|e| {
            ConvertError::invalid_msg(&source, format!("not an OLE compound file ({e})"))
        })?;

        if !comp.is_stream(root().join(PROPERTIES_STREAM)) {
            return Err(ConvertError::invalid_msg(
                &source,
                "missing __properties_version1.0 stream",
            ));
        }

        Ok(Self {
            comp,
            codepages,
            source,
            codepage: None,
        })
    }

    /// Read every field the converter needs.
    pub fn read_item(&mut self) -> Result<MailItem> {
        let message = self.storage(root(), MESSAGE_HEADER_LEN)?;
        self.codepage = message
            .props
            .long(id::MESSAGE_CODEPAGE)
            .or_else(|| message.props.long(id::INTERNET_CPID));

        let headers = self
            .string(&message, id::TRANSPORT_MESSAGE_HEADERS)?
            .map(|raw| TransportHeaders::parse(&raw))
            .unwrap_or_default();

        let sender = self.sender(&message, &headers)?;
        let subject = self.string(&message, id::SUBJECT)?;
        let sent_on = message
            .props
            .time(id::CLIENT_SUBMIT_TIME)
            .map(to_local)
            .or(headers.date)
            .or_else(|| message.props.time(id::MESSAGE_DELIVERY_TIME).map(to_local));
        let body_text = self.string(&message, id::BODY)?;
        let body_html = self.html(&message)?;
        let message_id = self
            .string(&message, id::INTERNET_MESSAGE_ID)?
            .or(headers.message_id);
        let in_reply_to = self.string(&message, id::IN_REPLY_TO_ID)?;

        let recipients = self.recipients()?;
        let attachments = self.attachments()?;

        debug!(
            path = %self.source.display(),
            recipients = recipients.len(),
            attachments = attachments.len(),
            "Read Outlook item"
        );

        Ok(MailItem {
            sender,
            recipients,
            subject,
            sent_on,
            body_text,
            body_html,
            attachments,
            message_id,
            in_reply_to,
        })
    }

    fn sender(
        &mut self,
        message: &Storage,
        headers: &TransportHeaders,
    ) -> Result<Option<EmailAddress>> {
        let mut address = None;
        for prop in [
            id::SENDER_SMTP_ADDRESS,
            id::SENDER_EMAIL_ADDRESS,
            id::SENT_REPRESENTING_SMTP_ADDRESS,
            id::SENT_REPRESENTING_EMAIL_ADDRESS,
        ] {
            // Exchange-internal senders carry an X.500 DN here; skip it.
            if let Some(value) = self.string(message, prop)?.filter(|v| v.contains('@')) {
                address = Some(value);
                break;
            }
        }

        let mut name = self.string(message, id::SENDER_NAME)?;
        if name.is_none() {
            name = self.string(message, id::SENT_REPRESENTING_NAME)?;
        }

        let header_from = headers.from.as_ref();
        let address = address.or_else(|| header_from.map(|f| f.address.clone()));
        let name = name.or_else(|| {
            header_from
                .map(|f| f.display_name.clone())
                .filter(|n| !n.is_empty())
        });

        Ok(match (name, address) {
            (None, None) => None,
            (name, address) => Some(EmailAddress::new(
                name.unwrap_or_default(),
                address.unwrap_or_default(),
            )),
        })
    }

    fn html(&mut self, message: &Storage) -> Result<Option<String>> {
        if let Some(bytes) = self.binary(message, id::HTML)? {
            let cpid = message.props.long(id::INTERNET_CPID).or(self.codepage);
            let text = match (cpid, std::str::from_utf8(&bytes)) {
                (None, Ok(utf8)) => utf8.trim_end_matches('\0').to_string(),
                _ => self.codepages.decode(&bytes, cpid),
            };
            return Ok(Some(text).filter(|t| !t.is_empty()));
        }
        self.string(message, id::HTML)
    }

    fn recipients(&mut self) -> Result<Vec<Recipient>> {
        let mut recipients = Vec::new();
        for path in self.child_storages(RECIPIENT_PREFIX)? {
            let storage = self.storage(path, OBJECT_HEADER_LEN)?;
            let role = storage
                .props
                .long(id::RECIPIENT_TYPE)
                .map(RecipientRole::from_mapi)
                .unwrap_or(RecipientRole::Unknown(0));
            let name = self.string(&storage, id::DISPLAY_NAME)?.unwrap_or_default();
            let address = match self.string(&storage, id::SMTP_ADDRESS)? {
                Some(smtp) => smtp,
                None => self.string(&storage, id::EMAIL_ADDRESS)?.unwrap_or_default(),
            };
            recipients.push(Recipient {
                address: EmailAddress::new(name, address),
                role,
            });
        }
        Ok(recipients)
    }

    fn attachments(&mut self) -> Result<Vec<Attachment>> {
        let mut attachments = Vec::new();
        for (index, path) in self.child_storages(ATTACHMENT_PREFIX)?.into_iter().enumerate() {
            let storage = self.storage(path, OBJECT_HEADER_LEN)?;
            let method = storage.props.long(id::ATTACH_METHOD);
            if matches!(method, Some(ATTACH_EMBEDDED_MSG | ATTACH_OLE))
                || storage.props.kind_of(id::ATTACH_DATA) == Some(kind::OBJECT)
            {
                debug!(path = %storage.path.display(), method = ?method, "Skipping non-file attachment");
                continue;
            }

            let Some(data) = self.binary(&storage, id::ATTACH_DATA)? else {
                debug!(path = %storage.path.display(), "Skipping attachment without data");
                continue;
            };

            let mut filename = None;
            for prop in [id::ATTACH_LONG_FILENAME, id::ATTACH_FILENAME, id::DISPLAY_NAME] {
                if let Some(name) = self.string(&storage, prop)? {
                    filename = Some(name);
                    break;
                }
            }
            let filename = filename.unwrap_or_else(|| format!("attachment_{index}"));

            attachments.push(Attachment { filename, data });
        }
        Ok(attachments)
    }

    /// Child storages of the root whose names start with `prefix`, in index order.
    fn child_storages(&self, prefix: &str) -> Result<Vec<PathBuf>> {
        let entries = self
            .comp
            .read_storage(root())
            .map_err(|e| ConvertError::io(&self.source, e))?;
        let mut paths: Vec<(String, PathBuf)> = entries
            .filter(|e| e.is_storage() && e.name().starts_with(prefix))
            .map(|e| (e.name().to_ascii_uppercase(), e.path().to_path_buf()))
            .collect();
        paths.sort();
        Ok(paths.into_iter().map(|(_, p)| p).collect())
    }

    /// Load the property set of a storage. Only the root stream is mandatory.
    fn storage(&mut self, path: PathBuf, header_len: usize) -> Result<Storage> {
        let stream_name = format!("{}", path.join(PROPERTIES_STREAM).display());
        let props = match self.read_stream(&path, PROPERTIES_STREAM)? {
            Some(data) => PropertySet::parse(&data, header_len, &stream_name)?,
            None if header_len == MESSAGE_HEADER_LEN => {
                return Err(ConvertError::invalid_msg(
                    &self.source,
                    "missing __properties_version1.0 stream",
                ));
            }
            None => {
                debug!(stream = %stream_name, "Storage without property stream");
                PropertySet::default()
            }
        };
        Ok(Storage { path, props })
    }

    /// A string property (`PT_UNICODE` preferred, else `PT_STRING8`).
    ///
    /// Empty strings are reported as absent.
    fn string(&mut self, storage: &Storage, prop_id: u16) -> Result<Option<String>> {
        let unicode = value_stream_name(prop_id, kind::UNICODE);
        let value = match self.read_stream(&storage.path, &unicode)? {
            Some(bytes) => Some(decode_utf16le(&bytes)),
            None => {
                let string8 = value_stream_name(prop_id, kind::STRING8);
                self.read_stream(&storage.path, &string8)?
                    .map(|bytes| self.codepages.decode(&bytes, self.codepage))
            }
        };
        Ok(value.filter(|v| !v.is_empty()))
    }

    /// A `PT_BINARY` property.
    fn binary(&mut self, storage: &Storage, prop_id: u16) -> Result<Option<Vec<u8>>> {
        self.read_stream(&storage.path, &value_stream_name(prop_id, kind::BINARY))
    }

    fn read_stream(&mut self, storage: &Path, name: &str) -> Result<Option<Vec<u8>>> {
        let path = storage.join(name);
        if !self.comp.is_stream(&path) {
            return Ok(None);
        }
        let mut stream = self
            .comp
            .open_stream(&path)
            .map_err(|e| ConvertError::io(&self.source, e))?;
        let mut buf = Vec::new();
        stream
            .read_to_end(&mut buf)
            .map_err(|e| ConvertError::InvalidProperty {
                stream: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Some(buf))
    }
}

/// Open, read and close a `.msg` file.
pub fn read_msg(path: impl AsRef<Path>, codepages: &CodepageTable) -> Result<MailItem> {
    let mut reader = MsgReader::open(path, codepages)?;
    reader.read_item()
}

fn root() -> PathBuf {
    PathBuf::from("/")
}

fn to_local(utc: DateTime<Utc>) -> DateTime<FixedOffset> {
    utc.with_timezone(&Local).fixed_offset()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    fn utf16(s: &str) -> Vec<u8> {
        s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
    }

    fn props(header_len: usize, longs: &[(u16, u32)]) -> Vec<u8> {
        let mut out = vec![0u8; header_len];
        for (prop_id, value) in longs {
            let tag = (u32::from(*prop_id) << 16) | u32::from(kind::LONG);
            out.extend_from_slice(&tag.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes());
            out.extend_from_slice(&value.to_le_bytes());
            out.extend_from_slice(&[0u8; 4]);
        }
        out
    }

    fn write(comp: &mut CompoundFile<Cursor<Vec<u8>>>, path: &str, data: &[u8]) {
        let mut stream = comp.create_stream(path).unwrap();
        stream.write_all(data).unwrap();
        stream.flush().unwrap();
    }

    fn sample() -> Cursor<Vec<u8>> {
        let mut comp = CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        write(
            &mut comp,
            "/__properties_version1.0",
            &props(MESSAGE_HEADER_LEN, &[(id::MESSAGE_CODEPAGE, 1252)]),
        );
        write(&mut comp, "/__substg1.0_0037001F", &utf16("Quarterly report"));
        write(&mut comp, "/__substg1.0_0C1A001E", b"Jos\xe9");
        write(&mut comp, "/__substg1.0_5D01001F", &utf16("jose@example.com"));

        comp.create_storage("/__recip_version1.0_#00000001").unwrap();
        write(
            &mut comp,
            "/__recip_version1.0_#00000001/__properties_version1.0",
            &props(OBJECT_HEADER_LEN, &[(id::RECIPIENT_TYPE, 2)]),
        );
        write(
            &mut comp,
            "/__recip_version1.0_#00000001/__substg1.0_39FE001F",
            &utf16("cc@example.com"),
        );
        comp.create_storage("/__recip_version1.0_#00000000").unwrap();
        write(
            &mut comp,
            "/__recip_version1.0_#00000000/__properties_version1.0",
            &props(OBJECT_HEADER_LEN, &[(id::RECIPIENT_TYPE, 1)]),
        );
        write(
            &mut comp,
            "/__recip_version1.0_#00000000/__substg1.0_3003001F",
            &utf16("to@example.com"),
        );

        comp.create_storage("/__attach_version1.0_#00000000").unwrap();
        write(
            &mut comp,
            "/__attach_version1.0_#00000000/__properties_version1.0",
            &props(OBJECT_HEADER_LEN, &[(id::ATTACH_METHOD, 1)]),
        );
        write(
            &mut comp,
            "/__attach_version1.0_#00000000/__substg1.0_3707001F",
            &utf16("notes.txt"),
        );
        write(
            &mut comp,
            "/__attach_version1.0_#00000000/__substg1.0_37010102",
            b"hello",
        );

        comp.flush().unwrap();
        let mut cursor = comp.into_inner();
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_read_item_fields() {
        let table = CodepageTable::default();
        let mut reader = MsgReader::from_reader(sample(), "sample.msg", &table).unwrap();
        let item = reader.read_item().unwrap();

        assert_eq!(item.subject.as_deref(), Some("Quarterly report"));
        let sender = item.sender.unwrap();
        assert_eq!(sender.display_name, "José");
        assert_eq!(sender.address, "jose@example.com");
        assert!(item.sent_on.is_none());
        assert!(item.body_text.is_none());
    }

    #[test]
    fn test_recipients_in_storage_order() {
        let table = CodepageTable::default();
        let mut reader = MsgReader::from_reader(sample(), "sample.msg", &table).unwrap();
        let item = reader.read_item().unwrap();

        assert_eq!(item.recipients.len(), 2);
        assert_eq!(item.recipients[0].role, RecipientRole::To);
        assert_eq!(item.recipients[0].address.address, "to@example.com");
        assert_eq!(item.recipients[1].role, RecipientRole::Cc);
        assert_eq!(item.recipients[1].address.address, "cc@example.com");
    }

    #[test]
    fn test_attachment_payload() {
        let table = CodepageTable::default();
        let mut reader = MsgReader::from_reader(sample(), "sample.msg", &table).unwrap();
        let item = reader.read_item().unwrap();

        assert_eq!(item.attachments.len(), 1);
        assert_eq!(item.attachments[0].filename, "notes.txt");
        assert_eq!(item.attachments[0].data, b"hello");
    }

    #[test]
    fn test_not_a_compound_file() {
        let table = CodepageTable::default();
        let result = MsgReader::from_reader(Cursor::new(b"plain text".to_vec()), "x.msg", &table);
        match result {
            Err(ConvertError::InvalidMsg { reason, .. }) => {
                assert!(reason.contains("compound file"));
            }
            other => panic!("expected InvalidMsg, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_missing_property_stream() {
        let mut comp = CompoundFile::create(Cursor::new(Vec::new())).unwrap();
        comp.flush().unwrap();
        let mut cursor = comp.into_inner();
        cursor.set_position(0);

        let table = CodepageTable::default();
        let result = MsgReader::from_reader(cursor, "empty.msg", &table);
        assert!(matches!(result, Err(ConvertError::InvalidMsg { .. })));
    }

    #[test]
    fn test_open_missing_file() {
        let table = CodepageTable::default();
        let result = MsgReader::open("/definitely/not/here.msg", &table);
        assert!(matches!(result, Err(ConvertError::FileNotFound(_))));
    }
}
