//! Header and body encodings: RFC 2047 encoded-words, RFC 2231 parameters,
//! header folding and Base64 line wrapping.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::model::address::EmailAddress;

pub const CRLF: &str = "\r\n";

/// Preferred maximum header line length (RFC 5322 §2.1.1).
const MAX_LINE: usize = 78;

/// Hard line limit (RFC 5322 §2.1.1).
const MAX_HARD_LINE: usize = 998;

/// Base64 body line length (RFC 2045 §6.8).
const BASE64_LINE: usize = 76;

/// UTF-8 bytes per encoded-word; keeps each word well under 75 characters.
const ENCODED_WORD_BYTES: usize = 39;

/// Characters that force a display name into a quoted string.
const SPECIALS: &[char] = &['(', ')', '<', '>', '[', ']', ':', ';', '@', '\\', ',', '.', '"'];

/// `true` if the value cannot be written as plain 7-bit header text.
pub fn needs_encoding(value: &str) -> bool {
    value
        .chars()
        .any(|c| !c.is_ascii() || (c.is_ascii_control() && c != '\t'))
}

/// Base64 with 76-character lines joined by CRLF (no trailing line break).
pub fn base64_lines(data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut out = String::with_capacity(encoded.len() + encoded.len() / BASE64_LINE * 2);
    for (i, chunk) in encoded.as_bytes().chunks(BASE64_LINE).enumerate() {
        if i > 0 {
            out.push_str(CRLF);
        }
        // Base64 output is ASCII, so every chunk is valid UTF-8.
        out.push_str(std::str::from_utf8(chunk).unwrap_or_default());
    }
    out
}

/// Split a value into `=?utf-8?B?...?=` words on character boundaries.
pub fn encoded_words(value: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut chunk = String::new();
    for c in value.chars() {
        if chunk.len() + c.len_utf8() > ENCODED_WORD_BYTES && !chunk.is_empty() {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(c);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }
    words
}

fn encoded_word(chunk: &str) -> String {
    format!("=?utf-8?B?{}?=", STANDARD.encode(chunk.as_bytes()))
}

/// An unstructured header (`Subject:`) folded to [`MAX_LINE`], without the
/// trailing CRLF. Line breaks inside the value become spaces.
pub fn unstructured_header(name: &str, value: &str) -> String {
    let value = value.replace(['\r', '\n'], " ");
    // A word that cannot fit on one line even after folding is split into
    // encoded-words instead.
    let unfoldable = value
        .split(' ')
        .any(|word| name.len() + 2 + word.len() > MAX_HARD_LINE);
    if unfoldable || needs_encoding(&value) {
        let words = encoded_words(&value);
        return format!("{name}: {}", words.join("\r\n "));
    }

    let mut out = format!("{name}:");
    let mut line_len = out.len();
    let mut first = true;
    for word in value.split(' ') {
        if !first && line_len + 1 + word.len() > MAX_LINE {
            out.push_str("\r\n ");
            line_len = 1;
        } else {
            out.push(' ');
            line_len += 1;
        }
        out.push_str(word);
        line_len += word.len();
        first = false;
    }
    out
}

/// A single mailbox: `addr`, `Name <addr>`, `"Quoted, Name" <addr>` or an
/// encoded-word display name.
pub fn mailbox(addr: &EmailAddress) -> String {
    let angle = format!("<{}>", addr.address);
    let name = addr.display_name.as_str();
    if name.is_empty() {
        return if addr.address.is_empty() {
            angle
        } else {
            addr.address.clone()
        };
    }

    let phrase = if needs_encoding(name) {
        encoded_words(name).join(" ")
    } else if name.contains(SPECIALS) {
        quoted_string(name)
    } else {
        name.to_string()
    };
    format!("{phrase} {angle}")
}

/// An address-list header (`From:`, `To:`, `Cc:`, `Bcc:`), folded between
/// mailboxes, without the trailing CRLF.
pub fn address_list_header(name: &str, addrs: &[EmailAddress]) -> String {
    let mut out = format!("{name}:");
    let mut line_len = out.len();
    for (i, addr) in addrs.iter().enumerate() {
        let item = mailbox(addr);
        if i > 0 {
            out.push(',');
            line_len += 1;
        }
        if i > 0 && line_len + 1 + item.len() > MAX_LINE {
            out.push_str("\r\n ");
            line_len = 1;
        } else {
            out.push(' ');
            line_len += 1;
        }
        line_len += item.len();
        out.push_str(&item);
    }
    out
}

/// A `key="value"` parameter, or `key*=utf-8''...` (RFC 2231) when the value
/// is not plain ASCII.
pub fn parameter(key: &str, value: &str) -> String {
    if needs_encoding(value) {
        format!("{key}*=utf-8''{}", percent_encode(value))
    } else {
        format!("{key}={}", quoted_string(value))
    }
}

fn quoted_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// RFC 2231 `attr-char` percent-encoding.
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for &b in value.as_bytes() {
        let keep = b.is_ascii_alphanumeric()
            || matches!(
                b,
                b'!' | b'#' | b'$' | b'&' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
            );
        if keep {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

/// Convert any mix of `\n`, `\r\n` and lone `\r` line breaks to CRLF.
pub fn normalize_newlines(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");
    unified.replace('\n', CRLF)
}
