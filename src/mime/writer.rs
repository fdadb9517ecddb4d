//! Serialize a [`MimeMessage`] to RFC 5322 bytes.
//!
//! Output is deterministic: multipart boundaries are derived from a SHA-256
//! of the rendered children, so converting the same item twice yields the
//! same bytes.

use sha2::{Digest, Sha256};

use super::encode::{
    address_list_header, base64_lines, normalize_newlines, parameter, unstructured_header, CRLF,
};
use super::message::{MimeMessage, Part};

/// Longest line allowed in a 7bit body (RFC 5322 §2.1.1).
const MAX_7BIT_LINE: usize = 998;

/// Hex characters of the digest used in a boundary.
const BOUNDARY_HEX_LEN: usize = 32;

/// Render the complete message.
pub fn to_bytes(msg: &MimeMessage) -> Vec<u8> {
    let mut out = String::new();

    if let Some(from) = &msg.from {
        push_line(&mut out, &address_list_header("From", std::slice::from_ref(from)));
    }
    push_line(&mut out, &format!("Date: {}", msg.date.to_rfc2822()));
    push_line(&mut out, &unstructured_header("Subject", &msg.subject));
    if let Some(id) = &msg.message_id {
        push_line(&mut out, &format!("Message-ID: {}", angle_id(id)));
    }
    if let Some(id) = &msg.in_reply_to {
        push_line(&mut out, &format!("In-Reply-To: {}", angle_id(id)));
    }
    for (name, list) in [("To", &msg.to), ("Cc", &msg.cc), ("Bcc", &msg.bcc)] {
        if !list.is_empty() {
            push_line(&mut out, &address_list_header(name, list));
        }
    }
    push_line(&mut out, "MIME-Version: 1.0");

    out.push_str(&render_part(&msg.body));
    if !out.ends_with(CRLF) {
        out.push_str(CRLF);
    }
    out.into_bytes()
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line);
    out.push_str(CRLF);
}

fn angle_id(id: &str) -> String {
    let id = id.trim();
    if id.starts_with('<') {
        id.to_string()
    } else {
        format!("<{id}>")
    }
}

/// Part headers, blank line and body.
fn render_part(part: &Part) -> String {
    match part {
        Part::Text { kind, content } => {
            let (encoding, body) = text_body(content);
            format!(
                "Content-Type: text/{}; charset=utf-8\r\n\
                 Content-Transfer-Encoding: {encoding}\r\n\r\n{body}",
                kind.subtype()
            )
        }
        Part::Attachment(att) => format!(
            "Content-Type: {};\r\n {}\r\n\
             Content-Disposition: attachment;\r\n {}\r\n\
             Content-Transfer-Encoding: base64\r\n\r\n{}",
            att.content_type,
            parameter("name", &att.filename),
            parameter("filename", &att.filename),
            base64_lines(&att.data)
        ),
        Part::Multipart { kind, parts } => {
            let rendered: Vec<String> = parts.iter().map(render_part).collect();
            let boundary = boundary_for(&rendered);

            let mut out = format!(
                "Content-Type: multipart/{};\r\n boundary=\"{boundary}\"\r\n\r\n",
                kind.subtype()
            );
            for child in &rendered {
                out.push_str("--");
                out.push_str(&boundary);
                out.push_str(CRLF);
                out.push_str(child);
                out.push_str(CRLF);
            }
            out.push_str("--");
            out.push_str(&boundary);
            out.push_str("--");
            out.push_str(CRLF);
            out
        }
    }
}

/// Pick a transfer encoding: 7bit for short-lined ASCII, Base64 otherwise.
fn text_body(content: &str) -> (&'static str, String) {
    let normalized = normalize_newlines(content);
    let plain = normalized
        .chars()
        .all(|c| c.is_ascii() && (!c.is_ascii_control() || matches!(c, '\t' | '\r' | '\n')))
        && normalized.split(CRLF).all(|line| line.len() <= MAX_7BIT_LINE);

    if plain {
        ("7bit", normalized)
    } else {
        ("base64", base64_lines(normalized.as_bytes()))
    }
}

fn boundary_for(children: &[String]) -> String {
    let mut hasher = Sha256::new();
    for child in children {
        hasher.update(child.as_bytes());
        hasher.update([0u8]);
    }
    let digest = hasher.finalize();
    let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
    format!("=_{}", &hex[..BOUNDARY_HEX_LEN])
}
