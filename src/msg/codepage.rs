//! Windows codepage → `encoding_rs` table.
//!
//! Outlook stores 8-bit strings (`PT_STRING8`) and binary HTML bodies in the
//! codepage named by `PR_MESSAGE_CODEPAGE` / `PR_INTERNET_CPID`. The table is
//! built once at startup and handed to every reader, so no process-wide
//! encoding registration is needed.

use std::collections::HashMap;

use encoding_rs::Encoding;

/// Codepage used when an item does not declare one.
pub const DEFAULT_CODEPAGE: u32 = 1252;

/// Maps Windows codepage identifiers to decoders.
#[derive(Debug, Clone)]
pub struct CodepageTable {
    entries: HashMap<u32, &'static Encoding>,
    fallback: &'static Encoding,
}

impl CodepageTable {
    /// The codepages Outlook writes in practice, falling back to `fallback_codepage`
    /// (or windows-1252 if that one is unknown too).
    pub fn windows(fallback_codepage: u32) -> Self {
        use encoding_rs::*;

        let pairs: &[(u32, &'static Encoding)] = &[
            (437, WINDOWS_1252),
            (850, WINDOWS_1252),
            (866, IBM866),
            (874, WINDOWS_874),
            (932, SHIFT_JIS),
            (936, GBK),
            (949, EUC_KR),
            (950, BIG5),
            (1200, UTF_16LE),
            (1201, UTF_16BE),
            (1250, WINDOWS_1250),
            (1251, WINDOWS_1251),
            (1252, WINDOWS_1252),
            (1253, WINDOWS_1253),
            (1254, WINDOWS_1254),
            (1255, WINDOWS_1255),
            (1256, WINDOWS_1256),
            (1257, WINDOWS_1257),
            (1258, WINDOWS_1258),
            (10000, MACINTOSH),
            (20127, WINDOWS_1252),
            (20866, KOI8_R),
            (21866, KOI8_U),
            (28591, WINDOWS_1252),
            (28592, ISO_8859_2),
            (28593, ISO_8859_3),
            (28594, ISO_8859_4),
            (28595, ISO_8859_5),
            (28596, ISO_8859_6),
            (28597, ISO_8859_7),
            (28598, ISO_8859_8),
            (28599, WINDOWS_1254),
            (28603, ISO_8859_13),
            (28605, ISO_8859_15),
            (50220, ISO_2022_JP),
            (50221, ISO_2022_JP),
            (50222, ISO_2022_JP),
            (51932, EUC_JP),
            (51949, EUC_KR),
            (54936, GB18030),
            (65001, UTF_8),
        ];

        let entries: HashMap<u32, &'static Encoding> = pairs.iter().copied().collect();
        let fallback = entries
            .get(&fallback_codepage)
            .copied()
            .unwrap_or(WINDOWS_1252);

        Self { entries, fallback }
    }

    /// Look up a codepage. Unknown or absent codepages resolve to the fallback.
    pub fn encoding(&self, codepage: Option<u32>) -> &'static Encoding {
        codepage
            .and_then(|cp| self.entries.get(&cp).copied())
            .unwrap_or(self.fallback)
    }

    /// Decode bytes in the given codepage, dropping trailing NUL terminators.
    pub fn decode(&self, bytes: &[u8], codepage: Option<u32>) -> String {
        let (text, _, had_errors) = self.encoding(codepage).decode(bytes);
        if had_errors {
            tracing::debug!(codepage = ?codepage, "Replacement characters while decoding");
        }
        text.trim_end_matches('\0').to_string()
    }
}

impl Default for CodepageTable {
    fn default() -> Self {
        Self::windows(DEFAULT_CODEPAGE)
    }
}

/// Decode a `PT_UNICODE` value (UTF-16LE, optionally NUL-terminated).
pub fn decode_utf16le(bytes: &[u8]) -> String {
    let (text, _) = encoding_rs::UTF_16LE.decode_without_bom_handling(bytes);
    text.trim_end_matches('\0').to_string()
}
