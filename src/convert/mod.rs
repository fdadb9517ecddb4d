//! Per-file conversion: read the `.msg`, map it, write the `.eml`.

pub mod mapper;
pub mod output;

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::{DateTime, FixedOffset, Local};

use crate::error::Result;
use crate::msg::{read_msg, CodepageTable};

pub use mapper::map_message;
pub use output::write_eml;

/// Result of converting a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// The `.eml` was written.
    Converted { elapsed: Duration, bytes: u64 },
    /// The item could not be read or written. Nothing was left at the
    /// destination.
    Failed { reason: String },
}

impl ConversionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Converted { .. })
    }
}

/// Converts `.msg` files using a shared codepage table.
#[derive(Debug, Default)]
pub struct Converter {
    codepages: CodepageTable,
}

impl Converter {
    pub fn new(codepages: CodepageTable) -> Self {
        Self { codepages }
    }

    /// Convert `source` into `destination`, returning the bytes written.
    ///
    /// Items without a sent date are stamped with the local time at which
    /// the conversion started.
    pub fn convert(&self, source: &Path, destination: &Path) -> Result<u64> {
        self.convert_at(source, destination, Local::now().fixed_offset())
    }

    /// Same as [`convert`](Self::convert) with an explicit fallback date.
    pub fn convert_at(
        &self,
        source: &Path,
        destination: &Path,
        fallback_date: DateTime<FixedOffset>,
    ) -> Result<u64> {
        // The compound file is closed when `read_msg` returns.
        let item = read_msg(source, &self.codepages)?;
        tracing::debug!(
            path = %source.display(),
            recipients = item.recipients.len(),
            attachments = item.attachments.len(),
            "Read message"
        );
        let msg = map_message(item, fallback_date);
        write_eml(&msg, destination)
    }

    /// Convert one file and capture the result as a [`ConversionOutcome`].
    pub fn convert_file(&self, source: &Path, destination: &Path) -> ConversionOutcome {
        let start = Instant::now();
        match self.convert(source, destination) {
            Ok(bytes) => ConversionOutcome::Converted {
                elapsed: start.elapsed(),
                bytes,
            },
            Err(e) => {
                tracing::info!(path = %source.display(), error = %e, "Conversion failed");
                ConversionOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out").join("x.eml");
        let outcome = Converter::default().convert_file(&dir.path().join("nope.msg"), &dest);
        assert!(!outcome.is_success());
        assert!(!dest.exists());
    }

    #[test]
    fn test_garbage_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bad.msg");
        std::fs::write(&src, b"this is not a compound file").unwrap();
        let dest = dir.path().join("bad.eml");
        match Converter::default().convert_file(&src, &dest) {
            ConversionOutcome::Failed { reason } => assert!(reason.contains("bad.msg")),
            other => panic!("expected failure, got {other:?}"),
        }
        assert!(!dest.exists());
    }
}
