//! Batch driver.
//!
//! Turns the positional arguments into an [`Invocation`], classifies the
//! input path and, in directory mode, converts every discovered file
//! sequentially in discovery order. Rendering is left to the caller, which
//! receives one [`ItemReport`] per file.

pub mod discover;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::Context;

use crate::convert::{ConversionOutcome, Converter};

pub use discover::{destination_for, find_files, has_extension};

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Wrong number of arguments: print usage and stop.
    Usage,
    /// Convert `input` (file or directory) into `output`.
    ///
    /// `implicit` is set when the paths were derived from the program
    /// directory rather than given on the command line.
    Convert {
        input: PathBuf,
        output: PathBuf,
        implicit: bool,
    },
}

/// Resolve positional arguments.
///
/// No arguments converts `program_dir` into `program_dir/<output_dir_name>`;
/// two arguments are input and output; anything else is [`Invocation::Usage`].
pub fn resolve(args: &[PathBuf], program_dir: &Path, output_dir_name: &str) -> Invocation {
    match args {
        [] => Invocation::Convert {
            input: program_dir.to_path_buf(),
            output: program_dir.join(output_dir_name),
            implicit: true,
        },
        [input, output] => Invocation::Convert {
            input: input.clone(),
            output: output.clone(),
            implicit: false,
        },
        _ => Invocation::Usage,
    }
}

/// Kind of the input path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    File,
    Directory,
    Missing,
}

impl Target {
    pub fn classify(path: &Path) -> Self {
        if path.is_file() {
            Self::File
        } else if path.is_dir() {
            Self::Directory
        } else {
            Self::Missing
        }
    }
}

/// One source file and where its conversion goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Progress notification emitted after each file.
#[derive(Debug)]
pub struct ItemReport<'a> {
    /// 1-based position in discovery order.
    pub index: usize,
    pub total: usize,
    pub job: &'a Job,
    pub outcome: &'a ConversionOutcome,
}

impl ItemReport<'_> {
    /// File name of the source, for display.
    pub fn file_name(&self) -> String {
        self.job
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.job.source.display().to_string())
    }
}

/// Aggregate result of a directory run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub success_count: usize,
    pub failure_count: usize,
    pub elapsed: Duration,
    pub bytes_written: u64,
}

impl RunSummary {
    fn record(&mut self, outcome: &ConversionOutcome) {
        match outcome {
            ConversionOutcome::Converted { bytes, .. } => {
                self.success_count += 1;
                self.bytes_written += bytes;
            }
            ConversionOutcome::Failed { .. } => self.failure_count += 1,
        }
    }
}

/// The files a directory run will convert, in order.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    output_root: PathBuf,
    jobs: Vec<Job>,
}

impl BatchPlan {
    /// Enumerate `input_root` for files with `source_ext`; nothing is written.
    pub fn discover(
        input_root: &Path,
        output_root: &Path,
        source_ext: &str,
        target_ext: &str,
    ) -> anyhow::Result<Self> {
        let jobs = find_files(input_root, source_ext)?
            .into_iter()
            .map(|source| Job {
                destination: destination_for(input_root, &source, output_root, target_ext),
                source,
            })
            .collect::<Vec<_>>();

        tracing::info!(
            root = %input_root.display(),
            count = jobs.len(),
            "Discovered files"
        );

        Ok(Self {
            output_root: output_root.to_path_buf(),
            jobs,
        })
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Create the output root and convert every job in order.
    ///
    /// A failed file is recorded and the run continues; only failing to
    /// create the output root aborts.
    pub fn run(
        &self,
        converter: &Converter,
        mut on_item: impl FnMut(&ItemReport<'_>),
    ) -> anyhow::Result<RunSummary> {
        std::fs::create_dir_all(&self.output_root).with_context(|| {
            format!(
                "Cannot create output directory '{}'",
                self.output_root.display()
            )
        })?;

        let start = Instant::now();
        let total = self.jobs.len();
        let mut summary = RunSummary::default();

        for (i, job) in self.jobs.iter().enumerate() {
            let outcome = converter.convert_file(&job.source, &job.destination);
            summary.record(&outcome);
            on_item(&ItemReport {
                index: i + 1,
                total,
                job,
                outcome: &outcome,
            });
        }

        summary.elapsed = start.elapsed();
        tracing::info!(
            success = summary.success_count,
            failed = summary.failure_count,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Batch finished"
        );
        Ok(summary)
    }
}
