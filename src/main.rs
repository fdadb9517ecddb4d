//! CLI entry point for `msg2eml`.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use indicatif::{ProgressBar, ProgressState, ProgressStyle};

use msg2eml::batch::{self, BatchPlan, Invocation, ItemReport, RunSummary, Target};
use msg2eml::config::Config;
use msg2eml::convert::{ConversionOutcome, Converter};
use msg2eml::i18n;
use msg2eml::msg::CodepageTable;

#[derive(Parser)]
#[command(name = "msg2eml", version)]
struct Cli {
    /// <input.msg> <output.eml> or <input_dir> <output_dir>
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Language (en, es). Defaults to system locale.
    #[arg(long, value_name = "LANG")]
    lang: Option<String>,
}

/// Detect language early from --lang arg or system env, before clap processes --help.
fn detect_lang_early() -> i18n::Lang {
    let args: Vec<String> = std::env::args().collect();
    for (i, arg) in args.iter().enumerate() {
        if arg == "--lang" {
            if let Some(lang) = args.get(i + 1).and_then(|c| i18n::Lang::from_code(c)) {
                return lang;
            }
        }
        if let Some(lang) = arg.strip_prefix("--lang=").and_then(i18n::Lang::from_code) {
            return lang;
        }
    }
    i18n::detect_system_lang()
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    Cli::command()
        .about(i18n::app_about())
        .after_help(i18n::app_after_help())
        .mut_arg("paths", |a| a.help(i18n::help_paths()))
        .mut_arg("verbose", |a| a.help(i18n::help_verbose()))
        .mut_arg("lang", |a| a.help(i18n::help_lang()))
}

fn main() -> anyhow::Result<()> {
    // Detect language BEFORE clap parsing so --help is localized
    i18n::set_lang(detect_lang_early());

    // Help and version print as usual; any other unparseable shape is a
    // usage error, which still exits 0.
    let matches = match build_localized_command().try_get_matches() {
        Ok(matches) => matches,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(_) => {
            print_usage();
            return Ok(());
        }
    };
    let cli = Cli::from_arg_matches(&matches)?;

    let config = msg2eml::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let converter = Converter::new(CodepageTable::windows(config.convert.default_codepage));

    // Every failure ends here; the process still exits 0.
    if let Err(e) = run(&cli.paths, &config, &converter) {
        tracing::debug!(error = ?e, "Run aborted");
        println!("{}: {e:#}", i18n::err_during_conversion());
    }
    Ok(())
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = msg2eml::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "msg2eml.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Directory holding the running executable.
fn program_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn run(args: &[PathBuf], config: &Config, converter: &Converter) -> anyhow::Result<()> {
    let (input, output, implicit) =
        match batch::resolve(args, &program_dir(), &config.convert.output_dir_name) {
            Invocation::Usage => {
                print_usage();
                return Ok(());
            }
            Invocation::Convert {
                input,
                output,
                implicit,
            } => (input, output, implicit),
        };

    if implicit {
        println!(
            "{} .{} {}: {}",
            i18n::cli_converting_all(),
            config.convert.source_extension,
            i18n::cli_files_from(),
            input.display()
        );
        println!("{}: {}", i18n::cli_output_directory(), output.display());
    }

    match Target::classify(&input) {
        Target::File => cmd_convert_file(&input, &output, converter)?,
        Target::Directory => cmd_convert_directory(&input, &output, config, converter)?,
        Target::Missing => {
            println!(
                "{}: {} '{}' {}",
                i18n::err_error(),
                i18n::err_input_path(),
                input.display(),
                i18n::err_does_not_exist()
            );
            return Ok(());
        }
    }

    println!("{}", i18n::cli_completed_ok());
    Ok(())
}

fn print_usage() {
    println!("{}", i18n::cli_usage());
    println!(
        "  msg2eml                             - {}",
        i18n::cli_usage_program_dir()
    );
    println!(
        "  msg2eml <input.msg> <output.eml>    - {}",
        i18n::cli_usage_single()
    );
    println!(
        "  msg2eml <input_dir> <output_dir>    - {}",
        i18n::cli_usage_directory()
    );
}

/// Convert one file; a failure propagates to the top-level handler.
fn cmd_convert_file(input: &Path, output: &Path, converter: &Converter) -> anyhow::Result<()> {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    print!("[1/1] {}: {name}... ", i18n::cli_converting());
    std::io::stdout().flush()?;

    let start = Instant::now();
    converter.convert(input, output)?;
    println!("\u{2713} {} ({}ms)", i18n::cli_done(), start.elapsed().as_millis());
    Ok(())
}

fn cmd_convert_directory(
    input: &Path,
    output: &Path,
    config: &Config,
    converter: &Converter,
) -> anyhow::Result<()> {
    let ext = &config.convert.source_extension;
    let plan = BatchPlan::discover(input, output, ext, &config.convert.target_extension)?;

    if plan.is_empty() {
        println!("{} .{ext} {}", i18n::cli_no(), i18n::cli_files_found_to_convert());
        return Ok(());
    }

    let total = plan.len();
    let noun = if total == 1 {
        i18n::cli_file()
    } else {
        i18n::cli_files()
    };
    println!("{} {total} .{ext} {noun} {}", i18n::cli_found(), i18n::cli_to_convert());
    println!();

    let pb = (total > 1).then(|| progress_bar(total as u64, config.progress.bar_width));

    let summary = plan.run(converter, |report| {
        let line = item_line(report);
        match &pb {
            Some(pb) => {
                pb.suspend(|| println!("{line}"));
                pb.inc(1);
            }
            None => println!("{line}"),
        }
    })?;

    if let Some(pb) = pb {
        pb.finish();
    }
    println!();
    print_summary(&summary);
    Ok(())
}

fn progress_bar(total: u64, width: u16) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{}: [{{bar:{width}}}] {{pct}}% ({{pos}}/{{len}})",
                i18n::cli_progress()
            ))
            .expect("valid template")
            .with_key(
                "pct",
                |state: &ProgressState, w: &mut dyn std::fmt::Write| {
                    let _ = write!(w, "{:.1}", state.fraction() * 100.0);
                },
            )
            .progress_chars("\u{2588}\u{2591}"),
    );
    pb
}

fn item_line(report: &ItemReport<'_>) -> String {
    let prefix = format!(
        "[{}/{}] {}: {}...",
        report.index,
        report.total,
        i18n::cli_converting(),
        report.file_name()
    );
    match report.outcome {
        ConversionOutcome::Converted { elapsed, .. } => format!(
            "{prefix} \u{2713} {} ({}ms)",
            i18n::cli_done(),
            elapsed.as_millis()
        ),
        ConversionOutcome::Failed { reason } => {
            format!("{prefix} \u{2717} {} ({reason})", i18n::cli_failed_one())
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{} {:.1} {}",
        i18n::cli_completed_in(),
        summary.elapsed.as_secs_f64(),
        i18n::cli_seconds()
    );
    println!(
        "\u{2713} {}: {} {}",
        i18n::cli_success(),
        summary.success_count,
        i18n::cli_files()
    );
    if summary.failure_count > 0 {
        println!(
            "\u{2717} {}: {} {}",
            i18n::cli_failed(),
            summary.failure_count,
            i18n::cli_files()
        );
    }
    println!(
        "{}: {}",
        i18n::cli_written(),
        humansize::format_size(summary.bytes_written, humansize::BINARY)
    );
}
