//! Internationalization (i18n) module.
//!
//! Provides localized strings for the CLI output.
//! English is the default language; Spanish is available as an alternative.

use std::sync::OnceLock;

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// English (default)
    En,
    /// Spanish
    Es,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "es", "en_US", "es_ES").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-', '.']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from `MSG2EML_LANG`, `LC_MESSAGES` or `LANG`.
pub fn detect_system_lang() -> Lang {
    ["MSG2EML_LANG", "LC_MESSAGES", "LANG"]
        .iter()
        .find_map(|var| std::env::var(var).ok().and_then(|v| Lang::from_code(&v)))
        .unwrap_or(Lang::En)
}

/// Macro for defining translatable message functions.
/// Each function returns a `&'static str` based on the current language.
macro_rules! msg {
    ($name:ident, $en:expr, $es:expr) => {
        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            match lang() {
                Lang::En => $en,
                Lang::Es => $es,
            }
        }
    };
}

// ── General ──────────────────────────────────────────────────────

msg!(
    app_about,
    "msg2eml \u{2014} Convert Outlook .msg files to standard .eml (MIME) files.",
    "msg2eml \u{2014} Convierte ficheros .msg de Outlook en ficheros .eml (MIME) est\u{e1}ndar."
);
msg!(
    app_after_help,
    "Run without arguments to convert every .msg file next to the program into a 'converted' folder.",
    "Sin argumentos convierte todos los ficheros .msg junto al programa en la carpeta 'converted'."
);

// ── CLI help strings ─────────────────────────────────────────────

msg!(
    help_paths,
    "<input.msg> <output.eml> or <input_dir> <output_dir>",
    "<entrada.msg> <salida.eml> o <dir_entrada> <dir_salida>"
);
msg!(
    help_verbose,
    "Verbose logging (-v info, -vv debug, -vvv trace)",
    "Registro detallado (-v info, -vv debug, -vvv trace)"
);
msg!(
    help_lang,
    "Language (en, es). Defaults to system locale",
    "Idioma (en, es). Por defecto usa el idioma del sistema"
);

// ── Usage ───────────────────────────────────────────────────────

msg!(cli_usage, "Usage:", "Uso:");
msg!(
    cli_usage_program_dir,
    "Convert all .msg files from the program directory to the 'converted' subfolder",
    "Convertir todos los ficheros .msg del directorio del programa a la subcarpeta 'converted'"
);
msg!(cli_usage_single, "Convert single file", "Convertir un fichero");
msg!(cli_usage_directory, "Convert directory", "Convertir un directorio");

// ── Run messages ────────────────────────────────────────────────

msg!(cli_converting_all, "Converting all", "Convirtiendo todos los ficheros");
msg!(cli_files_from, "files from", "de");
msg!(cli_output_directory, "Output directory", "Directorio de salida");
msg!(err_error, "Error", "Error");
msg!(err_input_path, "Input path", "La ruta de entrada");
msg!(err_does_not_exist, "does not exist.", "no existe.");
msg!(
    err_during_conversion,
    "Error during conversion",
    "Error durante la conversi\u{f3}n"
);
msg!(
    cli_completed_ok,
    "Conversion completed successfully.",
    "Conversi\u{f3}n completada correctamente."
);
msg!(cli_no, "No", "No se encontraron ficheros");
msg!(cli_files_found_to_convert, "files found to convert.", "para convertir.");
msg!(cli_found, "Found", "Encontrados");
msg!(cli_file, "file", "fichero");
msg!(cli_files, "files", "ficheros");
msg!(cli_to_convert, "to convert.", "para convertir.");

// ── Per-file lines and summary ──────────────────────────────────

msg!(cli_converting, "Converting", "Convirtiendo");
msg!(cli_done, "Done", "Hecho");
msg!(cli_failed, "Failed", "Fallidos");
msg!(cli_failed_one, "Failed", "Fallido");
msg!(cli_progress, "Progress", "Progreso");
msg!(cli_completed_in, "Conversion completed in", "Conversi\u{f3}n completada en");
msg!(cli_seconds, "seconds", "segundos");
msg!(cli_success, "Success", "Correctos");
msg!(cli_written, "Written", "Escrito");
