//! CLI harness: converts files through the handler registry and prints each
//! normalized unit as a JSON object.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use docunits::{
    default_registry, ConverterRegistry, HandlerSettings, KeyColumns, SheetSelection, SourceBlob,
};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Convert documents into normalized text units.
#[derive(Parser, Debug)]
#[command(name = "docunits")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file(s): .csv, .xlsx, .ppt, .pptx, .doc, .docx, .eml, .msg
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// MIME type for every input (default: guessed from the extension)
    #[arg(short, long)]
    mime: Option<String>,

    /// Output directory; writes <name>.json per input instead of printing
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Handler settings JSON file; flags below override it
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Register the email converter
    #[arg(long)]
    email: bool,

    /// Do not register the Word converter
    #[arg(long)]
    no_word: bool,

    /// Workbook sheets to convert
    #[arg(long, value_enum)]
    sheets: Option<SheetsArg>,

    /// Legacy row-keying mode for tabular input
    #[arg(long, value_enum)]
    keys: Option<KeysArg>,

    /// Indent the JSON output
    #[arg(long)]
    pretty: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SheetsArg {
    All,
    Last,
}

impl From<SheetsArg> for SheetSelection {
    fn from(arg: SheetsArg) -> Self {
        match arg {
            SheetsArg::All => SheetSelection::All,
            SheetsArg::Last => SheetSelection::Last,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KeysArg {
    #[value(name = "none")]
    Off,
    First,
    All,
}

impl From<KeysArg> for KeyColumns {
    fn from(arg: KeysArg) -> Self {
        match arg {
            KeysArg::Off => KeyColumns::None,
            KeysArg::First => KeyColumns::First,
            KeysArg::All => KeyColumns::All,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let settings = build_settings(&args)?;
    let registry = default_registry(&settings);

    let mut failed = 0;
    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &registry) {
            Ok(output) => match &args.output {
                Some(dir) => {
                    let output_path = get_output_path(input_path, dir)?;
                    write_output(&output_path, &output)?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
                None => print!("{}", output),
            },
            Err(e) => {
                failed += 1;
                eprintln!("Error processing {}: {:#}", input_path.display(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} inputs failed", failed, args.input.len());
    }
    Ok(())
}

/// Settings file first, then command-line overrides.
fn build_settings(args: &Args) -> Result<HandlerSettings> {
    let mut settings = match &args.settings {
        Some(path) => HandlerSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => HandlerSettings::default(),
    };

    if args.email {
        settings.enable_email = true;
    }
    if args.no_word {
        settings.enable_word = false;
    }
    if let Some(sheets) = args.sheets {
        settings.sheets = sheets.into();
    }
    if let Some(keys) = args.keys {
        settings.key_columns = keys.into();
    }

    log::debug!("Handler settings: {:?}", settings);
    Ok(settings)
}

/// Convert one file and render its units, one JSON object per line.
fn process_file(input_path: &Path, args: &Args, registry: &ConverterRegistry) -> Result<String> {
    let mimetype = match &args.mime {
        Some(mime) => mime.clone(),
        None => guess_mime(input_path)?.to_string(),
    };

    let blob = SourceBlob::from_path(input_path, mimetype)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;

    let mut output = String::new();
    let mut count = 0;
    for unit in registry.lazy_convert(&blob)? {
        let unit = unit?;
        let json = if args.pretty {
            serde_json::to_string_pretty(&unit)?
        } else {
            serde_json::to_string(&unit)?
        };
        output.push_str(&json);
        output.push('\n');
        count += 1;
    }

    if args.verbose {
        eprintln!("  Produced {} units", count);
    }

    Ok(output)
}

fn guess_mime(input_path: &Path) -> Result<&'static str> {
    input_path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(docunits::mime_for_extension)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Could not detect MIME type of {}; pass --mime",
                input_path.display()
            )
        })
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: &Path) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir.display()))?;

    Ok(output_dir.join(format!("{}.json", stem)))
}

/// Write output to a file.
fn write_output(path: &Path, content: &str) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_settings() {
        let args = Args::parse_from(["docunits", "--email", "--keys", "first", "--no-word", "a.csv"]);
        let settings = build_settings(&args).unwrap();

        assert!(settings.enable_email);
        assert!(!settings.enable_word);
        assert_eq!(settings.key_columns, KeyColumns::First);
        assert_eq!(settings.sheets, SheetSelection::All);
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("deck.PPTX")).unwrap(), docunits::mime::PPTX);
        assert!(guess_mime(Path::new("notes")).is_err());
    }

    #[test]
    fn test_process_csv_file() {
        let dir = std::env::temp_dir().join(format!("docunits-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("people.csv");
        std::fs::write(&path, "id,name\n1,ann\n").unwrap();

        let args = Args::parse_from(["docunits", "people.csv"]);
        let output = process_file(&path, &args, &default_registry(&HandlerSettings::default())).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        let unit: serde_json::Value = serde_json::from_str(output.trim()).unwrap();
        assert_eq!(unit["text"], r#"[{"id":1,"name":"ann"}]"#);
        assert_eq!(unit["metadata"]["sheet"], "csv");
    }
}
