//! convert-to-md - extract Markdown from PDF, Markdown or text files

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use serde::Serialize;

use mddoc::{convert_file, ConvertOptions, ConvertResult, ExtractOptions, SourceMetadata};

/// Exit code for a missing input file.
const EXIT_MISSING_INPUT: u8 = 2;

#[derive(Parser)]
#[command(name = "convert-to-md")]
#[command(version)]
#[command(about = "Convert documents (PDF/Markdown/text) to Markdown", long_about = None)]
struct Cli {
    /// Path to the input file (PDF/Markdown/text)
    #[arg(long, value_name = "PATH")]
    input: PathBuf,

    /// Optional path to write the Markdown output
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Limit the number of pages converted (0 or less = all)
    #[arg(long, value_name = "N", allow_negative_numbers = true)]
    max_pages: Option<i64>,

    /// Stdout output format
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Include metadata when using JSON output
    #[arg(long)]
    metadata: bool,

    /// Skip PDF pages that cannot be decoded instead of failing
    #[arg(long)]
    lenient: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// {"markdown": ..., "metadata"?: ...}
    Json,
    /// Raw Markdown
    Text,
}

#[derive(Serialize)]
struct Payload<'a> {
    markdown: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<SourceMetadata>,
}

#[derive(Serialize)]
struct ErrorPayload {
    error: String,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    let input = absolute(&cli.input);
    if !input.exists() {
        emit_error(format!("Input file not found: {}", input.display()));
        return ExitCode::from(EXIT_MISSING_INPUT);
    }

    let result = match convert(&cli, &input) {
        Ok(result) => result,
        Err(e) => {
            log::debug!("conversion failed: {:?}", e);
            emit_error(e.to_string());
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = write_output(&cli, &result) {
        emit_error(e.to_string());
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn convert(cli: &Cli, input: &Path) -> mddoc::Result<ConvertResult> {
    let mut extract = ExtractOptions::new();
    if let Some(max) = cli.max_pages.filter(|n| *n > 0) {
        extract = extract.with_max_pages(u32::try_from(max).unwrap_or(u32::MAX));
    }
    if cli.lenient {
        extract = extract.lenient();
    }
    convert_file(input, &ConvertOptions::new().with_extract_options(extract))
}

fn write_output(cli: &Cli, result: &ConvertResult) -> mddoc::Result<()> {
    if let Some(path) = &cli.output {
        std::fs::write(absolute(path), &result.markdown)?;
    }

    let mut stdout = std::io::stdout().lock();
    match cli.format {
        OutputFormat::Json => {
            let payload = Payload {
                markdown: &result.markdown,
                metadata: cli.metadata.then_some(result.metadata),
            };
            serde_json::to_writer(&mut stdout, &payload)?;
        }
        OutputFormat::Text => stdout.write_all(result.markdown.as_bytes())?,
    }
    if cli.output.is_none() {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

/// Print `{"error": message}` on stdout.
fn emit_error(message: String) {
    let payload = serde_json::to_string(&ErrorPayload { error: message })
        .unwrap_or_else(|_| r#"{"error": "unknown error"}"#.to_string());
    print!("{}", payload);
}

fn absolute(path: &Path) -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
