//! build-docx - render Markdown into a Word answer document

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use mddoc::{BuildOptions, DocxBuilder};

/// Exit code for an unusable template package.
const EXIT_SETUP: u8 = 2;

#[derive(Parser)]
#[command(name = "build-docx")]
#[command(version)]
#[command(about = "Build a .docx answer document from Markdown", long_about = None)]
struct Cli {
    /// Markdown input file, or "-" to read from stdin
    #[arg(long, value_name = "PATH")]
    markdown: String,

    /// Output .docx path
    #[arg(long, value_name = "PATH")]
    out: PathBuf,

    /// Template .docx path (created blank if missing)
    #[arg(long, value_name = "PATH", env = "MDDOC_TEMPLATE")]
    template: PathBuf,

    /// Template block .md inserted under each section (skipped if missing)
    #[arg(long, value_name = "PATH", env = "MDDOC_TEMPLATE_BLOCK")]
    template_block: PathBuf,

    /// JSON file with build options
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Comment author
    #[arg(long)]
    author: Option<String>,

    /// Comment author initials
    #[arg(long)]
    initials: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            if e.is_package_error() {
                eprintln!(
                    "{}: template {} is not a usable Word document",
                    "FATAL".red().bold(),
                    cli.template.display()
                );
                ExitCode::from(EXIT_SETUP)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn run(cli: &Cli) -> mddoc::Result<()> {
    let markdown = read_markdown(&cli.markdown)?;

    let mut options = match &cli.config {
        Some(path) => BuildOptions::from_json_file(path)?,
        None => BuildOptions::default(),
    };
    if let Some(author) = &cli.author {
        options.comment_author = author.clone();
    }
    if let Some(initials) = &cli.initials {
        options.comment_initials = initials.clone();
    }

    let out = absolute(&cli.out);
    let template = absolute(&cli.template);
    let block = absolute(&cli.template_block);

    println!("mddoc version: {}", env!("CARGO_PKG_VERSION"));
    println!("Forbereder dokument…");
    let report = DocxBuilder::new(options).build_file(&markdown, &template, Some(&block), &out)?;
    log::info!(
        "{} sections, {} blocks inserted, {} comments, {} inline notes",
        report.sections,
        report.inserted_blocks,
        report.comments,
        report.inline_notes
    );
    println!("Færdig!");
    println!("Gemte: {}", out.display());
    Ok(())
}

/// Read Markdown from a file, or from stdin (decoded lossily) for "-".
fn read_markdown(source: &str) -> mddoc::Result<String> {
    if source == "-" {
        let mut data = Vec::new();
        std::io::stdin().read_to_end(&mut data)?;
        return Ok(String::from_utf8_lossy(&data).into_owned());
    }
    Ok(std::fs::read_to_string(source)?)
}

fn absolute(path: &Path) -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
