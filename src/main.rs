//! CV Redaction CLI Application.
//!
//! Thin command-line front end over the cvredact library: redact a CV with
//! detector mappings (or the offline regex detector), extract its text, or
//! print what the offline detector would flag.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use cvredact::ingest::{self, DocumentFormat};
use cvredact::{
    Detector, DetectorResponse, Mapping, ProcessedDocument, RedactionConfig, RedactionOutcome,
    RedactionService, RedactionStatus, RedactorError, RegexDetector,
};

/// CV Redaction Tool
///
/// Covers personal data in CV documents with opaque rectangles.
/// By default, performs redaction. Use 'extract' or 'detect' for inspection.
#[derive(Parser)]
#[command(name = "cvredact")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input document (PDF or DOCX)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (PDF for PDF input, text for Word input)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Detector output: `{"cleanCV": .., "mappings": [..]}` or a bare mapping array.
    /// Without it the offline regex detector supplies mappings.
    #[arg(short, long, value_name = "FILE")]
    mappings: Option<PathBuf>,

    /// JSON file overriding matching, image and cover thresholds
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Abort the request after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// MIME type of the input (guessed from the extension by default)
    #[arg(long, value_name = "TYPE")]
    mime: Option<String>,

    /// Write a JSON report of located regions and counters
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text and word count from a document
    Extract {
        /// Input document
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output text file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long, value_name = "TYPE")]
        mime: Option<String>,
    },
    /// Run the offline regex detector and print its JSON response
    Detect {
        /// Input document
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output JSON file (optional, defaults to stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[arg(long, value_name = "TYPE")]
        mime: Option<String>,
    },
}

/// Either shape a mapping file may take.
#[derive(Deserialize)]
#[serde(untagged)]
enum MappingFile {
    Response(DetectorResponse),
    List(Vec<Mapping>),
}

/// Command handler owning the configured service.
struct RedactionHandler {
    service: RedactionService,
    verbose: bool,
}

impl RedactionHandler {
    fn new(config: RedactionConfig, timeout: Option<Duration>, verbose: bool) -> Self {
        let mut service = RedactionService::with_pdf_extractor().with_config(config);
        if let Some(timeout) = timeout {
            service = service.with_timeout(timeout);
        }
        Self { service, verbose }
    }

    /// Executes a redaction operation.
    fn redact(
        &self,
        input: &Path,
        output: &Path,
        format: DocumentFormat,
        mappings: Vec<Mapping>,
        report: Option<&Path>,
    ) -> Result<()> {
        let bytes = read_input(input)?;

        if self.verbose {
            println!("Input:    {}", input.display());
            println!("Output:   {}", output.display());
            println!("Format:   {}", format.mime());
            println!("Mappings: {}", mappings.len());
        }

        let processed = self
            .service
            .process_document(&bytes, format.mime(), &mappings)
            .with_context(|| format!("Redaction of {} failed", input.display()))?;

        match processed {
            ProcessedDocument::Pdf(outcome) => {
                std::fs::write(output, &outcome.document)
                    .with_context(|| format!("Failed to write to {}", output.display()))?;
                if let Some(report) = report {
                    write_report(report, &outcome)?;
                }
                self.summarize(&outcome, output);
            }
            ProcessedDocument::Text { text, word_count } => {
                std::fs::write(output, &text)
                    .with_context(|| format!("Failed to write to {}", output.display()))?;
                println!(
                    "✓ Redacted text ({} words) → {}",
                    word_count,
                    output.display()
                );
            }
        }
        Ok(())
    }

    fn summarize(&self, outcome: &RedactionOutcome, output: &Path) {
        if self.verbose {
            println!("\nRedaction Summary:");
            println!("  Pages processed:  {}", outcome.pages_processed);
            println!("  Pages modified:   {}", outcome.pages_modified);
            println!("  Text regions:     {}", outcome.text_regions.len());
            println!("  Image regions:    {}", outcome.image_regions.len());
            println!("  Covers drawn:     {}", outcome.regions_drawn);
            println!("  Skipped regions:  {}", outcome.skipped_out_of_range);
            println!(
                "  Candidates:       {} of {} mappings",
                outcome.expansion.emitted, outcome.expansion.received
            );
        }

        for warning in &outcome.warnings {
            println!("⚠ {}", warning);
        }

        match outcome.status {
            RedactionStatus::Redacted => println!(
                "✓ Covered {} region(s) → {}",
                outcome.regions_drawn,
                output.display()
            ),
            RedactionStatus::NoRegionsFound => {
                println!("⚠ No regions found; output is unchanged, review needed")
            }
        }
    }

    /// Extracts text from a document.
    fn extract(&self, input: &Path, output: Option<&Path>, format: DocumentFormat) -> Result<()> {
        let parsed = ingest::parse_as(&read_input(input)?, format)
            .with_context(|| "Text extraction failed")?;

        if let Some(output_path) = output {
            std::fs::write(output_path, &parsed.text)
                .with_context(|| format!("Failed to write to {}", output_path.display()))?;
            println!(
                "✓ Extracted {} words → {}",
                parsed.word_count,
                output_path.display()
            );
        } else {
            println!("{}", parsed.text);
        }

        if self.verbose {
            if let Some(pages) = parsed.page_count {
                println!("Pages: {}", pages);
            }
            println!("Words: {}", parsed.word_count);
        }
        Ok(())
    }

    /// Prints the offline detector's response for a document.
    fn detect(&self, input: &Path, output: Option<&Path>, format: DocumentFormat) -> Result<()> {
        let response = offline_detection(input, format)?;
        let json = serde_json::to_string_pretty(&response)?;
        match output {
            Some(path) => {
                std::fs::write(path, json)
                    .with_context(|| format!("Failed to write to {}", path.display()))?;
                println!(
                    "✓ {} mapping(s) → {}",
                    response.mappings.len(),
                    path.display()
                );
            }
            None => println!("{}", json),
        }
        Ok(())
    }
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    if !input.exists() {
        anyhow::bail!("Input file does not exist: {}", input.display());
    }
    std::fs::read(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn resolve_format(input: &Path, mime: Option<&str>) -> Result<DocumentFormat> {
    let format = match mime {
        Some(mime) => DocumentFormat::from_mime(mime),
        None => DocumentFormat::from_path(input),
    };
    format.with_context(|| format!("Cannot process {}", input.display()))
}

fn load_mappings(path: &Path) -> Result<Vec<Mapping>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mappings from {}", path.display()))?;
    let parsed: MappingFile = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid mapping file {}", path.display()))?;
    let mappings = match parsed {
        MappingFile::Response(response) => response.into_valid().mappings,
        MappingFile::List(mappings) => mappings,
    };
    debug!(count = mappings.len(), "loaded mappings");
    Ok(mappings)
}

/// Runs the regex detector over the document's text. A document without
/// extractable text yields no mappings; the safety net still applies.
fn offline_detection(input: &Path, format: DocumentFormat) -> Result<DetectorResponse> {
    let parsed = ingest::parse_as(&read_input(input)?, format)
        .with_context(|| "Text extraction failed")?;
    match RegexDetector::new().detect(&parsed.text) {
        Ok(response) => Ok(response),
        Err(RedactorError::InvalidInput { reason, .. }) => {
            warn!(%reason, "no text to run detection on");
            Ok(DetectorResponse::default())
        }
        Err(e) => Err(e.into()),
    }
}

fn write_report(path: &Path, outcome: &RedactionOutcome) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write to {}", path.display()))
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "cvredact=debug" } else { "cvredact=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => RedactionConfig::from_json_file(path)
            .with_context(|| format!("Invalid configuration {}", path.display()))?,
        None => RedactionConfig::default(),
    };
    let timeout = cli.timeout_secs.map(Duration::from_secs);
    let handler = RedactionHandler::new(config, timeout, cli.verbose);

    match &cli.command {
        Some(Commands::Extract {
            input,
            output,
            mime,
        }) => {
            let format = resolve_format(input, mime.as_deref())?;
            handler.extract(input, output.as_deref(), format)?;
        }
        Some(Commands::Detect {
            input,
            output,
            mime,
        }) => {
            let format = resolve_format(input, mime.as_deref())?;
            handler.detect(input, output.as_deref(), format)?;
        }
        None => {
            // Default: redaction mode
            let input = cli
                .input
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--input is required"))?;
            let output = cli
                .output
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("--output is required"))?;
            let format = resolve_format(input, cli.mime.as_deref())?;

            let mappings = match &cli.mappings {
                Some(path) => load_mappings(path)?,
                None => offline_detection(input, format)?.mappings,
            };
            handler.redact(input, output, format, mappings, cli.report.as_deref())?;
        }
    }

    Ok(())
}
