use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};

use ratecon_core::config_file::{self, ConfigFile};
use ratecon_core::llm::{MistralSummarizer, Summarizer};
use ratecon_core::{ExtractError, Extraction};
use ratecon_ingest::{ExtractorConfig, default_extractor, is_pdf_path};

mod output;

use output::{ColorMode, ExtractionReport, SummaryReport};

const DEFAULT_MAX_FILE_SIZE_MB: u64 = 20;
const DEFAULT_LLM_TIMEOUT_SECS: u64 = 45;

/// Rate Confirmation Extractor - pull load details out of broker PDFs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug, Clone)]
struct ExtractionArgs {
    /// Path to the rate confirmation PDF
    file_path: PathBuf,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Comma-separated strategies to disable (layer_a,layer_b,layer_c,ocr)
    #[arg(long, value_delimiter = ',')]
    disable: Vec<String>,

    /// Raster resolution for the OCR tier
    #[arg(long)]
    ocr_dpi: Option<u32>,

    /// Maximum pages sent to the OCR tier
    #[arg(long)]
    ocr_pages: Option<usize>,

    /// Tesseract language code
    #[arg(long)]
    lang: Option<String>,

    /// Reject files larger than this
    #[arg(long)]
    max_file_size_mb: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the text of a rate confirmation PDF
    Extract {
        #[command(flatten)]
        args: ExtractionArgs,

        /// Emit a JSON report instead of plain text
        #[arg(long)]
        json: bool,

        /// Write the extracted text to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract text and summarize the load details via Mistral
    Summarize {
        #[command(flatten)]
        args: ExtractionArgs,

        /// Mistral API key (overrides MISTRAL_API_KEY and the config file)
        #[arg(long)]
        api_key: Option<String>,

        /// Mistral model name
        #[arg(long)]
        model: Option<String>,

        /// Emit a JSON report instead of formatted text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config_file::load_config();

    match cli.command {
        Command::Extract { args, json, output } => extract(args, json, output, &config).await,
        Command::Summarize {
            args,
            api_key,
            model,
            json,
        } => summarize(args, api_key, model, json, &config).await,
    }
}

/// Pre-flight checks plus the blocking cascade, moved off the async
/// runtime. The cascade itself has no suspension points; only the caller
/// is async.
async fn run_extraction(
    args: &ExtractionArgs,
    config: &ConfigFile,
) -> anyhow::Result<Result<Extraction, ExtractError>> {
    let path = args.file_path.clone();

    if !is_pdf_path(&path) {
        anyhow::bail!(
            "{} does not look like a PDF (wrong extension)",
            path.display()
        );
    }

    let max_size_mb = args
        .max_file_size_mb
        .or_else(|| {
            config
                .extraction
                .as_ref()
                .and_then(|e| e.max_file_size_mb)
        })
        .unwrap_or(DEFAULT_MAX_FILE_SIZE_MB);
    if let Ok(meta) = std::fs::metadata(&path) {
        let size_mb = meta.len() / (1024 * 1024);
        if size_mb > max_size_mb {
            anyhow::bail!(
                "file is {} MB, which exceeds the {} MB limit",
                size_mb,
                max_size_mb
            );
        }
    }

    let extractor_config = build_extractor_config(args, config);
    let extractor = Arc::new(default_extractor(&extractor_config));

    let result = tokio::task::spawn_blocking(move || extractor.extract(&path))
        .await
        .context("extraction task panicked")?;
    Ok(result)
}

fn build_extractor_config(args: &ExtractionArgs, config: &ConfigFile) -> ExtractorConfig {
    let file_ocr = config.ocr.as_ref();
    let file_extraction = config.extraction.as_ref();
    let defaults = ExtractorConfig::default();

    let mut disabled = args.disable.clone();
    if disabled.is_empty() {
        if let Some(d) = file_extraction.and_then(|e| e.disabled.clone()) {
            disabled = d;
        }
    }

    ExtractorConfig {
        disabled,
        ocr_dpi: args
            .ocr_dpi
            .or_else(|| file_ocr.and_then(|o| o.dpi))
            .unwrap_or(defaults.ocr_dpi),
        ocr_max_pages: args
            .ocr_pages
            .or_else(|| file_ocr.and_then(|o| o.max_pages))
            .unwrap_or(defaults.ocr_max_pages),
        ocr_language: args
            .lang
            .clone()
            .or_else(|| file_ocr.and_then(|o| o.language.clone()))
            .unwrap_or(defaults.ocr_language),
    }
}

async fn extract(
    args: ExtractionArgs,
    json: bool,
    output: Option<PathBuf>,
    config: &ConfigFile,
) -> anyhow::Result<()> {
    let color = ColorMode(!args.no_color && output.is_none());
    let file_name = display_name(&args.file_path);

    let result = run_extraction(&args, config).await?;

    let mut writer: Box<dyn Write> = match output {
        Some(ref path) => Box::new(std::fs::File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    if json {
        let report = ExtractionReport::from_result(&result);
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        if result.is_err() {
            std::process::exit(1);
        }
        return Ok(());
    }

    match result {
        Ok(extraction) => {
            output::print_extraction_success(
                &mut std::io::stderr(),
                &file_name,
                &extraction,
                color,
            )?;
            writeln!(writer, "{}", extraction.text)?;
            Ok(())
        }
        Err(err) => {
            output::print_extraction_failure(&mut std::io::stderr(), &err, color)?;
            std::process::exit(1);
        }
    }
}

async fn summarize(
    args: ExtractionArgs,
    api_key: Option<String>,
    model: Option<String>,
    json: bool,
    config: &ConfigFile,
) -> anyhow::Result<()> {
    let color = ColorMode(!args.no_color);
    let file_name = display_name(&args.file_path);
    let llm = config.llm.as_ref();

    // CLI flag > environment > config file.
    let api_key = api_key
        .or_else(|| std::env::var("MISTRAL_API_KEY").ok())
        .or_else(|| llm.and_then(|l| l.api_key.clone()))
        .context("no Mistral API key: pass --api-key, set MISTRAL_API_KEY, or add [llm] api_key to the config file")?;

    let model = model
        .or_else(|| llm.and_then(|l| l.model.clone()))
        .unwrap_or_else(|| ratecon_core::llm::DEFAULT_MODEL.to_string());
    let max_input_chars = llm
        .and_then(|l| l.max_input_chars)
        .unwrap_or(ratecon_core::llm::DEFAULT_MAX_INPUT_CHARS);
    let timeout = Duration::from_secs(
        llm.and_then(|l| l.timeout_secs)
            .unwrap_or(DEFAULT_LLM_TIMEOUT_SECS),
    );

    let extraction = match run_extraction(&args, config).await? {
        Ok(extraction) => extraction,
        Err(err) => {
            output::print_extraction_failure(&mut std::io::stderr(), &err, color)?;
            std::process::exit(1);
        }
    };

    let summarizer = MistralSummarizer::new(api_key)
        .with_model(model)
        .with_max_input_chars(max_input_chars);
    let client = reqwest::Client::new();

    match summarizer
        .summarize(&extraction.text, &client, timeout)
        .await
    {
        Ok(summary) => {
            let mut stdout = std::io::stdout();
            if json {
                let report = SummaryReport {
                    success: true,
                    method: extraction.method.as_str(),
                    summary: &summary,
                };
                writeln!(stdout, "{}", serde_json::to_string_pretty(&report)?)?;
            } else {
                output::print_summary(
                    &mut stdout,
                    &file_name,
                    extraction.method.as_str(),
                    &summary,
                    color,
                )?;
            }
            Ok(())
        }
        Err(err) => {
            output::print_summarize_failure(&mut std::io::stderr(), &err, color)?;
            std::process::exit(1);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
