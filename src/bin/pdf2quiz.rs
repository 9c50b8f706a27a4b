//! CLI binary for pdf2quiz.
//!
//! A thin shim over the library crate that maps CLI flags to `QuizConfig`
//! and prints the quiz JSON.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2quiz::{generate_quiz, QuizConfig};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Default quiz (5 multiple-choice + 5 true/false) to stdout
  pdf2quiz chapter.pdf

  # Write to file, custom counts
  pdf2quiz --mcq 10 --tf 0 chapter.pdf -o quiz.json

  # Use a specific backend and model
  pdf2quiz --backend gemini --model gemini-2.0-flash chapter.pdf

  # Heavier excerpt and no content-category filtering (gemini only)
  pdf2quiz --excerpt-limit 8000 --no-safety-filters history.pdf

SUPPORTED BACKENDS:
  Backend    Default model      API key env var
  ─────────  ─────────────────  ────────────────
  openai     gpt-4o-mini        OPENAI_API_KEY
  gemini     gemini-2.0-flash   GEMINI_API_KEY

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY    OpenAI API key
  GEMINI_API_KEY    Google Gemini API key
  PDF2QUIZ_BACKEND  Override backend (openai, gemini)
  PDF2QUIZ_MODEL    Override model ID

SETUP:
  1. Set an API key:  export OPENAI_API_KEY=sk-...
  2. Generate:        pdf2quiz chapter.pdf -o quiz.json
"#;

/// Generate a structured quiz from a PDF document using an LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2quiz",
    version,
    about = "Generate a structured quiz from a PDF document using an LLM",
    long_about = "Extracts the text of a PDF document, asks a generative-language backend for \
multiple-choice and true/false questions, and validates the result into a strict JSON schema. \
Supports OpenAI and Google Gemini.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write quiz JSON to this file instead of stdout.
    #[arg(short, long, env = "PDF2QUIZ_OUTPUT")]
    output: Option<PathBuf>,

    /// Number of multiple-choice questions.
    #[arg(long = "mcq", env = "PDF2QUIZ_MCQ", default_value_t = 5)]
    multiple_choice: usize,

    /// Number of true/false questions.
    #[arg(long = "tf", env = "PDF2QUIZ_TF", default_value_t = 5)]
    true_false: usize,

    /// Generation backend: openai, gemini. Auto-detected from API keys if unset.
    #[arg(long, env = "PDF2QUIZ_BACKEND")]
    backend: Option<String>,

    /// Model ID (e.g. gpt-4o-mini, gemini-2.0-flash).
    #[arg(long, env = "PDF2QUIZ_MODEL")]
    model: Option<String>,

    /// Max characters of extracted text embedded in the prompt.
    #[arg(long, env = "PDF2QUIZ_EXCERPT_LIMIT", default_value_t = 4000)]
    excerpt_limit: usize,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PDF2QUIZ_TEMPERATURE", default_value_t = 0.2)]
    temperature: f32,

    /// Max tokens the model may generate.
    #[arg(long, env = "PDF2QUIZ_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// Retries after a failed generation attempt.
    #[arg(long, env = "PDF2QUIZ_MAX_RETRIES", default_value_t = 2)]
    max_retries: u32,

    /// Per-call backend timeout in seconds.
    #[arg(long, env = "PDF2QUIZ_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Suppress the backend's content-category safety filters (gemini only).
    #[arg(long, env = "PDF2QUIZ_NO_SAFETY_FILTERS")]
    no_safety_filters: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2QUIZ_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the quiz itself.
    #[arg(short, long, env = "PDF2QUIZ_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = QuizConfig::builder()
        .multiple_choice_count(cli.multiple_choice)
        .true_false_count(cli.true_false)
        .excerpt_limit(cli.excerpt_limit)
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout)
        .disable_safety_filters(cli.no_safety_filters);

    if let Some(ref backend) = cli.backend {
        builder = builder.backend_name(backend.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run pipeline ─────────────────────────────────────────────────────
    let bytes = tokio::fs::read(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let quiz = generate_quiz(&bytes, &config)
        .await
        .context("Quiz generation failed")?;

    let json = serde_json::to_string_pretty(&quiz).context("Failed to serialise quiz")?;

    if let Some(ref output_path) = cli.output {
        tokio::fs::write(output_path, &json)
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "Wrote {} questions to {}",
                quiz.question_count(),
                output_path.display()
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
    }

    Ok(())
}
