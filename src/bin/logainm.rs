//! CLI binary for logainm.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` / `SynthesisConfig` and prints results.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use logainm::output::sentences_csv;
use logainm::{
    extract_directory, read_placenames_csv, synthesise, write_placenames_csv, write_sentences_csv,
    ExtractionConfig, FeatureCriteria, FeatureMatrix, ProgressCallback, RunProgressCallback,
    SamplingPolicy, SynthesisConfig,
};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live progress bar plus one log line per
/// item. Items may complete out of order during synthesis.
struct CliProgressCallback {
    bar: ProgressBar,
    /// Plural noun for the counter: "documents" or "requests".
    unit: &'static str,
    /// `produced` noun: "pairs" or "sentences".
    produced_unit: &'static str,
    start_times: Mutex<HashMap<usize, (Instant, String)>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new(unit: &'static str, produced_unit: &'static str) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            unit,
            produced_unit,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn take_start(&self, index: usize) -> (u128, String) {
        self.start_times
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&index)
            .map(|(t, label)| (t.elapsed().as_millis(), label))
            .unwrap_or_default()
    }
}

impl RunProgressCallback for CliProgressCallback {
    fn on_run_start(&self, total: usize) {
        let style = ProgressStyle::with_template(&format!(
            "{{spinner:.cyan}} {{prefix:.bold}}  [{{bar:42.green/238}}] {{pos:>3}}/{{len}} {}  \
             ⏱ {{elapsed_precise}}  ETA {{eta_precise}}",
            self.unit
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Working");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting {total} {}…", self.unit))
        ));
    }

    fn on_item_start(&self, index: usize, _total: usize, label: &str) {
        self.start_times
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(index, (Instant::now(), label.to_string()));
        self.bar.set_message(label.to_string());
    }

    fn on_item_complete(&self, index: usize, total: usize, produced: usize) {
        let (elapsed_ms, label) = self.take_start(index);
        self.bar.println(format!(
            "  {} {:>4}/{:<4}  {:<40}  {}  {}",
            green("✓"),
            index,
            total,
            label,
            dim(&format!("{produced:>5} {}", self.produced_unit)),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_item_error(&self, index: usize, total: usize, error: &str) {
        let (elapsed_ms, label) = self.take_start(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} {:>4}/{:<4}  {:<40}  {}  {}",
            red("✗"),
            index,
            total,
            label,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_run_complete(&self, total: usize, success_count: usize) {
        let failed = total.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} {} processed successfully",
                green("✔"),
                bold(&success_count.to_string()),
                self.unit
            );
        } else {
            eprintln!(
                "{} {}/{} {} processed  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total,
                self.unit,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract every placename order in a directory to CSV
  logainm extract ./placenames -o placenames.csv

  # Extracted pairs as JSON
  logainm extract ./placenames --json > pairs.json

  # Feature matrix summary, a filtered view, or a sample
  logainm features
  logainm features --person 1sg --tense "Aimsir Cháite"
  logainm features --sample 20 --json

  # Sentences for the first 20 placenames
  logainm synthesise placenames.csv -o sentences.csv

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  GEMINI_API_KEY          Google Gemini API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (openai, anthropic, gemini, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PDFIUM_LIB_PATH         Path to libpdfium, or a directory containing it
"#;

/// Build Irish place-name datasets and synthesise sentences around them.
#[derive(Parser, Debug)]
#[command(
    name = "logainm",
    version,
    about = "Build Irish place-name datasets and synthesise sentences around them",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "LOGAINM_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "LOGAINM_QUIET")]
    quiet: bool,

    /// Disable progress bar.
    #[arg(long, global = true, env = "LOGAINM_NO_PROGRESS")]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract English–Irish name pairs from a directory of placename orders.
    Extract(ExtractArgs),
    /// Inspect or sample the grammatical feature matrix.
    Features(FeaturesArgs),
    /// Generate Irish sentences for placenames from a CSV.
    Synthesise(SynthesiseArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Directory containing the placename-order PDFs.
    dir: PathBuf,

    /// Write the `Ceantar,Logainm` dataset to this file.
    #[arg(short, long, env = "LOGAINM_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the full extraction output as JSON.
    #[arg(long)]
    json: bool,

    /// File-name token that precedes the area words.
    #[arg(long, env = "LOGAINM_MARKER", default_value = logainm::area::DEFAULT_MARKER)]
    marker: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "LOGAINM_PASSWORD")]
    password: Option<String>,
}

#[derive(Args, Debug)]
struct FeaturesArgs {
    /// Print N sampled rows instead of the summary.
    #[arg(long)]
    sample: Option<usize>,

    /// Allow repeated rows in the sample.
    #[arg(long)]
    allow_repeats: bool,

    /// Fail instead of repeating rows when the sample exceeds the matrix.
    #[arg(long)]
    strict: bool,

    #[arg(long)]
    person: Option<String>,

    #[arg(long)]
    verb: Option<String>,

    #[arg(long)]
    preposition: Option<String>,

    #[arg(long)]
    case: Option<String>,

    #[arg(long)]
    tense: Option<String>,

    /// Output JSON.
    #[arg(long)]
    json: bool,
}

impl FeaturesArgs {
    fn criteria(&self) -> Option<FeatureCriteria> {
        let criteria = FeatureCriteria {
            person: self.person.clone(),
            verb: self.verb.clone(),
            preposition: self.preposition.clone(),
            case: self.case.clone(),
            tense: self.tense.clone(),
        };
        (criteria != FeatureCriteria::default()).then_some(criteria)
    }
}

#[derive(Args, Debug)]
struct SynthesiseArgs {
    /// Placenames dataset (`Ceantar,Logainm`).
    placenames: PathBuf,

    /// Write the sentences dataset to this file instead of stdout.
    #[arg(short, long, env = "LOGAINM_OUTPUT")]
    output: Option<PathBuf>,

    /// Use only the first N placenames (0 = all).
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// LLM model ID (default: gpt-4.1-mini).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// LLM provider: openai, anthropic, gemini, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM temperature (0.0–2.0).
    #[arg(long, env = "LOGAINM_TEMPERATURE", default_value_t = 0.9)]
    temperature: f32,

    /// Number of concurrent LLM calls within a batch.
    #[arg(short, long, env = "LOGAINM_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Requests per batch.
    #[arg(long, env = "LOGAINM_BATCH_SIZE", default_value_t = 10)]
    batch_size: usize,

    /// Pause between batches, in milliseconds.
    #[arg(long, env = "LOGAINM_BATCH_DELAY_MS", default_value_t = 1000)]
    batch_delay_ms: u64,

    /// Sentences requested per placename.
    #[arg(long, default_value_t = 5)]
    sentences: usize,

    /// Retries per request on LLM failure.
    #[arg(long, env = "LOGAINM_MAX_RETRIES", default_value_t = 3)]
    max_retries: u32,

    /// Per-request LLM call timeout in seconds.
    #[arg(long, env = "LOGAINM_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "LOGAINM_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Output structured JSON (SynthesisOutput) instead of CSV.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active.
    let json = match &cli.command {
        Command::Extract(a) => a.json,
        Command::Features(_) => true,
        Command::Synthesise(a) => a.json,
    };
    let show_progress = !cli.quiet && !cli.no_progress && !json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Extract(ref args) => run_extract(args, cli.quiet, show_progress).await,
        Command::Features(ref args) => run_features(args),
        Command::Synthesise(ref args) => run_synthesise(args, cli.quiet, show_progress).await,
    }
}

async fn run_extract(args: &ExtractArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let mut builder = ExtractionConfig::builder().marker_token(&args.marker);
    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd);
    }
    if show_progress {
        builder = builder.progress_callback(
            CliProgressCallback::new("documents", "pairs") as Arc<dyn RunProgressCallback>
        );
    }
    let config = builder.build().context("Invalid configuration")?;

    let output = extract_directory(&args.dir, &config).await;

    if let Some(ref path) = args.output {
        let rows = write_placenames_csv(path, &output)
            .await
            .context("Failed to write placenames CSV")?;
        if !quiet {
            eprintln!(
                "{}  {} placenames from {}/{} documents  →  {}",
                if output.stats.failed_documents == 0 { green("✔") } else { cyan("⚠") },
                rows,
                output.stats.readable_documents,
                output.stats.total_documents,
                bold(&path.display().to_string()),
            );
        }
    }

    if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if args.output.is_none() {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        for doc in &output.documents {
            let line = match &doc.error {
                None => format!("{:<40} {:>6} pairs  {}", doc.area, doc.pairs.len(), doc.file),
                Some(e) => format!("{:<40} {:>6}  {}", doc.area, "-", e),
            };
            writeln!(handle, "{line}").context("Failed to write to stdout")?;
        }
    }

    Ok(())
}

fn run_features(args: &FeaturesArgs) -> Result<()> {
    let policy = if args.strict {
        SamplingPolicy::Strict
    } else {
        SamplingPolicy::FallbackWithReplacement
    };
    let matrix = FeatureMatrix::with_policy(policy);

    let rows = match (args.sample, args.criteria()) {
        (Some(_), Some(_)) => anyhow::bail!("--sample cannot be combined with feature filters"),
        (Some(n), None) => Some(
            matrix
                .sample(n, !args.allow_repeats)
                .context("Failed to sample feature matrix")?,
        ),
        (None, Some(criteria)) => Some(matrix.filter(&criteria)),
        (None, None) => None,
    };

    match rows {
        Some(rows) if args.json => {
            println!("{}", serde_json::to_string_pretty(&rows).context("Failed to serialise rows")?);
        }
        Some(rows) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for r in &rows {
                writeln!(
                    handle,
                    "{}\t{}\t{}\t{}\t{}",
                    r.person, r.verb, r.preposition, r.case, r.tense
                )
                .context("Failed to write to stdout")?;
            }
        }
        None if args.json => {
            let summary = matrix.summary();
            println!("{}", serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?);
        }
        None => print!("{}", matrix.summary()),
    }

    Ok(())
}

async fn run_synthesise(args: &SynthesiseArgs, quiet: bool, show_progress: bool) -> Result<()> {
    let mut placenames = read_placenames_csv(&args.placenames)
        .await
        .with_context(|| format!("Failed to read placenames from {:?}", args.placenames))?;
    if args.limit > 0 {
        placenames.truncate(args.limit);
    }

    let progress: Option<ProgressCallback> = show_progress
        .then(|| CliProgressCallback::new("requests", "sentences") as Arc<dyn RunProgressCallback>);
    let config = build_synthesis_config(args, progress).await?;

    let output = synthesise(&placenames, &FeatureMatrix::new(), &config)
        .await
        .context("Synthesis failed")?;

    if let Some(ref path) = args.output {
        let rows = write_sentences_csv(path, &output)
            .await
            .context("Failed to write sentences CSV")?;
        if !quiet {
            eprintln!(
                "{}  {} sentences from {}/{} requests  →  {}",
                if output.stats.failed == 0 { green("✔") } else { cyan("⚠") },
                rows,
                output.stats.succeeded,
                output.stats.total_requests,
                bold(&path.display().to_string()),
            );
        }
    } else if args.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        io::stdout()
            .lock()
            .write_all(sentences_csv(&output).as_bytes())
            .context("Failed to write to stdout")?;
    }

    if !quiet && !args.json {
        eprintln!(
            "   {} tokens in  /  {} tokens out  —  {}ms total",
            dim(&output.stats.total_input_tokens.to_string()),
            dim(&output.stats.total_output_tokens.to_string()),
            output.stats.total_duration_ms,
        );
    }

    Ok(())
}

/// Map CLI args to `SynthesisConfig`.
async fn build_synthesis_config(
    args: &SynthesiseArgs,
    progress: Option<ProgressCallback>,
) -> Result<SynthesisConfig> {
    let mut builder = SynthesisConfig::builder()
        .temperature(args.temperature)
        .concurrency(args.concurrency)
        .batch_size(args.batch_size)
        .batch_delay_ms(args.batch_delay_ms)
        .sentences_per_request(args.sentences)
        .max_retries(args.max_retries)
        .api_timeout_secs(args.api_timeout);

    if let Some(ref path) = args.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
