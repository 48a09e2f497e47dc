//! CLI binary for diagramify.
//!
//! `serve` runs the upload web app; `convert` runs the pipeline once on a
//! local file. Both map flags to `PipelineConfig`.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use diagramify::{
    generate_diagrams, start_server, AppState, PipelineConfig, PipelineContext,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Start the web app on port 5000
  diagramify serve --bind 127.0.0.1:5000

  # One-off conversion, images written to ./diagrams
  diagramify convert slides.pptx --output-dir diagrams

  # Use another provider through edgequake-llm
  diagramify --provider openai --model gpt-4.1-mini convert notes.txt

  # Machine-readable result
  diagramify convert paper.pdf --json > result.json

SUPPORTED FORMATS:
  .pdf   one text page per PDF page (needs libpdfium)
  .pptx  one text page per slide, in presentation order
  .jpg .jpeg .png   a single image page (sent to a vision model)
  .txt   the whole file as one page

ENVIRONMENT VARIABLES:
  API_KEY / GEMINI_API_KEY   Gemini API key
  OPENAI_API_KEY, ...        keys for other providers (read by edgequake-llm)
  PDFIUM_LIB_PATH            directory containing libpdfium
  RUST_LOG                   overrides -v / -q
"#;

/// Turn documents into Mermaid diagrams, one per page.
#[derive(Parser, Debug)]
#[command(
    name = "diagramify",
    version,
    about = "Turn PDFs, slide decks, images and text files into Mermaid diagrams",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    shared: ModelArgs,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "DIAGRAMIFY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "DIAGRAMIFY_QUIET")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// LLM provider: gemini (default), openai, anthropic, ollama, ...
    #[arg(long, global = true, env = "DIAGRAMIFY_PROVIDER")]
    provider: Option<String>,

    /// Model ID. Default: gemini-2.5-flash for gemini.
    #[arg(long, global = true, env = "DIAGRAMIFY_MODEL")]
    model: Option<String>,

    /// Gemini API key. Falls back to GEMINI_API_KEY.
    #[arg(long, global = true, env = "API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of the Mermaid rendering service.
    #[arg(long, global = true, env = "DIAGRAMIFY_RENDER_URL")]
    render_url: Option<String>,

    /// Sampling temperature (0.0 to 2.0).
    #[arg(long, global = true, env = "DIAGRAMIFY_TEMPERATURE", default_value_t = 0.0)]
    temperature: f32,

    /// Top-k sampling (Gemini only).
    #[arg(long, global = true, env = "DIAGRAMIFY_TOP_K", default_value_t = 20)]
    top_k: u32,

    /// Top-p sampling (Gemini only).
    #[arg(long, global = true, env = "DIAGRAMIFY_TOP_P", default_value_t = 0.9)]
    top_p: f32,

    /// Max output tokens per page.
    #[arg(long, global = true, env = "DIAGRAMIFY_MAX_TOKENS", default_value_t = 500)]
    max_tokens: u32,

    /// Per-page model call timeout in seconds.
    #[arg(long, global = true, env = "DIAGRAMIFY_MODEL_TIMEOUT", default_value_t = 60)]
    model_timeout: u64,

    /// Per-page render request timeout in seconds.
    #[arg(long, global = true, env = "DIAGRAMIFY_RENDER_TIMEOUT", default_value_t = 30)]
    render_timeout: u64,

    /// Directory containing libpdfium.
    #[arg(long, global = true, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the upload web app.
    Serve {
        /// Address to listen on.
        #[arg(long, env = "DIAGRAMIFY_BIND", default_value = "127.0.0.1:5000")]
        bind: String,

        /// Where uploads are staged while being processed.
        #[arg(long, env = "DIAGRAMIFY_UPLOAD_DIR", default_value = "uploads")]
        upload_dir: PathBuf,

        /// Where generated images are written and served from.
        #[arg(long, env = "DIAGRAMIFY_STATIC_DIR", default_value = "static")]
        static_dir: PathBuf,

        /// Maximum upload size in bytes.
        #[arg(long, env = "DIAGRAMIFY_MAX_UPLOAD", default_value_t = 50 * 1024 * 1024)]
        max_upload_bytes: usize,
    },

    /// Convert one local file and print the saved image paths.
    Convert {
        /// PDF, PPTX, JPG/PNG or TXT file.
        input: PathBuf,

        /// Directory for the generated images.
        #[arg(short, long, env = "DIAGRAMIFY_OUTPUT_DIR", default_value = "diagrams")]
        output_dir: PathBuf,

        /// Print the result as JSON instead of one path per line.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
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
        Command::Serve {
            ref bind,
            ref upload_dir,
            ref static_dir,
            max_upload_bytes,
        } => {
            let config = base_config(&cli.shared)
                .upload_dir(upload_dir)
                .static_dir(static_dir)
                .max_upload_bytes(max_upload_bytes)
                .build()
                .context("Invalid configuration")?;

            for dir in [&config.upload_dir, &config.static_dir] {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }

            let ctx = PipelineContext::from_config(config)
                .context("Failed to initialise the pipeline")?;
            start_server(bind, AppState::new(ctx))
                .await
                .with_context(|| format!("Server on {bind} failed"))?;
        }

        Command::Convert {
            ref input,
            ref output_dir,
            json,
        } => {
            let config = base_config(&cli.shared)
                .build()
                .context("Invalid configuration")?;
            let ctx = PipelineContext::from_config(config)
                .context("Failed to initialise the pipeline")?;

            let output = generate_diagrams(&ctx, input, output_dir, "")
                .await
                .context("Conversion failed")?;

            if json {
                let json =
                    serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
                println!("{json}");
            } else {
                for diagram in &output.diagrams {
                    println!("{}", output_dir.join(&diagram.file_name).display());
                }
                if !cli.quiet {
                    eprintln!(
                        "{}/{} pages rendered ({} fallbacks, {} failed renders) in {}ms",
                        output.stats.rendered_pages,
                        output.stats.total_pages,
                        output.stats.fallback_pages,
                        output.stats.failed_renders,
                        output.stats.duration_ms,
                    );
                }
            }
        }
    }

    Ok(())
}

/// Map the shared model flags onto a config builder.
fn base_config(args: &ModelArgs) -> diagramify::PipelineConfigBuilder {
    let mut builder = PipelineConfig::builder()
        .temperature(args.temperature)
        .top_k(args.top_k)
        .top_p(args.top_p)
        .max_output_tokens(args.max_tokens)
        .model_timeout_secs(args.model_timeout)
        .render_timeout_secs(args.render_timeout);

    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    let api_key = args
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .filter(|k| !k.is_empty());
    if let Some(key) = api_key {
        builder = builder.api_key(key);
    }
    if let Some(ref url) = args.render_url {
        builder = builder.render_base_url(url);
    }
    if let Some(ref dir) = args.pdfium_lib_path {
        builder = builder.pdfium_lib_path(dir);
    }
    builder
}
