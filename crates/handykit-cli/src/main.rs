//! HandyKit CLI - Command-line interface and MCP server for the HandyKit tools

mod mcp;

use clap::{Args, Parser, Subcommand};
use handykit::{ChatCompletionsSummarizer, ToolError, Toolkit, ToolkitConfig, TOOLKIT_LLMTXT};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Model requested from the summarizer when none is given
const DEFAULT_SUMMARIZER_MODEL: &str = "gpt-4o-mini";

/// HandyKit - everyday helper tools for AI assistants
#[derive(Parser, Debug)]
#[command(name = "handykit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    settings: Settings,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

/// Settings shared by every subcommand
#[derive(Args, Debug, Clone)]
struct Settings {
    /// File backing the notes tools
    #[arg(long, global = true, env = "HANDYKIT_NOTES_FILE")]
    notes_file: Option<PathBuf>,

    /// Maximum bytes of any crawl result
    #[arg(long, global = true, env = "HANDYKIT_MAX_RESULT_BYTES")]
    max_result_bytes: Option<usize>,

    /// Custom User-Agent
    #[arg(long, global = true, env = "HANDYKIT_USER_AGENT")]
    user_agent: Option<String>,

    /// Base URL of an OpenAI-compatible chat completions service
    #[arg(long, global = true, env = "HANDYKIT_SUMMARIZER_URL")]
    summarizer_url: Option<String>,

    /// Model requested from the summarizer
    #[arg(
        long,
        global = true,
        env = "HANDYKIT_SUMMARIZER_MODEL",
        default_value = DEFAULT_SUMMARIZER_MODEL
    )]
    summarizer_model: String,

    /// Bearer token for the summarizer
    #[arg(long, global = true, env = "HANDYKIT_SUMMARIZER_API_KEY", hide_env_values = true)]
    summarizer_api_key: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp,
    /// Crawl a URL and print its cleaned text
    Crawl {
        /// URL to crawl
        url: String,

        /// Summarize the cleaned text (requires --summarizer-url)
        #[arg(long, conflicts_with = "raw")]
        summarize: bool,

        /// Print the raw HTML instead
        #[arg(long)]
        raw: bool,
    },
    /// Current weather for a city anywhere
    Weather {
        /// City name
        city: String,
    },
    /// Current forecast for a US location
    UsWeather {
        /// Location as "City, ST"
        city_state: String,
    },
    /// Work with the notes file
    Note {
        #[command(subcommand)]
        action: NoteCommand,
    },
}

#[derive(Subcommand, Debug)]
enum NoteCommand {
    /// Append a note
    Add {
        /// Note text
        message: String,
    },
    /// Print every note
    Read,
    /// Print the most recent note
    Latest,
    /// Print the note summary prompt
    Prompt,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOLKIT_LLMTXT);
        std::process::exit(0);
    }

    init_tracing();

    let toolkit = match build_toolkit(&cli.settings) {
        Ok(toolkit) => toolkit,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Mcp) => {
            mcp::run_server(toolkit).await;
        }
        Some(Commands::Crawl {
            url,
            summarize,
            raw,
        }) => {
            run_crawl(&toolkit, &url, summarize, raw).await;
        }
        Some(Commands::Weather { city }) => {
            writeln_safe(&toolkit.weather().international_weather(&city).await);
        }
        Some(Commands::UsWeather { city_state }) => {
            writeln_safe(&toolkit.weather().us_weather(&city_state).await);
        }
        Some(Commands::Note { action }) => {
            run_note(&toolkit, action);
        }
        None => {
            eprintln!("Usage: handykit crawl <URL>");
            eprintln!("   or: handykit mcp");
            eprintln!("   or: handykit --help");
            std::process::exit(1);
        }
    }
}

/// Log to stderr; stdout carries protocol and command output
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

/// Build the toolkit from command line and environment settings
fn build_toolkit(settings: &Settings) -> Result<Toolkit, ToolError> {
    let mut config = ToolkitConfig::default();
    if let Some(ref path) = settings.notes_file {
        config = config.with_notes_path(path.clone());
    }
    if let Some(max_bytes) = settings.max_result_bytes {
        config = config.with_max_result_bytes(max_bytes);
    }
    if let Some(ref ua) = settings.user_agent {
        config = config.with_user_agent(ua.clone());
    }

    let mut builder = Toolkit::builder().config(config.clone());

    if let Some(ref url) = settings.summarizer_url {
        let mut summarizer = ChatCompletionsSummarizer::from_config(
            &config,
            url,
            settings.summarizer_model.clone(),
        )?;
        if let Some(ref key) = settings.summarizer_api_key {
            summarizer = summarizer.with_api_key(key.clone());
        }
        builder = builder.summarizer(Arc::new(summarizer));
    }

    Ok(builder.build())
}

async fn run_crawl(toolkit: &Toolkit, url: &str, summarize: bool, raw: bool) {
    let output = if summarize {
        if !toolkit.has_summarizer() {
            eprintln!("Error: --summarize requires --summarizer-url or HANDYKIT_SUMMARIZER_URL");
            std::process::exit(1);
        }
        toolkit.summarize_url(url).await
    } else if raw {
        toolkit.pipeline().retrieve_raw(url).await
    } else {
        toolkit.pipeline().retrieve_and_clean(url).await
    };

    writeln_safe(&output);
}

fn run_note(toolkit: &Toolkit, action: NoteCommand) {
    let notes = toolkit.notes();
    let result = match action {
        NoteCommand::Add { message } => notes.add_note(&message).map(str::to_string),
        NoteCommand::Read => notes.read_notes(),
        NoteCommand::Latest => notes.latest_note(),
        NoteCommand::Prompt => notes.summary_prompt(),
    };

    match result {
        Ok(text) => writeln_safe(&text),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
