//! neue CLI - render NPF post payloads.

mod config;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use neue::embed::{EmbedOptions, build_embed};
use neue::render_path::normalize_filename;
use neue::{HtmlOptions, MarkdownOptions, PollResultsMap, PollResultsSource, ReadOptions, Thread};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::Config;

#[derive(Parser)]
#[command(name = "neue")]
#[command(author, version, about = "Render NPF post payloads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a post payload
    Render {
        /// Payload JSON file (use - for stdin)
        input: PathBuf,

        /// Output to produce
        #[arg(short, long, value_enum, default_value_t = Output::Html)]
        to: Output,

        /// Ignore layout truncation
        #[arg(long)]
        unroll: bool,

        /// Fail on unknown block kinds and layout entries
        #[arg(long)]
        strict: bool,

        /// Replace media with placeholders in Markdown
        #[arg(long)]
        placeholders: bool,

        /// Request the dark render theme in embeds
        #[arg(long)]
        dark: bool,

        /// Current time for poll expiry (RFC 3339)
        #[arg(long)]
        now: Option<String>,

        /// TOML config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON object of poll results keyed by poll id
        #[arg(long)]
        poll_results: Option<PathBuf>,
    },

    /// Normalize a render file name
    Filename {
        /// File name such as `blog-123.unroll,dark.png`
        name: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Output {
    Html,
    Markdown,
    Embed,
    Info,
}

fn main() {
    let _ = dotenvy::dotenv();
    if let Err(e) = init_tracing() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
    if let Err(e) = run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,neue=info,neue_cli=info"));

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    // Logs go to stderr so rendered output can be piped.
    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    }
    Ok(())
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            input,
            to,
            unroll,
            strict,
            placeholders,
            dark,
            now,
            config,
            poll_results,
        } => {
            let config = Config::load(config.as_deref())?;
            let options = ReadOptions {
                strict: strict || config.strict,
                unroll,
            };
            let polls = poll_results.as_deref().map(load_poll_results).transpose()?;
            let thread = read_thread(&input, &options, polls.as_ref())?;

            let output = match to {
                Output::Html => {
                    let now = parse_now(now.as_deref())?;
                    thread.to_html(&HtmlOptions::at(now))?
                }
                Output::Markdown => {
                    let options = MarkdownOptions {
                        placeholders,
                        skip_single_placeholders: false,
                        italic: config.italic()?,
                    };
                    thread.to_markdown(&options)?
                }
                Output::Embed => {
                    let options = EmbedOptions {
                        renders_enabled: config.renders_enable,
                        base_url: config.base_url.clone(),
                        dark,
                        summary: None,
                    };
                    format_embed(&build_embed(&thread, &options, None)?, &config.app_name)
                }
                Output::Info => format_info(&thread),
            };
            println!("{output}");
        }
        Commands::Filename { name } => {
            println!("{}", normalize_filename(&name)?);
        }
    }

    Ok(())
}

fn read_thread(
    input: &Path,
    options: &ReadOptions,
    polls: Option<&PollResultsMap>,
) -> Result<Thread> {
    let text = if input.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        fs::read_to_string(input)
            .with_context(|| format!("failed to read payload {}", input.display()))?
    };

    let payload: serde_json::Value =
        serde_json::from_str(&text).context("payload is not valid JSON")?;
    let polls = polls.map(|p| p as &dyn PollResultsSource);
    let thread = Thread::from_payload_with(&payload, options, polls)?;

    tracing::info!(
        blog = %thread.blog_name,
        id = %thread.post_id,
        posts = thread.posts.len(),
        warnings = thread.warnings.len(),
        "read payload"
    );
    Ok(thread)
}

fn load_poll_results(path: &Path) -> Result<PollResultsMap> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read poll results {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).context("poll results are not valid JSON")?;
    match PollResultsMap::from_value(value) {
        Some(polls) => Ok(polls),
        None => bail!("poll results must be a JSON object keyed by poll id"),
    }
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(now) => Ok(DateTime::parse_from_rfc3339(now)
            .with_context(|| format!("invalid --now timestamp `{now}`"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn format_embed(embed: &neue::embed::Embed, app_name: &str) -> String {
    let mut lines = vec![
        format!("site:        {app_name}"),
        format!("url:         {}", embed.post_url),
        format!("card:        {}", embed.card_type.as_str()),
        format!("header:      {}", embed.header),
        format!("miniheader:  {}", embed.miniheader),
        format!("rendered:    {}", embed.should_render),
    ];
    if let Some(avatar) = &embed.avatar_url {
        lines.push(format!("avatar:      {avatar}"));
    }
    if let Some(image) = &embed.image {
        lines.push(format!("image:       {}", image.url));
    }
    if let Some(video) = &embed.video {
        lines.push(format!("video:       {}", video.url));
    }
    if let Some(thumbnail) = &embed.video_thumbnail {
        lines.push(format!("thumbnail:   {thumbnail}"));
    }
    lines.push(String::new());
    lines.push(embed.description.clone());
    lines.join("\n")
}

fn format_info(thread: &Thread) -> String {
    let info = &thread.thread_info;
    let mut lines = vec![
        format!("post:        {}/{}", thread.blog_name, thread.post_id),
        format!("posts:       {}", thread.posts.len()),
        format!("title:       {}", info.title.as_deref().unwrap_or("-")),
        format!("images:      {}", info.images.len()),
        format!("videos:      {}", info.videos.len()),
        format!("audio:       {}", info.audio.len()),
        format!("other:       {}", info.other_blocks.len()),
        format!("formatting:  {}", info.has_formatting),
    ];
    if let Some(from) = &thread.reblogged_from {
        lines.push(format!("reblogged:   from {from}"));
    }
    for warning in &thread.warnings {
        lines.push(format!("warning:     {}", warning.message));
    }
    lines.join("\n")
}
