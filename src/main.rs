//! GossipAI CLI
//!
//! Command-line front-end for the conversation analysis service:
//! - Log in and out
//! - Analyze text, screenshots and recordings
//! - Browse, filter and delete past analyses
//! - Pick an analysis preset
//! - Ask the assistant for reply suggestions

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gossipai::client::{AnalysisOptions, ApiClient, Outcome, Submission, TextAnalysisRequest};
use gossipai::config::{generate_default_config, Config, LoggingConfig};
use gossipai::history::{HistoryFilter, HistorySort, ScoreBand};
use gossipai::models::{AnalysisResult, HistoryItem, Preset};
use gossipai::progress::{ProgressTracker, Stage};
use gossipai::session::{FileStore, Preferences, Session};
use gossipai::upload::{UploadBatch, UploadFile};
use serde::Serialize;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gossipai")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analyze conversations with GossipAI")]
#[command(long_about = "GossipAI reads a conversation (pasted text, screenshots or a recording)\nand reports emotions, an AI-judge score and the subtleties between the lines.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: user config dir, then ./gossipai.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Analysis service URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Serve demo data when the service fails
    #[arg(long, global = true)]
    pub demo: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        email: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        email: String,
        /// Display name
        #[arg(long)]
        name: String,
        /// Password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Forget the saved session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Analyze a conversation
    Analyze {
        #[command(subcommand)]
        source: AnalyzeSource,
    },

    /// Past analyses
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Analysis presets
    Presets {
        #[command(subcommand)]
        command: PresetsCommand,
    },

    /// Suggest replies for an analyzed conversation
    Suggest {
        /// History entry whose analysis to use
        #[arg(long, conflicts_with = "text")]
        id: Option<String>,
        /// Raw conversation text instead of a history entry
        #[arg(long)]
        text: Option<String>,
        /// Extra context for the assistant
        #[arg(long)]
        context: Option<String>,
    },

    /// Ask the analysis assistant
    Chat {
        message: String,
        /// Continue an earlier conversation
        #[arg(long)]
        conversation: Option<String>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum AnalyzeSource {
    /// Pasted conversation text
    Text {
        /// Conversation text (default: read --file or stdin)
        text: Option<String>,
        /// Read the conversation from a text file
        #[arg(long, conflicts_with = "text")]
        file: Option<PathBuf>,
        #[command(flatten)]
        options: AnalyzeArgs,
    },

    /// Screenshots (up to 4, in reading order), a recording or a text export
    Upload {
        #[arg(required = true, num_args = 1..)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        options: AnalyzeArgs,
    },
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Preset id (default: the selected preset)
    #[arg(long)]
    preset: Option<String>,
    /// Ignore the selected preset
    #[arg(long, conflicts_with = "preset")]
    no_preset: bool,
    /// Sampling temperature, 0.0 to 1.0
    #[arg(long)]
    temperature: Option<f32>,
    /// Extra instructions for the analysis
    #[arg(long)]
    prompt: Option<String>,
}

#[derive(Subcommand)]
pub enum HistoryCommand {
    /// List past analyses
    List {
        /// Search titles and emotions
        #[arg(short, long)]
        search: Option<String>,
        /// Score band (all, high, medium, low)
        #[arg(short, long, default_value = "all")]
        band: ScoreBand,
        /// Sort order (date, score, messages)
        #[arg(long, default_value = "date")]
        sort: HistorySort,
    },

    /// Show one analysis
    Show { id: String },

    /// Delete one analysis
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum PresetsCommand {
    /// List presets
    List,
    /// Show one preset
    Show { id: String },
    /// Use a preset for the next analyses
    Select {
        id: String,
        /// Override the preset temperature
        #[arg(long)]
        temperature: Option<f32>,
    },
    /// Cards every report contains
    Cards,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.url = url.clone();
    }
    if cli.demo {
        config.api.demo_mode = true;
    }

    init_logging(&config.logging);

    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("Wrote {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let store = Arc::new(FileStore::open(config.store_path()));
    let session = Arc::new(Session::restore(store)?);
    let preferences = Preferences::new(session.store());
    let client = ApiClient::new(config.client_config(), Arc::clone(&session))?
        .with_unauthorized_handler(|| {
            eprintln!("Your session has expired. Run `gossipai login` to sign in again.");
        });

    tracing::debug!(base_url = %client.base_url(), "Using analysis service");

    run(cli, &client, &preferences).await
}

fn init_logging(config: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("gossipai={}", config.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli, client: &ApiClient, preferences: &Preferences) -> anyhow::Result<()> {
    let format = cli.format;

    match cli.command {
        Commands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };
            let response = client.login(&email, &password).await?;
            match response.user {
                Some(user) => println!("Logged in as {} <{}>", user.name, user.email),
                None => println!("Logged in as {}", email),
            }
        }

        Commands::Register {
            email,
            name,
            password,
        } => {
            let password = match password {
                Some(p) => p,
                None => prompt("Password")?,
            };
            let response = client.register(&email, &password, &name).await?;
            println!("{}", response.message);
            if response.access_token.is_none() {
                println!("Confirm your email, then run `gossipai login {}`.", email);
            }
        }

        Commands::Logout => {
            client.logout()?;
            println!("Logged out");
        }

        Commands::Whoami => {
            if !client.session().is_authenticated() {
                bail!("Not logged in. Run `gossipai login <email>` first.");
            }
            let user = client.current_user().await?;
            match format {
                OutputFormat::Json => print_json(&user)?,
                OutputFormat::Table => {
                    println!("Name:  {}", user.name);
                    println!("Email: {}", user.email);
                    println!("ID:    {}", user.id);
                }
            }
        }

        Commands::Analyze { source } => {
            let submission = build_submission(source, preferences).await?;
            let tracker = ProgressTracker::new();
            let printer = watch_progress(&tracker);

            let outcome = client.analyze(&submission, &tracker).await;
            drop(tracker);
            // The printer exits once the channel closes
            let _ = printer.await;

            let outcome = outcome?;
            note_demo(&outcome);
            print_analysis(format, outcome.get())?;
        }

        Commands::History { command } => match command {
            HistoryCommand::List { search, band, sort } => {
                let outcome = client.history().await?;
                note_demo(&outcome);

                let mut filter = HistoryFilter::new().band(band).sort(sort);
                if let Some(search) = search {
                    filter = filter.query(search);
                }
                let items = filter.apply(outcome.get());

                match format {
                    OutputFormat::Json => print_json(&items)?,
                    OutputFormat::Table => print_history_table(&items),
                }
            }
            HistoryCommand::Show { id } => {
                let detail = client.history_detail(&id).await?;
                match format {
                    OutputFormat::Json => print_json(&detail)?,
                    OutputFormat::Table => {
                        println!("{} ({}, {})", detail.title, detail.date, detail.file_type);
                        println!();
                        println!("{}", gossipai::report::render(&detail.analysis_results));
                    }
                }
            }
            HistoryCommand::Delete { id } => {
                let response = client.delete_history_item(&id).await?;
                if response.message.is_empty() {
                    println!("Deleted {}", id);
                } else {
                    println!("{}", response.message);
                }
            }
        },

        Commands::Presets { command } => match command {
            PresetsCommand::List => {
                let outcome = client.presets().await?;
                note_demo(&outcome);
                let selected = preferences.selected_preset()?;

                match format {
                    OutputFormat::Json => print_json(outcome.get())?,
                    OutputFormat::Table => print_presets_table(outcome.get(), selected.as_deref()),
                }
            }
            PresetsCommand::Show { id } => {
                let preset = client.preset(&id).await?;
                match format {
                    OutputFormat::Json => print_json(&preset)?,
                    OutputFormat::Table => print_preset(&preset),
                }
            }
            PresetsCommand::Select { id, temperature } => {
                let outcome = client.presets().await?;
                note_demo(&outcome);
                let Some(preset) = outcome.get().iter().find(|p| p.id == id) else {
                    bail!("Unknown preset: {}", id);
                };

                preferences.select_preset(preset)?;
                if let Some(temperature) = temperature {
                    preferences.set_temperature(temperature)?;
                }
                let temperature = preferences.temperature()?.unwrap_or(preset.temperature);
                println!(
                    "Selected {} {} (temperature {:.2})",
                    preset.icon, preset.name, temperature
                );
            }
            PresetsCommand::Cards => {
                let cards = client.standard_cards().await?;
                match format {
                    OutputFormat::Json => print_json(&cards)?,
                    OutputFormat::Table => {
                        println!("{:<24} {:<28} {}", "ID", "Name", "Description");
                        println!("{}", "-".repeat(80));
                        for card in cards {
                            println!(
                                "{:<24} {:<28} {}",
                                card.id,
                                format!("{} {}", card.icon, card.name),
                                card.description
                            );
                        }
                    }
                }
            }
        },

        Commands::Suggest { id, text, context } => {
            let conversation = match (id, text) {
                (Some(id), _) => client.history_detail(&id).await?.analysis_results.digest(),
                (None, Some(text)) => text,
                (None, None) => bail!("Pass --id <history id> or --text <conversation>"),
            };

            let outcome = client
                .suggested_responses(&conversation, context.as_deref())
                .await?;
            note_demo(&outcome);

            match format {
                OutputFormat::Json => print_json(outcome.get())?,
                OutputFormat::Table => {
                    for (i, suggestion) in outcome.get().iter().enumerate() {
                        println!("{}. {}", i + 1, suggestion.text);
                        if !suggestion.reason.is_empty() {
                            println!("   {}", suggestion.reason);
                        }
                    }
                }
            }
        }

        Commands::Chat {
            message,
            conversation,
        } => {
            let outcome = client.chat(&message, conversation.as_deref()).await?;
            note_demo(&outcome);
            println!("{}", outcome.get());
        }

        // Handled before the client is built
        Commands::Config { .. } => {}
    }

    Ok(())
}

async fn build_submission(
    source: AnalyzeSource,
    preferences: &Preferences,
) -> anyhow::Result<Submission> {
    match source {
        AnalyzeSource::Text {
            text,
            file,
            options,
        } => {
            let text = match (text, file) {
                (Some(text), _) => text,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("reading {}", path.display()))?,
                (None, None) => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            if text.trim().is_empty() {
                bail!("Nothing to analyze: the conversation is empty");
            }

            let options = analysis_options(options, preferences)?;
            Ok(Submission::Text(
                TextAnalysisRequest::new(text).with_options(options),
            ))
        }

        AnalyzeSource::Upload { files, options } => {
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(UploadFile::from_path(path).await?);
            }
            let options = analysis_options(options, preferences)?;

            if uploads.len() == 1 {
                if let Some(file) = uploads.pop() {
                    return Ok(Submission::File(file, options));
                }
            }
            Ok(Submission::Batch(UploadBatch::try_from(uploads)?, options))
        }
    }
}

/// Command-line options, falling back to the saved preset and temperature
fn analysis_options(
    args: AnalyzeArgs,
    preferences: &Preferences,
) -> anyhow::Result<AnalysisOptions> {
    let preset_id = match args.preset {
        Some(id) => Some(id),
        None if args.no_preset => None,
        None => preferences.selected_preset()?,
    };

    let temperature = match args.temperature {
        Some(t) if !(0.0..=1.0).contains(&t) => {
            bail!("Temperature must be between 0.0 and 1.0, got {}", t)
        }
        Some(t) => Some(t),
        None if preset_id.is_some() => preferences.temperature()?,
        None => None,
    };

    Ok(AnalysisOptions {
        additional_prompt: args.prompt,
        preset_id,
        temperature,
    })
}

/// Print stage changes to stderr until the tracker is dropped
fn watch_progress(tracker: &ProgressTracker) -> tokio::task::JoinHandle<()> {
    let mut rx = tracker.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let progress = rx.borrow_and_update().clone();
            let stage = progress.stage();
            match (stage, progress.fraction()) {
                (Stage::Idle, _) => continue,
                (Stage::Failed, _) => eprintln!(
                    "[ -- ] {}: {}",
                    stage.label(),
                    progress.failure().unwrap_or("unknown error")
                ),
                (_, Some(fraction)) => {
                    eprintln!("[{:>3}%] {}", (fraction * 100.0).round() as u32, stage.label())
                }
                (_, None) => eprintln!("[ .. ] {}", stage.label()),
            }
        }
    })
}

/// Stderr note for substituted data; demo mode covers 5xx and bad bodies too
fn demo_note<T>(outcome: &Outcome<T>) -> Option<&'static str> {
    outcome
        .is_demo()
        .then_some("Note: the analysis service failed; showing demo data.")
}

fn note_demo<T>(outcome: &Outcome<T>) {
    if let Some(note) = demo_note(outcome) {
        eprintln!("{}", note);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_analysis(format: OutputFormat, result: &AnalysisResult) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => print_json(result),
        OutputFormat::Table => {
            println!("{}", gossipai::report::render(result));
            Ok(())
        }
    }
}

fn print_history_table(items: &[HistoryItem]) {
    if items.is_empty() {
        println!("No analyses match.");
        return;
    }

    println!(
        "{:<10} {:<12} {:<28} {:<12} {:>5} {:>6}",
        "ID", "Date", "Title", "Emotion", "Score", "Msgs"
    );
    println!("{}", "-".repeat(78));

    for item in items {
        let date = item
            .parsed_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<10} {:<12} {:<28} {:<12} {:>5} {:>6}",
            truncate(&item.id, 10),
            date,
            truncate(&item.title, 28),
            truncate(&item.dominant_emotion, 12),
            item.overall_score,
            item.message_count
        );
    }
}

fn print_presets_table(presets: &[Preset], selected: Option<&str>) {
    println!("  {:<24} {:<28} {:>5}", "ID", "Name", "Temp");
    println!("{}", "-".repeat(62));
    for preset in presets {
        let marker = if Some(preset.id.as_str()) == selected { "*" } else { " " };
        println!(
            "{} {:<24} {:<28} {:>5.2}",
            marker,
            preset.id,
            truncate(&format!("{} {}", preset.icon, preset.name), 28),
            preset.temperature
        );
    }
}

fn print_preset(preset: &Preset) {
    println!("{} {} ({})", preset.icon, preset.name, preset.id);
    println!("{}", preset.description);
    println!();
    if let Some(audience) = &preset.target_audience {
        println!("Audience:    {}", audience);
    }
    if let Some(style) = &preset.report_style {
        println!("Style:       {}", style.join(", "));
    }
    if let Some(focus) = &preset.focus_analysis {
        println!("Focus:       {}", focus.join(", "));
    }
    println!("Temperature: {:.2}", preset.temperature);

    if !preset.cards().is_empty() {
        println!();
        println!("Cards:");
        for card in preset.cards() {
            println!("  {} {}: {}", card.icon, card.name, card.description);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}: ", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_note_only_for_substituted_data() {
        assert_eq!(demo_note(&Outcome::Live(1)), None);

        let note = demo_note(&Outcome::Demo(1)).unwrap();
        assert!(note.contains("service failed"));
        assert!(!note.contains("unreachable"));
    }
}
