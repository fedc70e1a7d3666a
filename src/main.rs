//! Binary entrypoint for the salescoach CLI.
//!
//! Commands:
//! - `init` - create a starter `config.toml`
//! - `profile` - print the persisted profile (optionally as JSON)
//! - `logout` - clear the persisted profile, keeping registry and logs
//! - `registry` - leaderboard of all registry entries, highest XP first
//! - `history <name>` - print recent dialogue sessions for a registry entry
//! - `log events|submissions` - dump the flat audit logs for review
//!
//! The interactive training UI is a separate application; this binary only
//! inspects and bootstraps the local progress store.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use salescoach::config::Config;
use salescoach::progress::ProgressStore;

#[derive(Parser)]
#[command(name = "salescoach")]
#[command(about = "Training core for retail sales staff")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a starter configuration file
    Init,
    /// Show the persisted profile
    Profile {
        /// Emit the profile as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear the persisted profile (registry and audit logs are kept)
    Logout,
    /// List all registry entries as a leaderboard, highest XP first
    Registry,
    /// Show recent dialogue sessions for a registry entry
    History {
        /// Display name to look up
        name: String,
        /// Maximum number of sessions to show
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
    /// Dump an audit log
    Log {
        /// Which log: "events" or "submissions"
        which: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.command {
        Commands::Init => None,
        _ => Some(Config::load(&cli.config).await?),
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init => {
            Config::create_default(&cli.config).await?;
            println!("Wrote starter configuration to {}", cli.config);
        }
        Commands::Profile { json } => {
            let store = open_store(&config)?;
            let Some(profile) = store.load_profile()? else {
                println!("No profile yet - nobody has logged in on this device.");
                return Ok(());
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                println!("{} - {} @ {}", profile.name, profile.position, profile.store);
                println!(
                    "Level: {}  XP: {}  Modules: {}",
                    profile.level.label(),
                    profile.xp,
                    profile.modules_completed
                );
                if !profile.achievements.is_empty() {
                    println!("Achievements: {}", profile.achievements.join(", "));
                }
            }
        }
        Commands::Logout => {
            let store = open_store(&config)?;
            store.clear_profile()?;
            println!("Profile cleared. Registry and audit logs are untouched.");
        }
        Commands::Registry => {
            let store = open_store(&config)?;
            let mut entries = store.registry_entries()?;
            entries.sort_by(|a, b| b.xp.cmp(&a.xp));
            if entries.is_empty() {
                println!("Registry is empty.");
            }
            for (rank, entry) in entries.iter().enumerate() {
                println!(
                    "{:>3}. {}  {}  XP: {}  ({} sessions)",
                    rank + 1,
                    entry.name,
                    entry.level_label,
                    entry.xp,
                    entry.last_sessions.len()
                );
            }
        }
        Commands::History { name, limit } => {
            let store = open_store(&config)?;
            let Some(entry) = store.registry_entry(&name)? else {
                println!("No registry entry for '{}'.", name);
                return Ok(());
            };
            println!(
                "{} - {}  XP: {}  ({} sessions on record)",
                entry.name,
                entry.level_label,
                entry.xp,
                entry.last_sessions.len()
            );
            for record in entry.last_sessions.iter().take(limit) {
                let outcome = if record.left { "left" } else { "completed" };
                println!(
                    "  {}  {}  {}  score {:+}",
                    record.date.format("%Y-%m-%d %H:%M"),
                    record.product,
                    outcome,
                    record.score
                );
            }
        }
        Commands::Log { which } => {
            let store = open_store(&config)?;
            match which.as_str() {
                "events" => {
                    for event in store.learning_events()? {
                        println!(
                            "{}  {:+}",
                            event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            event.xp_delta
                        );
                    }
                }
                "submissions" => {
                    for record in store.submissions()? {
                        println!(
                            "{}  [{}] Q: {} A: {}",
                            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
                            record.user_name,
                            record.question,
                            record.response
                        );
                    }
                }
                other => return Err(anyhow!("unknown log '{}': use events or submissions", other)),
            }
        }
    }

    Ok(())
}

fn open_store(config: &Option<Config>) -> Result<ProgressStore> {
    let config = config
        .as_ref()
        .ok_or_else(|| anyhow!("configuration not loaded"))?;
    let store = ProgressStore::open(&config.storage.data_dir)?;
    info!("opened progress store at {}", config.storage.data_dir);
    Ok(store)
}

/// Initialize env_logger honoring config level plus -v/-vv overrides.
/// Timestamps are suppressed when stdout is not a TTY (e.g. under systemd,
/// which adds its own).
fn init_logging(config: &Option<Config>, verbose: u8) {
    let base_level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let level = match verbose {
        0 => base_level,
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if !atty::is(atty::Stream::Stdout) {
        builder.format_timestamp(None);
    }
    let _ = builder.try_init();
}
