use std::path::Path;

use clap::{Parser, Subcommand};

mod discord;
mod error;
mod host;
mod reset;
mod settings;
mod throttle;

pub use error::{AppError, Result};
pub use host::{ChannelHost, ChannelKind, ChannelRef, HostError, MessageRef};
pub use reset::{
    ChannelGroups, ChannelReport, OpStatus, PurgeReport, PurgeStatus, ResetEngine, ResetReport,
    ResetScope, DONE_MARK,
};
pub use settings::Settings;

use discord::DiscordHost;

#[derive(Parser)]
#[command(name = "discord-reset")]
#[command(about = "Reset Discord channel groups: purge history and toggle the done marker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Reset a week group: clears the special channels, strips the done
    /// marker and purges the selected week's channels
    Reset {
        /// Week group to clear: a configured key like "1" or "2", or "all"
        #[arg(short, long, default_value = "all")]
        week: String,

        /// Config file path
        #[arg(short, long, default_value = settings::SETTINGS_FILE)]
        config: String,

        /// Print the per-channel report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Add the done marker to one channel's name
    MarkDone {
        /// Channel ID
        #[arg(long)]
        channel: u64,

        /// Config file path
        #[arg(short, long, default_value = settings::SETTINGS_FILE)]
        config: String,
    },

    /// Remove the done marker from one channel's name
    StripMark {
        /// Channel ID
        #[arg(long)]
        channel: u64,

        /// Config file path
        #[arg(short, long, default_value = settings::SETTINGS_FILE)]
        config: String,
    },
}

pub fn load_token() -> Result<String> {
    std::env::var("DISCORD_TOKEN").map_err(|_| AppError::MissingToken)
}

fn build_engine(config_path: &str) -> Result<ResetEngine<DiscordHost>> {
    let token = load_token()?;
    let settings = Settings::load_from(Path::new(config_path))?;
    let host = DiscordHost::new(&token, settings.guild_id);
    Ok(ResetEngine::new(host, settings.groups()))
}

pub async fn run_reset(week: &str, config_path: &str, json: bool) -> Result<()> {
    let engine = build_engine(config_path)?;

    let scope = ResetScope::parse(week);
    if let ResetScope::Week(key) = &scope
        && !engine.groups().has_week(key)
    {
        return Err(AppError::UnknownWeek(key.clone()));
    }

    println!("Resetting week: {}...", week);

    let report = engine.run(&scope).await;

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::JsonSerialize(e.to_string()))?;
        println!("{}", rendered);
    } else {
        print_report(&report);
    }

    Ok(())
}

pub async fn run_mark_done(channel: u64, config_path: &str) -> Result<()> {
    let engine = build_engine(config_path)?;

    match engine.mark_channel(channel).await {
        Some(status) => {
            println!("{}", marker_outcome(status, "added"));
            Ok(())
        }
        None => Err(AppError::ChannelUnavailable(channel)),
    }
}

pub async fn run_strip_mark(channel: u64, config_path: &str) -> Result<()> {
    let engine = build_engine(config_path)?;

    match engine.unmark_channel(channel).await {
        Some(status) => {
            println!("{}", marker_outcome(status, "removed"));
            Ok(())
        }
        None => Err(AppError::ChannelUnavailable(channel)),
    }
}

fn marker_outcome(status: OpStatus, verb: &str) -> String {
    match status {
        OpStatus::Applied => format!("Done marker {}.", verb),
        OpStatus::Unchanged => "Channel name already in the requested state.".to_string(),
        OpStatus::Denied => "Rename denied by the platform; name left as is.".to_string(),
        OpStatus::Failed => "Rename failed; name left as is.".to_string(),
    }
}

fn print_report(report: &ResetReport) {
    for channel in &report.channels {
        let status = match channel.purge.status {
            PurgeStatus::Completed => "done",
            PurgeStatus::AccessDenied => "history access denied",
            PurgeStatus::Interrupted => "interrupted",
        };
        let marker = match channel.marker {
            Some(OpStatus::Applied) => ", marker stripped",
            Some(OpStatus::Denied) => ", marker rename denied",
            Some(OpStatus::Failed) => ", marker rename failed",
            Some(OpStatus::Unchanged) | None => "",
        };
        println!(
            "  #{}: {} deleted, {} skipped ({}{})",
            channel.name,
            channel.purge.deleted(),
            channel.purge.skipped,
            status,
            marker
        );
    }
    println!(
        "Reset complete: {} messages deleted across {} channels.",
        report.total_deleted(),
        report.channels.len()
    );
}
