use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AudioFormat;
use crate::content::{ContentKind, Platform};

/// Content studio: turn a topic into posts, articles, polls, carousels and
/// narrated podcasts.
#[derive(Parser)]
#[command(name = "post-studio", version, about)]
pub struct Cli {
    /// Gemini API key (overrides the config file)
    #[arg(long, env = "GEMINI_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate content for a topic (LinkedIn post, X post and image prompt;
    /// flags add the on-demand kinds)
    Generate {
        topic: String,
        /// Also generate a blog article
        #[arg(long)]
        blog: bool,
        /// Also generate a LinkedIn poll
        #[arg(long)]
        poll: bool,
        /// Also generate a carousel presentation
        #[arg(long)]
        carousel: bool,
        /// Also generate a search-grounded research report
        #[arg(long)]
        report: bool,
        /// Also generate a podcast script
        #[arg(long)]
        podcast: bool,
        /// Generate every on-demand kind
        #[arg(long)]
        all: bool,
        /// Save the bundle to the library
        #[arg(long)]
        save: bool,
        /// Export the rendered bundle as an HTML page
        #[arg(long, value_name = "PATH")]
        html: Option<PathBuf>,
    },

    /// Suggest a 7-day content plan for a theme
    Suggest { topic: String },

    /// Synthesize narrated podcast audio for a saved bundle or a fresh topic
    Narrate {
        /// Saved bundle id (or unique prefix) holding a podcast script
        #[arg(long, conflicts_with = "topic")]
        id: Option<String>,
        /// Generate a fresh script for this topic first
        #[arg(long)]
        topic: Option<String>,
        /// Output file; defaults to the episode title with the configured
        /// format's extension
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage the saved-content library
    Saved {
        #[command(subcommand)]
        command: SavedCommand,
    },

    /// Manage scheduled posts
    Schedule {
        #[command(subcommand)]
        command: ScheduleCommand,
    },

    /// Copy one part of a saved bundle to the clipboard as plain text
    Copy {
        /// Saved bundle id (or unique prefix)
        id: String,
        #[arg(long, value_enum)]
        part: ContentKind,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum SavedCommand {
    /// List saved bundles, newest first
    List,
    /// Print a saved bundle
    Show { id: String },
    /// Edit one part of a saved bundle in $EDITOR
    Edit {
        id: String,
        #[arg(long, value_enum)]
        part: ContentKind,
    },
    /// Delete a saved bundle
    Delete { id: String },
    /// Export a saved bundle as an HTML page
    Export {
        id: String,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum ScheduleCommand {
    /// Queue a saved post for publication
    Add {
        /// Saved bundle id (or unique prefix)
        id: String,
        #[arg(long, value_enum)]
        platform: Platform,
        /// Publication time, RFC 3339 or "YYYY-MM-DDTHH:MM" local; defaults
        /// to the next full hour
        #[arg(long)]
        at: Option<String>,
    },
    /// List scheduled posts in time order
    List,
    /// Unschedule a post
    Remove { id: String },
    /// List posts whose scheduled time has passed
    Due,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the current configuration
    Show,
    /// Store the Gemini API key
    SetKey { key: String },
    /// Set (or, with no path, clear) the intro/outro theme music WAV
    SetTheme { path: Option<PathBuf> },
    /// Choose the narration output format
    SetFormat {
        #[arg(value_enum)]
        format: AudioFormat,
        /// MP3 bitrate in kbps
        #[arg(long)]
        bitrate: Option<u32>,
    },
}
