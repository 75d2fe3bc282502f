use clap::{Parser, Subcommand, ValueEnum};
use daybook::Frequency;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "daybook", version, about = "Calendar journal with recurring time blocks")]
pub struct Cli {
    /// Calendar file (overrides the config file)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

/// One line typed into `daybook shell`.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show a day: note, markers, color and the blocks occurring on it
    Day {
        /// Date in YYYY-MM-DD format
        date: String,
    },
    /// List the blocks occurring on consecutive days
    Agenda {
        /// First date (YYYY-MM-DD)
        date: String,
        /// Number of days to show
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Set the note of a day (no text clears it)
    Note {
        date: String,
        #[arg(trailing_var_arg = true, num_args = 0..)]
        text: Vec<String>,
    },
    /// Toggle a marker on a day
    Dot { date: String, category: String },
    /// Set the theme color of a day (no category clears it)
    Color {
        date: String,
        category: Option<String>,
    },
    /// Manage time blocks
    #[command(subcommand)]
    Block(BlockCommand),
    /// Revert the last change made in this session
    Undo,
    /// Re-apply the last undone change
    Redo,
    /// Read commands from stdin, keeping undo history between them
    Shell,
}

#[derive(Subcommand, Debug)]
pub enum BlockCommand {
    /// Add a time block anchored on a date
    Add {
        /// Anchor date (YYYY-MM-DD)
        date: String,
        /// Start time (HH:MM)
        start: String,
        /// End time (HH:MM)
        end: String,
        #[arg(long, default_value = "")]
        title: String,
        #[arg(long, default_value = "focus")]
        category: String,
        /// Repeat the block
        #[arg(long, value_enum)]
        repeat: Option<Repeat>,
        /// Every Nth day/week/month/year
        #[arg(long, default_value_t = 1)]
        every: u32,
        /// Weekdays for weekly repeats, 0=Sunday..6=Saturday (e.g. 1,3,5)
        #[arg(long, value_delimiter = ',')]
        on: Vec<u8>,
        /// Last date a repeat may occur on (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
    },
    /// Remove a time block (and its whole series)
    Rm { id: String },
    /// Edit a time block
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Move the anchor date
        #[arg(long)]
        date: Option<String>,
        /// Stop repeating
        #[arg(long)]
        no_repeat: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Repeat {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<Repeat> for Frequency {
    fn from(repeat: Repeat) -> Self {
        match repeat {
            Repeat::Daily => Frequency::Daily,
            Repeat::Weekly => Frequency::Weekly,
            Repeat::Monthly => Frequency::Monthly,
            Repeat::Yearly => Frequency::Yearly,
        }
    }
}
