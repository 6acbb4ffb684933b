use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// `Routinely` - turn a goal into a routine and approve its reminders.
#[derive(Parser, Debug)]
#[command(name = "routinely")]
#[command(version)]
#[command(about = "Submit a goal, review the generated routine, approve reminders.", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.routinely/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show whether the configured account may submit a goal
    Eligibility,

    /// Submit a goal and review the generated routine
    Submit {
        /// What you want to achieve, e.g. "lose 5kg in a month"
        goal: String,

        /// Step index to flag for a reminder (repeatable)
        #[arg(long = "notify", value_name = "INDEX")]
        notify: Vec<usize>,

        /// Approve email reminders for the routine
        #[arg(long, conflicts_with = "reject")]
        approve: bool,

        /// Reject email reminders for the routine
        #[arg(long)]
        reject: bool,
    },
}
