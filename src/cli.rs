use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "webbot",
    about = "Self-learning web automation: compiles plain-English tasks into reusable browser programs"
)]
pub struct Cli {
    /// Path of the task cache database
    #[arg(long, default_value = "webbot.db")]
    pub db: PathBuf,

    /// Directory for saved program files
    #[arg(long, default_value = "generated_programs")]
    pub programs_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a task, run it in a browser session, and record the outcome
    Run {
        /// Base website URL to open first (blank to skip)
        #[arg(short, long, default_value = "")]
        url: String,

        /// The task, in plain English
        #[arg(short, long)]
        task: String,

        /// Run the browser headless
        #[arg(long)]
        headless: bool,

        /// Reuse the cached program for this exact task text, if one exists.
        /// Without this flag a cache hit is reported but the program is
        /// regenerated.
        #[arg(long)]
        reuse: bool,

        /// Save the synthesized program even when the run fails
        #[arg(long)]
        save_failed: bool,

        /// WebDriver server address
        #[arg(long, default_value = "http://localhost:4444")]
        webdriver: String,
    },

    /// Parse and synthesize only; print the plan and the program listing
    Plan {
        /// Base website URL to open first (blank to skip)
        #[arg(short, long, default_value = "")]
        url: String,

        /// The task, in plain English
        #[arg(short, long)]
        task: String,
    },

    /// Show cached statistics for a task
    Show {
        /// The exact task text to look up
        #[arg(short, long)]
        task: String,
    },
}
