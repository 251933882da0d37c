//! Command line parameters of the samples binary.
//!
//! [CliArgs::run] merges command line flags into the [SamplesConfig] and dispatches to
//! the demo selected by the subcommand.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SamplesConfig;
use crate::demo;

/// Command line arguments to the samples binary.
///
/// Used for parsing with [clap].
#[derive(Parser, Debug)]
#[command(author, version, about, long_about, arg_required_else_help = true)]
pub struct CliArgs {
    /// Lowest log level to show
    #[arg(long = "log-level", value_name = "LOG_LEVEL", group = "log-level")]
    log_level: Option<log::LevelFilter>,

    /// Show verbose log output; sets log level to "info"
    #[arg(short, long, group = "log-level")]
    verbose: bool,

    /// Show less log output; sets log level to "warn"
    #[arg(short, long, group = "log-level")]
    quiet: bool,

    /// TOML file with settings for the demos
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// The subcommand to be invoked
    #[command(subcommand)]
    pub command: Option<CliCommand>,

    /// Generate completion file for a shell
    #[clap(long, value_name = "shell")]
    pub print_completions: Option<clap_complete::Shell>,
}

/// Demo selected on the command line
#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Walk a cancelable asynchronous sequence of numbers
    ///
    /// Every processed element is printed as `#N`; a final line reports whether the
    /// sequence completed or was canceled.
    Sequence {
        /// Number of elements, starting at zero
        #[arg(long)]
        count: Option<u32>,

        /// Request cancellation once this element was processed
        #[arg(long, value_name = "N")]
        cancel_at: Option<u32>,

        /// Delay before each element is produced
        #[arg(long, value_name = "MS")]
        step_delay_ms: Option<u64>,

        /// Request cancellation from a timer after the given time
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,

        /// Only process even elements
        #[arg(long)]
        even_only: bool,
    },

    /// Print the canonical names of type expressions such as `Dictionary`2<String, Int32>`
    TypeName {
        /// Type expressions; names of a few Rust types are shown if none are given
        expressions: Vec<String>,
    },
}

impl CliArgs {
    /// returns the log level filter set by CLI args
    /// returns `None` if the user did not specify any log level filter via CLI
    pub fn get_log_level(&self) -> Option<log::LevelFilter> {
        if self.verbose {
            return Some(log::LevelFilter::Info);
        }
        if self.quiet {
            return Some(log::LevelFilter::Warn);
        }
        self.log_level
    }

    /// Load the configuration file (if any) and apply the command line on top of it
    pub fn load_config(&self) -> anyhow::Result<SamplesConfig> {
        let mut cfg = match &self.config {
            Some(path) => SamplesConfig::load(path)?,
            None => SamplesConfig::default(),
        };
        self.apply_to_config(&mut cfg);
        Ok(cfg)
    }

    /// Merge command line parameters into the configuration
    pub fn apply_to_config(&self, cfg: &mut SamplesConfig) {
        match &self.command {
            Some(CliCommand::Sequence {
                count,
                cancel_at,
                step_delay_ms,
                timeout_ms,
                even_only,
            }) => {
                let seq = &mut cfg.sequence;
                seq.count = count.unwrap_or(seq.count);
                seq.cancel_at = cancel_at.or(seq.cancel_at);
                seq.step_delay_ms = step_delay_ms.unwrap_or(seq.step_delay_ms);
                seq.timeout_ms = timeout_ms.or(seq.timeout_ms);
                seq.even_only |= *even_only;
            }
            Some(CliCommand::TypeName { expressions }) => {
                cfg.type_names.extend(expressions.iter().cloned());
            }
            None => {}
        }
    }

    /// Run the selected demo
    pub async fn run(self) -> anyhow::Result<()> {
        let cfg = self.load_config()?;
        match self.command {
            Some(CliCommand::Sequence { .. }) => demo::sequence(&cfg.sequence).await,
            Some(CliCommand::TypeName { .. }) => demo::type_names(&cfg.type_names),
            None => Ok(()), // clap prints help if no command is given
        }
    }
}
