use clap::{CommandFactory, Parser};

use cli::CliArgs;

mod cli;
mod config;
mod demo;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    if let Some(shell) = args.print_completions {
        let mut cmd = CliArgs::command();
        clap_complete::generate(shell, &mut cmd, "plainbytes-samples", &mut std::io::stdout());
        return Ok(());
    }

    // sets log level filter from environment (or defaults), flags take precedence
    let mut log_builder = env_logger::Builder::from_default_env();
    if let Some(level) = args.get_log_level() {
        log_builder.filter_level(level);
    }
    log_builder.init();

    args.run().await
}
