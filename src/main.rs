use aem::cli::{Cli, CommandHandler};
use aem::infrastructure::config::Config;
use aem::infrastructure::logging::init_logging;
use clap::Parser;
use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    if cli.debug {
        config.debug = true;
    }
    init_logging(config.debug);
    log::debug!("config file: {}", config.config_path().display());

    let handler = match CommandHandler::new(config) {
        Ok(handler) => handler,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = handler.handle_command(cli.command).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
