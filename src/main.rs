mod audio;
mod cli;
mod clipboard;
mod commands;
mod config;
mod content;
mod generator;
mod markup;
mod render;
mod store;

use clap::Parser;

#[tokio::main]
async fn main() {
    env_logger::init();
    log::info!("Post Studio starting");

    let cli = cli::Cli::parse();
    if let Err(e) = commands::run(cli).await {
        log::error!("{e}");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
