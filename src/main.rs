mod app;
mod assets;
mod cli;
mod config;
mod error;
mod feed;
mod motion;
mod perimeter;
mod platform;
mod present;
mod render;

use clap::Parser;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = cli::Cli::parse();
    log::info!("edgepet starting up, watching {}", cli.target.display());

    if let Err(e) = app::run(cli) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
