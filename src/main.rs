mod api;
mod binning;
mod dashboard;
mod dataset;
mod report;
mod sentiment;
mod settings;
mod stats;
mod web;

use std::process::exit;

use anyhow::Result;
use clap::Parser;
use dashboard::Dashboard;
use report::Report;
use settings::{Args, Command, Settings};
use tracing::{error, warn, Level};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let settings = match Settings::load(args.config.as_deref(), args.input.as_deref()) {
        Ok(ret) => ret,
        Err(error) => {
            eprintln!("Problem while loading settings. {error}");
            exit(1);
        }
    };

    init_tracing(&settings.log.level);

    if let Err(error) = run(args.command, settings).await {
        error!("{error:#}");
        exit(1);
    }
}

async fn run(command: Command, settings: Settings) -> Result<()> {
    let dashboard = Dashboard::load(&settings)?;
    match command {
        Command::Report { output, format } => {
            Report::build(&dashboard).write(format, output.as_deref())
        }
        Command::Serve => {
            web::serve(api::schema(dashboard), settings.web.address).await;
            Ok(())
        }
    }
}

fn init_tracing(level: &str) {
    let parsed = level.parse::<Level>().ok();
    tracing_subscriber::fmt()
        .with_max_level(parsed.unwrap_or(Level::INFO))
        .with_writer(std::io::stderr)
        .init();
    if parsed.is_none() {
        warn!("Unknown log level {level:?}, using info");
    }
}
