mod actions;
mod app;
mod cli;
mod component;
mod config;
mod libs;
mod page;
mod tui;
mod utils;

use app::{App, RootState};
use clap::Parser;
use color_eyre::eyre::Result;
use dotenv::dotenv;
use tracing::info;

#[cfg(not(tarpaulin_include))]
async fn run() -> Result<()> {
    use cli::{ClapSource, Commands};
    use color_eyre::eyre::Context;
    use component::scan_field::ScanFieldOptions;
    use page::scanner::Scanner;

    let args = cli::Cli::parse();

    let config = crate::config::Config::new(Some(ClapSource::new(&args)))
        .context("Error when loading config")?;
    utils::logging::init(&config.config.data_dir)?;

    match &args.command {
        Some(Commands::Validate { code }) => {
            let options = ScanFieldOptions::from_config(&config.scan)
                .context("Error building the validator")?;
            let (accepted, message) = cli::validate_code(&options, code);
            println!("{message}");
            if !accepted {
                std::process::exit(1);
            }
            Ok(())
        }
        None => {
            let tui = tui::Tui::new()?
                .tick_rate(args.tick_rate)
                .frame_rate(args.frame_rate)
                .paste(true)
                .focus_change(true)
                .detect_key_release();

            let mut state = RootState::new(Some(config));
            state.key_release_events = tui.key_release_events();
            info!(
                key_release = state.key_release_events,
                "terminal key release reporting"
            );

            let page = Scanner::new(&state)?;
            let mut app = App::new(state, Box::new(page), tui.into());
            app.run().await?;

            let state = &app.state;
            if let Some(report) = libs::history::report(&state.accepted, state.config.config.output)? {
                println!("{report}");
            }
            Ok(())
        }
    }
}

#[tokio::main]
#[cfg(not(tarpaulin_include))]
async fn main() -> Result<()> {
    dotenv().ok();
    utils::errors::init()?;

    run().await
}
