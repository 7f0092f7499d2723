// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Init, Keys, Login, Paste, Register, Version};
use dropkey::logging::init_logging;
use dropkey::state::{AppConfig, AppState};
use tracing::level_filters::LevelFilter;

command_enum! {
    (Init, Init),
    (Register, Register),
    (Login, Login),
    (Paste, Paste),
    (Keys, Keys),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // An uninitialized directory is fine here; ops that need it report it
    let config = AppState::load(args.config_path.clone())
        .map(|state| state.config)
        .unwrap_or_else(|_| AppConfig::default());

    let level = config.log_level().unwrap_or_else(|e| {
        eprintln!("Warning: {}, using warn", e);
        LevelFilter::WARN
    });
    init_logging(level);

    // Resolve remote URL: explicit flag > config remote
    let remote = cli::op::resolve_remote(args.remote, &config);

    let ctx = match cli::op::OpContext::new(remote, &config, args.config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: Failed to create API client: {}", e);
            std::process::exit(1);
        }
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
