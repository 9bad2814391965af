use chatapp::core::config;
use chatapp::tui;
use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;

#[derive(Parser)]
#[command(name = "chatapp", about = "Terminal client for the ChatApp project assistant")]
struct Args {
    /// Base URL of the chat service (the client posts to <base-url>/api/chat)
    #[arg(long)]
    base_url: Option<String>,

    /// Seconds to wait for a reply before giving up on an exchange
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger - writes to chatapp.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("chatapp.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}; falling back to defaults", e);
        config::ChatAppConfig::default()
    });
    let resolved = config::resolve(&file_config, args.base_url.as_deref(), args.timeout_secs);

    log::info!(
        "ChatApp starting up against {} (timeout {:?})",
        resolved.base_url,
        resolved.timeout
    );

    tui::run(resolved)
}
