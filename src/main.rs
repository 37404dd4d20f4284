use anyhow::Result;
use clap::Parser;
use env_logger::{Builder, Env};
use microftpd::config::Config;
use microftpd::core_cli::Cli;
use microftpd::server;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::parse();

    // Initialize the logger with a custom format
    let default_level = if args.verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    // Load configuration from the TOML file
    let mut config = Config::load_from_file(&args.config)?;

    // Override the control port from CLI if provided
    if let Some(port) = args.port {
        config.server.listen_port = port;
    }

    // Run the FTP server
    server::run(config).await?;

    Ok(())
}
