use crate::constants::DEFAULT_CONFIG_PATH;
use clap::Parser;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "microftpd", about = "A small sandboxed FTP server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Override the control port from the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Enable verbose mode
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_overrides() {
        let cli = Cli::parse_from(["microftpd"]);
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert_eq!(cli.port, None);
        assert!(!cli.verbose);

        let cli = Cli::parse_from(["microftpd", "-c", "/tmp/ftp.toml", "--port", "2121", "-v"]);
        assert_eq!(cli.config, "/tmp/ftp.toml");
        assert_eq!(cli.port, Some(2121));
        assert!(cli.verbose);
    }
}
