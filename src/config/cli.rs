use crate::config::{IntakeConfig, StoreBackend};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "contact-intake")]
#[command(about = "Contact form intake service for the portfolio site")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP intake endpoint
    Serve(ServeArgs),
    /// Dump a JSONL message store to CSV
    Export(ExportArgs),
    /// Load and validate a configuration file without starting anything
    CheckConfig(CheckConfigArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override server.bind
    #[arg(long)]
    pub bind: Option<String>,

    /// Override store.backend
    #[arg(long, value_enum)]
    pub store: Option<StoreBackend>,

    /// Override store.data_file
    #[arg(long)]
    pub data_file: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,
}

impl ServeArgs {
    /// 應用命令列覆蓋設定
    pub fn apply_overrides(&self, config: &mut IntakeConfig) {
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(backend) = self.store {
            config.store.backend = backend;
        }
        if let Some(data_file) = &self.data_file {
            config.store.data_file = data_file.clone();
        }
        if self.json_logs {
            config.logging.json = true;
        }
    }
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// JSONL data file to read
    #[arg(long, default_value = "./data/contact_messages.jsonl")]
    pub data_file: PathBuf,

    /// CSV file to write
    #[arg(short, long, default_value = "contact_messages.csv")]
    pub output: PathBuf,
}

#[derive(Debug, Args)]
pub struct CheckConfigArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides_replace_file_values() {
        let cli = Cli::parse_from([
            "contact-intake",
            "serve",
            "--bind",
            "0.0.0.0:9000",
            "--store",
            "memory",
            "--json-logs",
        ]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve command");
        };

        let mut config = IntakeConfig::default();
        args.apply_overrides(&mut config);
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert!(config.logging.json);
    }

    #[test]
    fn test_export_defaults() {
        let cli = Cli::parse_from(["contact-intake", "-v", "export"]);
        assert!(cli.verbose);
        let Command::Export(args) = cli.command else {
            panic!("expected export command");
        };
        assert_eq!(args.output, PathBuf::from("contact_messages.csv"));
    }
}
