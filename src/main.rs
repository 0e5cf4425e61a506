use clap::Parser;
use contact_intake::app::{export::export_csv, server};
use contact_intake::config::cli::{Command, ServeArgs};
use contact_intake::utils::error::{AppError, ErrorSeverity};
use contact_intake::utils::{logger, validation::Validate};
use contact_intake::{Cli, IntakeConfig};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Serve(args) => run_serve(args, cli.verbose).await,
        Command::Export(args) => {
            logger::init_logger("info", cli.verbose, false);
            export_csv(&args.data_file, &args.output)
                .await
                .map(|rows| println!("✅ Exported {} messages to {}", rows, args.output.display()))
        }
        Command::CheckConfig(args) => {
            logger::init_logger("info", cli.verbose, false);
            check_config(&args.config)
        }
    };

    if let Err(e) = outcome {
        // 記錄詳細錯誤信息
        tracing::error!(
            "❌ contact-intake failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run_serve(args: ServeArgs, verbose: bool) -> Result<(), AppError> {
    let mut config = load_config(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    // 初始化日誌
    logger::init_logger(&config.logging.level, verbose, config.logging.json);

    // 驗證配置
    config.validate()?;
    tracing::info!("✅ Configuration loaded and validated successfully");
    if verbose {
        tracing::debug!("Config: {:?}", config);
    }

    server::serve(config).await
}

fn load_config(path: Option<&std::path::Path>) -> Result<IntakeConfig, AppError> {
    match path {
        Some(path) => IntakeConfig::from_file(path),
        None => Ok(IntakeConfig::default()),
    }
}

fn check_config(path: &std::path::Path) -> Result<(), AppError> {
    let config = IntakeConfig::from_file(path)?;
    config.validate()?;
    println!("✅ Configuration is valid");
    display_config_summary(&config);
    Ok(())
}

fn display_config_summary(config: &IntakeConfig) {
    println!("🌐 Bind: {}", config.server.bind);
    println!("📦 Body limit: {} bytes", config.server.body_limit_bytes);
    println!("🗄️  Store: {:?} ({})", config.store.backend, config.store.data_file);
    println!("📝 Log level: {} (json: {})", config.logging.level, config.logging.json);
}
