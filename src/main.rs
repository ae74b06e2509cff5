use anyhow::Context;
use clap::Parser;
use surf_forecast::config::LogFormat;
use surf_forecast::core::{dry_run, ConfigProvider};
use surf_forecast::utils::error::{ErrorSeverity, ForecastError};
use surf_forecast::utils::logger;
use surf_forecast::{CliConfig, EtlEngine, ForecastPipeline, LocalStorage, OpenMeteoClient};

fn exit_code(e: &ForecastError) -> i32 {
    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(stage: &str, e: &ForecastError) {
    tracing::error!(
        "❌ {} failed: {} (Category: {:?}, Severity: {:?})",
        stage,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    match cli.log_format {
        LogFormat::Text => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("🌊 Starting surf-forecast");
    tracing::debug!("CLI config: {:?}", cli);

    let settings = match cli.resolve() {
        Ok(settings) => settings,
        Err(e) => {
            report_failure("Configuration", &e);
            std::process::exit(exit_code(&e));
        }
    };

    let client = OpenMeteoClient::from_config(&settings);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no requests will be made");
        let report = dry_run::report(&settings, &client).context("building the dry-run report")?;
        println!("{}", report);
        return Ok(());
    }

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(settings.output_path());
    let pipeline = ForecastPipeline::new(storage, settings, client);
    let engine = EtlEngine::new_with_monitoring(pipeline, cli.monitor);

    match engine.run().await {
        Ok(summary) => {
            for file in &summary.written {
                println!("✅ Created: {}/{}", summary.output_path, file);
            }
            if !summary.has_changes() {
                println!("No changes in {}", summary.output_path);
            }
            Ok(())
        }
        Err(e) => {
            report_failure("Forecast run", &e);
            std::process::exit(exit_code(&e));
        }
    }
}
