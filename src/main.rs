use anyhow::Context;
use clap::Parser;
use sales_analytics::utils::{logger, validation::Validate};
use sales_analytics::{report, AnalyticsEngine, ApiSubmitter, AppConfig, CliConfig, ProductCatalog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose);
    tracing::info!("Starting sales-analytics pipeline");

    // 載入並驗證配置
    let config = match AppConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load configuration '{}': {}", cli.config, e);
            eprintln!("❌ {}", e);
            std::process::exit(3);
        }
    };
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(3);
    }

    let input_path = cli.input.clone().unwrap_or_else(|| config.input.path.clone());
    let raw = std::fs::read_to_string(&input_path)
        .with_context(|| format!("failed to read ledger file: {}", input_path))?;

    // CLI 過濾參數覆蓋配置檔
    let mut filter = config.sale_filter();
    if cli.region.is_some() {
        filter.region = cli.region.clone();
    }
    if cli.min_amount.is_some() {
        filter.min_amount = cli.min_amount;
    }
    if cli.max_amount.is_some() {
        filter.max_amount = cli.max_amount;
    }

    // 組裝管線
    let submitter = ApiSubmitter::new(config.api.clone());
    let mut engine = AnalyticsEngine::new(config.parser_options(), filter, submitter);
    if let Some(catalog_config) = &config.catalog {
        engine = engine.with_catalog(ProductCatalog::new(catalog_config.clone()));
    }

    let run = engine.run(&raw).await;

    // 輸出報表與補充資料
    let report_text = report::render_report(&run);
    report::write_report(&config.output.report_path, &report_text)?;
    tracing::info!("📁 Report saved to: {}", config.output.report_path);

    if let Some(enriched_path) = &config.output.enriched_path {
        if !run.enriched.is_empty() {
            report::write_enriched(enriched_path, &run.enriched)?;
            tracing::info!("📁 Enriched data saved to: {}", enriched_path);
        }
    }

    if run.valid_records() == 0 {
        tracing::error!("❌ No valid records found in '{}'", input_path);
        eprintln!("❌ No valid records to process");
        std::process::exit(2);
    }

    if !run.submission.success {
        eprintln!(
            "❌ Submission failed after {} attempt(s)",
            run.submission.attempts
        );
        std::process::exit(1);
    }

    tracing::info!("✅ Pipeline completed successfully");
    println!("✅ Pipeline completed successfully");
    println!("📁 Report saved to: {}", config.output.report_path);

    Ok(())
}
