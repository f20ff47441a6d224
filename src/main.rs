use clap::Parser;
use spec_combiner::core::Pipeline;
use spec_combiner::utils::{logger, validation::Validate};
use spec_combiner::{CliConfig, CombineError, GatewayPipeline, LocalStorage, MergePipeline, SpecEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose);
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting spec-combiner CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let config = match config.load_enum_rewrites().and_then(|config| {
        config.validate()?;
        Ok(config)
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load enum rewrites: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 路徑皆相對於目前目錄
    let storage = LocalStorage::new(".".to_string());
    let merge = MergePipeline::new(storage.clone(), config.clone());
    let gateway = GatewayPipeline::new(storage, config);

    let mut written = match SpecEngine::new_with_monitoring(merge, monitor_enabled).run().await {
        Ok(paths) => paths,
        Err(e) => exit_with(e),
    };

    if gateway.should_execute() {
        match SpecEngine::new_with_monitoring(gateway, monitor_enabled).run().await {
            Ok(paths) => written.extend(paths),
            Err(e) => exit_with(e),
        }
    } else {
        tracing::info!("⏭️ Skipping gateway specs (segment not in gateway segments)");
    }

    tracing::info!("✅ Spec combination completed successfully!");
    println!("✅ Spec combination completed successfully!");
    for path in &written {
        println!("📁 {}", path);
    }

    Ok(())
}

fn exit_with(e: CombineError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Spec combination failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    // 輸出用戶友好的錯誤信息
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code().max(1))
}
