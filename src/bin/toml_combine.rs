use clap::Parser;
use spec_combiner::app::pipelines::merge_pipeline::merged_stem;
use spec_combiner::utils::{logger, validation::Validate};
use spec_combiner::{
    CombineError, GatewayPipeline, LocalStorage, MergePipeline, PipelineSequence, PublishPipeline,
    TomlConfig,
};

#[derive(Parser)]
#[command(name = "toml-combine")]
#[command(about = "Spec combiner driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "combine.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override selected segments from config (comma separated)
    #[arg(long, env = "API_SEGMENT", value_delimiter = ',')]
    segment: Vec<String>,

    /// Dry run - show what would be produced without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based spec combiner");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    let config = config.with_segments(args.segment.clone());

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No files will be written");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(".".to_string());
    let mut sequence = PipelineSequence::new(config.project.name.clone())
        .with_monitoring(monitor_enabled);
    sequence.add_pipeline(Box::new(MergePipeline::new(storage.clone(), config.clone())));
    sequence.add_pipeline(Box::new(GatewayPipeline::new(storage.clone(), config.clone())));
    sequence.add_pipeline(Box::new(PublishPipeline::new(storage, config)));

    match sequence.execute_all().await {
        Ok(results) => {
            let summary = PipelineSequence::get_execution_summary(&results);
            tracing::info!("✅ Spec combination completed successfully!");
            println!("✅ Spec combination completed successfully!");
            for result in &results {
                for path in &result.output_paths {
                    println!("📁 [{}] {}", result.pipeline_name, path);
                }
            }
            println!("📊 Execution summary:");
            let mut keys: Vec<&String> = summary.keys().collect();
            keys.sort();
            for key in keys {
                println!("  {}: {}", key, summary[key]);
            }
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

fn exit_with(e: CombineError) -> ! {
    tracing::error!(
        "❌ Spec combination failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code().max(1))
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    match &config.project.version {
        Some(version) => println!("  Project: {} v{}", config.project.name, version),
        None => println!("  Project: {}", config.project.name),
    }
    println!("  Input: {}", config.sources.input_dir);
    println!("  Services: {}", config.sources.services.join(", "));
    println!("  Segments: {}", config.segments.selected.join(", "));
    println!("  Gateway Segments: {}", config.segments.gateway.join(", "));
    println!("  Strict References: {}", config.references.strict);

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📥 Inputs:");
    for service in &config.sources.services {
        println!("  {}/{}.json", config.sources.input_dir, service);
    }

    println!();
    println!("💾 Outputs:");
    println!(
        "  {}/{}.json",
        config.output.merged_dir,
        merged_stem(&config.segments.selected)
    );

    for segment in config.segments.selected.iter().filter(|segment| {
        config
            .segments
            .gateway
            .iter()
            .any(|gateway| gateway.eq_ignore_ascii_case(segment))
    }) {
        for service in &config.sources.services {
            println!(
                "  {}/{}_{}.json",
                config.output.gateway_dir,
                segment.to_lowercase(),
                service.to_lowercase()
            );
        }
    }

    if let Some(publish) = &config.publish {
        println!("  {}/{}", config.output.complete_dir, publish.output_file);
    }

    if !config.enum_rewrites.is_empty() {
        println!();
        println!("🛠️ Enum rewrites: {}", config.enum_rewrites.len());
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
