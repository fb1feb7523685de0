use tracing_subscriber::EnvFilter;

use grafana_rule_converter::Converter;
use grafana_rule_converter::config::ConverterConfig;
use grafana_rule_converter::document;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("grafana_rule_converter=info,convert_alerts=info")
        }))
        .init();

    let config_path =
        std::env::var("CONVERTER_CONFIG").unwrap_or_else(|_| "./converter.toml".to_string());
    let mut config = ConverterConfig::load(&config_path)?;
    config.apply_env();

    let converter = Converter::new(config.convert_options());
    let summary = document::convert_dir(
        &config.paths.alerts_dir,
        &config.paths.output_dir,
        &converter,
    )?;

    for (file, err) in &summary.failed {
        tracing::error!("{}: {err}", file.display());
    }
    tracing::info!(
        "converted {} alerts across {} files ({} failed), output in {}",
        summary.total_alerts(),
        summary.file_count(),
        summary.failed.len(),
        config.paths.output_dir.display()
    );

    Ok(())
}
