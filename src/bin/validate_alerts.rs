use tracing_subscriber::EnvFilter;

use grafana_rule_converter::config::ConverterConfig;
use grafana_rule_converter::validate;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("grafana_rule_converter=info,validate_alerts=info")
        }))
        .init();

    let config_path =
        std::env::var("CONVERTER_CONFIG").unwrap_or_else(|_| "./converter.toml".to_string());
    let mut config = ConverterConfig::load(&config_path)?;
    config.apply_env();

    let dir = &config.paths.output_dir;
    let reports = validate::validate_dir(dir)?;
    tracing::info!("validating {} files in {}", reports.len(), dir.display());

    let mut invalid = 0;
    for report in &reports {
        match &report.result {
            Ok(warnings) => {
                tracing::info!("ok {}", report.path.display());
                for w in warnings {
                    tracing::warn!("{}: {w}", report.path.display());
                }
            }
            Err(e) => {
                invalid += 1;
                tracing::error!("invalid {}: {e}", report.path.display());
            }
        }
    }

    tracing::info!("{}/{} files valid", reports.len() - invalid, reports.len());
    if invalid > 0 {
        anyhow::bail!("{invalid} file(s) failed validation");
    }
    Ok(())
}
