//! File-level harness around the converter: YAML in, YAML out.

use std::path::{Path, PathBuf};

use crate::convert::Converter;
use crate::models::grafana::AlertProvisioning;
use crate::models::prometheus::PrometheusRule;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("document has no `spec`")]
    MissingSpec,
    #[error("`spec` has no `groups`")]
    MissingGroups,
}

impl ConvertError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub input: PathBuf,
    pub output: PathBuf,
    pub groups: usize,
    pub alerts: usize,
}

#[derive(Debug, Default)]
pub struct DirSummary {
    pub converted: Vec<FileSummary>,
    pub failed: Vec<(PathBuf, ConvertError)>,
}

impl DirSummary {
    pub fn total_alerts(&self) -> usize {
        self.converted.iter().map(|f| f.alerts).sum()
    }

    pub fn file_count(&self) -> usize {
        self.converted.len() + self.failed.len()
    }
}

pub fn parse_prometheus_rule(yaml: &str) -> Result<PrometheusRule, ConvertError> {
    Ok(serde_yaml::from_str(yaml)?)
}

/// Convert the `spec.groups` of a parsed resource. The resource shape is the
/// only thing checked here; the groups themselves always convert.
pub fn convert_document(
    doc: &PrometheusRule,
    converter: &Converter,
) -> Result<AlertProvisioning, ConvertError> {
    let spec = doc.spec.as_ref().ok_or(ConvertError::MissingSpec)?;
    let groups = spec.groups.as_ref().ok_or(ConvertError::MissingGroups)?;
    Ok(converter.convert_groups(groups))
}

/// Serialize with the two-line provenance header Grafana ignores.
pub fn render_provisioning(
    stem: &str,
    source_name: &str,
    provisioning: &AlertProvisioning,
) -> Result<String, ConvertError> {
    let body = serde_yaml::to_string(provisioning)?;
    Ok(format!(
        "# Grafana Unified Alerting Rules: {stem}\n\
         # Converted from PrometheusRule: {source_name}\n\
         {body}"
    ))
}

/// Convert one PrometheusRule file into `output_dir/<same file name>`.
pub fn convert_file(
    input: &Path,
    output_dir: &Path,
    converter: &Converter,
) -> Result<FileSummary, ConvertError> {
    let contents = std::fs::read_to_string(input).map_err(|e| ConvertError::io(input, e))?;
    let doc = parse_prometheus_rule(&contents)?;
    let provisioning = convert_document(&doc, converter)?;

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let source_name = match doc.metadata.name.as_deref() {
        Some(name) => name.to_string(),
        None => {
            tracing::warn!("{} has no metadata.name, using file stem", input.display());
            stem.clone()
        }
    };
    let rendered = render_provisioning(&stem, &source_name, &provisioning)?;

    let file_name = input.file_name().unwrap_or(input.as_os_str());
    let output = output_dir.join(file_name);
    std::fs::write(&output, rendered).map_err(|e| ConvertError::io(&output, e))?;

    Ok(FileSummary {
        input: input.to_path_buf(),
        output,
        groups: provisioning.groups.len(),
        alerts: provisioning.alert_count(),
    })
}

/// Every `*.yaml` file directly under `dir`, sorted by path.
pub fn yaml_files(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let entries = std::fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| ConvertError::io(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "yaml") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert every PrometheusRule file in `input_dir`. A file that fails is
/// logged and recorded in the summary; the rest of the batch still runs.
pub fn convert_dir(
    input_dir: &Path,
    output_dir: &Path,
    converter: &Converter,
) -> Result<DirSummary, ConvertError> {
    std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;
    let files = yaml_files(input_dir)?;
    tracing::info!("converting {} PrometheusRule files from {}", files.len(), input_dir.display());

    let mut summary = DirSummary::default();
    for file in files {
        match convert_file(&file, output_dir, converter) {
            Ok(converted) => {
                tracing::info!(
                    "converted {} -> {} ({} alerts)",
                    file.display(),
                    converted.output.display(),
                    converted.alerts
                );
                summary.converted.push(converted);
            }
            Err(e) => {
                tracing::warn!("failed to convert {}: {e}", file.display());
                summary.failed.push((file, e));
            }
        }
    }
    Ok(summary)
}
