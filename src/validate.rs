//! Structural checks for Grafana provisioning files.
//!
//! Works on untyped YAML so that hand-written files (folders, contact
//! points, notification policies) can be checked alongside generated ones.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::document::yaml_files;
use crate::uid::{MAX_UID_LEN, is_valid_uid};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("read failed: {0}")]
    Read(String),
    #[error("invalid yaml: {0}")]
    Yaml(String),
    #[error("apiVersion must be 1")]
    ApiVersion,
    #[error("{file} must have \"{key}\" array")]
    MissingSection { file: &'static str, key: &'static str },
    #[error("alert files must have \"groups\" array")]
    MissingGroups,
    #[error("group missing \"name\" field")]
    GroupName,
    #[error("group \"{0}\" missing \"folder\" field")]
    GroupFolder(String),
    #[error("group \"{0}\" missing \"rules\" array")]
    GroupRules(String),
    #[error("rule \"{0}\" missing \"uid\"")]
    RuleUid(String),
    #[error("rule missing \"title\"")]
    RuleTitle,
    #[error("rule \"{0}\" missing \"condition\"")]
    RuleCondition(String),
    #[error("rule \"{0}\" missing \"data\" array")]
    RuleData(String),
}

/// Files that are not alert rule files, and the key each one must carry.
const SPECIAL_FILES: &[(&str, &str)] = &[
    ("folders.yaml", "folders"),
    ("contact-points.yaml", "contactPoints"),
    ("notification-policies.yaml", "policies"),
];

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    /// Non-fatal findings when valid.
    pub result: Result<Vec<String>, ValidationError>,
}

impl FileReport {
    pub fn is_valid(&self) -> bool {
        self.result.is_ok()
    }
}

pub fn validate_str(file_name: &str, yaml: &str) -> Result<Vec<String>, ValidationError> {
    let doc: Value = serde_yaml::from_str(yaml).map_err(|e| ValidationError::Yaml(e.to_string()))?;
    validate_document(file_name, &doc)
}

/// Validate a parsed provisioning document. Returns warnings on success and
/// the first structural problem on failure.
pub fn validate_document(file_name: &str, doc: &Value) -> Result<Vec<String>, ValidationError> {
    // numeric compare, so `1.0` is accepted too
    if doc.get("apiVersion").and_then(Value::as_f64) != Some(1.0) {
        return Err(ValidationError::ApiVersion);
    }

    if let Some(&(file, key)) = SPECIAL_FILES.iter().find(|(f, _)| *f == file_name) {
        if !is_present(doc.get(key)) {
            return Err(ValidationError::MissingSection { file, key });
        }
        return Ok(Vec::new());
    }

    let groups = doc
        .get("groups")
        .and_then(Value::as_sequence)
        .ok_or(ValidationError::MissingGroups)?;

    let mut warnings = Vec::new();
    for group in groups {
        let name = text(group.get("name")).ok_or(ValidationError::GroupName)?;
        if !is_present(group.get("folder")) {
            return Err(ValidationError::GroupFolder(name.to_string()));
        }
        let rules = group
            .get("rules")
            .and_then(Value::as_sequence)
            .ok_or_else(|| ValidationError::GroupRules(name.to_string()))?;

        for rule in rules {
            let title = text(rule.get("title"));
            let label = title.unwrap_or("unknown").to_string();
            let uid = text(rule.get("uid")).ok_or_else(|| ValidationError::RuleUid(label.clone()))?;
            if title.is_none() {
                return Err(ValidationError::RuleTitle);
            }
            if !is_present(rule.get("condition")) {
                return Err(ValidationError::RuleCondition(label));
            }
            let data = rule
                .get("data")
                .and_then(Value::as_sequence)
                .ok_or_else(|| ValidationError::RuleData(label.clone()))?;

            if !is_valid_uid(uid) {
                warnings.push(format!(
                    "rule \"{label}\": uid \"{uid}\" is not [a-z0-9_-]{{0,{MAX_UID_LEN}}}"
                ));
            }
            warnings.extend(lint_queries(&label, data));
        }
    }
    Ok(warnings)
}

/// Parse the PromQL of every query stage. Expression stages have no `expr`.
fn lint_queries(rule: &str, data: &[Value]) -> Vec<String> {
    data.iter()
        .filter_map(|stage| {
            let ref_id = text(stage.get("refId")).unwrap_or("?");
            let expr = text(stage.get("model").and_then(|m| m.get("expr")))?;
            match promql_parser::parser::parse(expr) {
                Ok(_) => None,
                Err(e) => Some(format!("rule \"{rule}\" stage {ref_id}: promql does not parse: {e}")),
            }
        })
        .collect()
}

fn text(v: Option<&Value>) -> Option<&str> {
    v.and_then(Value::as_str).filter(|s| !s.is_empty())
}

fn is_present(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Bool(b)) => *b,
        Some(_) => true,
    }
}

pub fn validate_file(path: &Path) -> FileReport {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let result = std::fs::read_to_string(path)
        .map_err(|e| ValidationError::Read(e.to_string()))
        .and_then(|contents| validate_str(&file_name, &contents));
    FileReport {
        path: path.to_path_buf(),
        result,
    }
}

/// Validate every `*.yaml` file in `dir`, sorted by name.
pub fn validate_dir(dir: &Path) -> Result<Vec<FileReport>, ValidationError> {
    let files = yaml_files(dir).map_err(|e| ValidationError::Read(e.to_string()))?;
    Ok(files.iter().map(|p| validate_file(p)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::Converter;
    use crate::document::{convert_document, parse_prometheus_rule, render_provisioning};

    const VALID: &str = r#"
apiVersion: 1
groups:
  - orgId: 1
    name: node.rules
    folder: infrastructure
    interval: 30s
    rules:
      - uid: nodedown
        title: NodeDown
        condition: C
        data:
          - refId: A
            model:
              expr: up == 0
"#;

    #[test]
    fn accepts_valid_alert_file() {
        assert_eq!(validate_str("node.yaml", VALID), Ok(Vec::new()));
    }

    #[test]
    fn rejects_wrong_api_version() {
        let yaml = VALID.replace("apiVersion: 1", "apiVersion: 2");
        assert_eq!(validate_str("node.yaml", &yaml), Err(ValidationError::ApiVersion));
    }

    #[test]
    fn rejects_missing_groups() {
        assert_eq!(
            validate_str("node.yaml", "apiVersion: 1\n"),
            Err(ValidationError::MissingGroups)
        );
    }

    #[test]
    fn group_and_rule_fields_are_required() {
        let yaml = VALID.replace("    folder: infrastructure\n", "");
        assert_eq!(
            validate_str("node.yaml", &yaml),
            Err(ValidationError::GroupFolder("node.rules".to_string()))
        );

        let yaml = VALID.replace("      - uid: nodedown\n        title", "      - title");
        assert_eq!(
            validate_str("node.yaml", &yaml),
            Err(ValidationError::RuleUid("NodeDown".to_string()))
        );

        let yaml = VALID.replace("        condition: C\n", "");
        assert_eq!(
            validate_str("node.yaml", &yaml),
            Err(ValidationError::RuleCondition("NodeDown".to_string()))
        );

        let yaml = VALID.replace("    name: node.rules\n", "");
        assert_eq!(validate_str("node.yaml", &yaml), Err(ValidationError::GroupName));

        let yaml = VALID.replace("    rules:\n", "    alerts:\n");
        assert_eq!(
            validate_str("node.yaml", &yaml),
            Err(ValidationError::GroupRules("node.rules".to_string()))
        );

        let yaml = VALID.replace("        title: NodeDown\n", "");
        assert_eq!(validate_str("node.yaml", &yaml), Err(ValidationError::RuleTitle));

        let yaml = VALID.replace("        data:\n", "        stages:\n");
        assert_eq!(
            validate_str("node.yaml", &yaml),
            Err(ValidationError::RuleData("NodeDown".to_string()))
        );
    }

    #[test]
    fn uid_is_checked_before_title() {
        let yaml = VALID.replace(
            "      - uid: nodedown\n        title: NodeDown\n        condition",
            "      - condition",
        );
        assert_eq!(
            validate_str("node.yaml", &yaml),
            Err(ValidationError::RuleUid("unknown".to_string()))
        );
    }

    #[test]
    fn float_api_version_is_accepted() {
        let yaml = VALID.replace("apiVersion: 1", "apiVersion: 1.0");
        assert_eq!(validate_str("node.yaml", &yaml), Ok(Vec::new()));
    }

    #[test]
    fn missing_dir_is_a_read_error() {
        assert!(matches!(
            validate_dir(Path::new("/nonexistent/grafana-alerts")),
            Err(ValidationError::Read(_))
        ));
    }

    #[test]
    fn special_files_need_their_section() {
        assert_eq!(
            validate_str("folders.yaml", "apiVersion: 1\nfolders:\n  - uid: infra\n"),
            Ok(Vec::new())
        );
        assert_eq!(
            validate_str("contact-points.yaml", "apiVersion: 1\n"),
            Err(ValidationError::MissingSection {
                file: "contact-points.yaml",
                key: "contactPoints"
            })
        );
        // special files don't need groups
        assert!(validate_str("notification-policies.yaml", "apiVersion: 1\npolicies: []\n").is_ok());
    }

    #[test]
    fn unparsable_yaml() {
        assert!(matches!(
            validate_str("x.yaml", "groups: [unclosed"),
            Err(ValidationError::Yaml(_))
        ));
    }

    #[test]
    fn bad_promql_and_uid_are_warnings() {
        let yaml = VALID
            .replace("expr: up == 0", "expr: \"sum(rate(x[5m]\"")
            .replace("uid: nodedown", "uid: Node Down");
        let warnings = validate_str("node.yaml", &yaml).unwrap();
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("uid \"Node Down\""));
        assert!(warnings[1].contains("stage A"));
    }

    #[test]
    fn converter_output_validates_cleanly() {
        let doc = parse_prometheus_rule(
            r#"
metadata:
  name: pg
spec:
  groups:
    - name: postgres
      rules:
        - alert: PostgresDown
          expr: pg_up{job="postgres"} == 0
          labels:
            component: postgresql
        - alert: ReplicationLag
          expr: pg_replication_lag_seconds > 30
"#,
        )
        .unwrap();
        let out = convert_document(&doc, &Converter::default()).unwrap();
        let rendered = render_provisioning("pg", "pg", &out).unwrap();
        assert_eq!(validate_str("pg.yaml", &rendered), Ok(Vec::new()));
    }

    #[test]
    fn validate_dir_reports_each_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.yaml"), VALID).unwrap();
        std::fs::write(dir.path().join("b.yaml"), "apiVersion: 3\n").unwrap();
        let reports = validate_dir(dir.path()).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].is_valid());
        assert!(!reports[1].is_valid());
    }
}
