//! Output side: Grafana file-based alert provisioning (`apiVersion: 1`).
//!
//! Field declaration order is the serialized key order, which keeps the
//! generated YAML stable and diff-friendly.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Pseudo-datasource that routes a stage to Grafana's server-side expression engine.
pub const EXPRESSION_DATASOURCE_UID: &str = "__expr__";

pub const PROVISIONING_API_VERSION: u32 = 1;

pub const DEFAULT_ORG_ID: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertProvisioning {
    pub api_version: u32,
    pub groups: Vec<AlertGroup>,
}

impl AlertProvisioning {
    pub fn new(groups: Vec<AlertGroup>) -> Self {
        Self {
            api_version: PROVISIONING_API_VERSION,
            groups,
        }
    }

    pub fn alert_count(&self) -> usize {
        self.groups.iter().map(|g| g.rules.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertGroup {
    pub org_id: i64,
    pub name: String,
    pub folder: String,
    pub interval: String,
    pub rules: Vec<AlertRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    pub uid: String,
    pub title: String,
    pub condition: RefId,
    #[serde(rename = "for")]
    pub for_duration: String,
    pub no_data_state: NoDataState,
    pub exec_err_state: ExecErrState,
    pub annotations: BTreeMap<String, String>,
    pub labels: BTreeMap<String, String>,
    pub data: Vec<QueryStage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoDataState {
    NoData,
    Alerting,
    #[serde(rename = "OK")]
    Ok,
    KeepLast,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecErrState {
    Error,
    Alerting,
    #[serde(rename = "OK")]
    Ok,
    KeepLast,
}

/// Stage identifier. Later stages reference earlier ones by this name
/// (`A` in the reducer, `$B` in the math expression).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefId {
    A,
    B,
    C,
}

impl RefId {
    pub fn as_str(self) -> &'static str {
        match self {
            RefId::A => "A",
            RefId::B => "B",
            RefId::C => "C",
        }
    }
}

impl fmt::Display for RefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStage {
    pub ref_id: RefId,
    pub relative_time_range: RelativeTimeRange,
    pub datasource_uid: String,
    pub model: StageModel,
}

/// Seconds before "now" at which the evaluation window starts and ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativeTimeRange {
    pub from: u64,
    pub to: u64,
}

impl RelativeTimeRange {
    pub fn lookback(secs: u64) -> Self {
        Self { from: secs, to: 0 }
    }

    pub fn instant() -> Self {
        Self { from: 0, to: 0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StageModel {
    Query(QueryModel),
    Expression(ExpressionModel),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryModel {
    pub expr: String,
    pub ref_id: RefId,
    pub datasource: DatasourceRef,
    pub interval_ms: u64,
    pub max_data_points: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionModel {
    #[serde(rename = "type")]
    pub kind: ExpressionKind,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reducer: Option<Reducer>,
    pub ref_id: RefId,
    pub datasource: DatasourceRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionKind {
    Reduce,
    Math,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub uid: String,
}

impl DatasourceRef {
    pub fn prometheus(uid: impl Into<String>) -> Self {
        Self {
            kind: "prometheus".to_string(),
            uid: uid.into(),
        }
    }

    pub fn expression() -> Self {
        Self {
            kind: EXPRESSION_DATASOURCE_UID.to_string(),
            uid: EXPRESSION_DATASOURCE_UID.to_string(),
        }
    }
}
