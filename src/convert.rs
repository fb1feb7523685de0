//! PrometheusRule groups → Grafana alert groups.
//!
//! Conversion is total: missing optional fields fall back to defaults and
//! nothing here returns an error.

use crate::folder::{Folder, classify};
use crate::models::grafana::{
    AlertGroup, AlertProvisioning, AlertRule, DEFAULT_ORG_ID, ExecErrState, NoDataState, RefId,
};
use crate::models::prometheus::{Rule, RuleGroup};
use crate::promql::{QueryOptions, synthesize_with};
use crate::uid::generate_uid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub query: QueryOptions,
    /// Used when a rule has no `for`.
    pub default_for: String,
    /// Used when a group has no `interval`.
    pub default_interval: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            query: QueryOptions::default(),
            default_for: "0s".to_string(),
            default_interval: "30s".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Converter {
    opts: ConvertOptions,
}

impl Converter {
    pub fn new(opts: ConvertOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.opts
    }

    /// Convert one alerting rule. Recording rules have no title; callers are
    /// expected to filter them out (see [`Converter::convert_group`]).
    pub fn convert_rule(&self, rule: &Rule) -> AlertRule {
        let title = rule.alert.clone().unwrap_or_default();
        AlertRule {
            uid: generate_uid(&title),
            data: synthesize_with(&rule.expr, &self.opts.query),
            title,
            condition: RefId::C,
            for_duration: rule
                .for_duration
                .clone()
                .unwrap_or_else(|| self.opts.default_for.clone()),
            no_data_state: NoDataState::Ok,
            exec_err_state: ExecErrState::Alerting,
            annotations: rule.annotations.clone().unwrap_or_default(),
            labels: rule.labels.clone().unwrap_or_default(),
        }
    }

    /// Convert a group. The folder comes from the group's first rule,
    /// whatever its kind; recording rules are dropped.
    pub fn convert_group(&self, group: &RuleGroup) -> AlertGroup {
        let folder = group_folder(group);

        let rules = group
            .rules
            .iter()
            .filter(|rule| {
                if !rule.is_alerting() {
                    tracing::debug!(
                        group = %group.name,
                        record = rule.record.as_deref().unwrap_or(""),
                        "skipping recording rule"
                    );
                }
                rule.is_alerting()
            })
            .map(|rule| self.convert_rule(rule))
            .collect();

        AlertGroup {
            org_id: DEFAULT_ORG_ID,
            name: group.name.clone(),
            folder: folder.as_str().to_string(),
            interval: group
                .interval
                .clone()
                .unwrap_or_else(|| self.opts.default_interval.clone()),
            rules,
        }
    }

    pub fn convert_groups(&self, groups: &[RuleGroup]) -> AlertProvisioning {
        AlertProvisioning::new(groups.iter().map(|g| self.convert_group(g)).collect())
    }
}

/// [`Converter::convert_rule`] with default options.
pub fn convert_rule(rule: &Rule) -> AlertRule {
    Converter::default().convert_rule(rule)
}

/// [`Converter::convert_group`] with default options.
pub fn convert_group(group: &RuleGroup) -> AlertGroup {
    Converter::default().convert_group(group)
}

/// [`Converter::convert_groups`] with default options.
pub fn convert_groups(groups: &[RuleGroup]) -> AlertProvisioning {
    Converter::default().convert_groups(groups)
}

/// Folder a group lands in: decided by its first rule only, `applications`
/// for an empty group.
pub fn group_folder(group: &RuleGroup) -> Folder {
    group
        .rules
        .first()
        .and_then(|r| r.labels.as_ref())
        .map(classify)
        .unwrap_or_default()
}
