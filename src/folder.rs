use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Grafana folder an alert group is provisioned into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Folder {
    Infrastructure,
    Databases,
    #[default]
    Applications,
}

impl Folder {
    pub const ALL: [Folder; 3] = [Folder::Infrastructure, Folder::Databases, Folder::Applications];

    pub fn as_str(self) -> &'static str {
        match self {
            Folder::Infrastructure => "infrastructure",
            Folder::Databases => "databases",
            Folder::Applications => "applications",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substring of the `component` label → folder. First match wins, so the
/// order here is a priority order (`node-exporter-mysql` is infrastructure).
const COMPONENT_FOLDERS: &[(&str, Folder)] = &[
    ("aks", Folder::Infrastructure),
    ("node", Folder::Infrastructure),
    ("cluster", Folder::Infrastructure),
    ("postgresql", Folder::Databases),
    ("mysql", Folder::Databases),
    ("rabbitmq", Folder::Applications),
    ("n8n", Folder::Applications),
    ("argocd", Folder::Applications),
    ("cert-manager", Folder::Applications),
    ("external-dns", Folder::Applications),
    ("content-platform", Folder::Applications),
];

/// Map a rule's labels to its folder.
///
/// `component` is matched by substring against [`COMPONENT_FOLDERS`]; if
/// nothing matches, `category` is compared exactly. Both labels are
/// compared lowercase and default to empty.
pub fn classify(labels: &BTreeMap<String, String>) -> Folder {
    let component = labels
        .get("component")
        .map(|c| c.to_lowercase())
        .unwrap_or_default();
    let category = labels
        .get("category")
        .map(|c| c.to_lowercase())
        .unwrap_or_default();

    if let Some((_, folder)) = COMPONENT_FOLDERS
        .iter()
        .find(|(key, _)| component.contains(key))
    {
        return *folder;
    }

    match category.as_str() {
        "infrastructure" => Folder::Infrastructure,
        "database" => Folder::Databases,
        "application" => Folder::Applications,
        _ => Folder::default(),
    }
}
