use crate::common::constants::{
    adopted_chart_readme, ADOPTED_README_PATH, ADOPTED_TEMPLATE_PATH, CHART_API_VERSION,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

/// Metadata of a chart, as helm records it in Chart.yaml.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub name: String,
    pub api_version: String,
    pub version: String,
    pub app_version: String,
}

/// A chart template. The data is base64 encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub data: String,
}

/// Raw YAML values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub raw: String,
}

impl Config {
    /// Values which set nothing.
    pub fn empty() -> Self {
        Self {
            raw: "{}".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::empty()
    }
}

/// A non-template file bundled with a chart. The value is base64 encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub type_url: String,
    pub value: String,
}

/// A chart, as it is recorded on a release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chart {
    pub metadata: Metadata,
    pub templates: Vec<Template>,
    pub values: Config,
    pub dependencies: Vec<Chart>,
    pub files: Vec<File>,
}

impl Chart {
    /// Builds the single-template chart under which an adopted manifest is recorded.
    /// The chart version doubles as the app version.
    pub fn adopted(name: &str, version: &str, manifest: &str) -> Self {
        Self {
            metadata: Metadata {
                name: name.to_string(),
                api_version: CHART_API_VERSION.to_string(),
                version: version.to_string(),
                app_version: version.to_string(),
            },
            templates: vec![Template {
                name: ADOPTED_TEMPLATE_PATH.to_string(),
                data: STANDARD.encode(manifest),
            }],
            values: Config::empty(),
            dependencies: vec![],
            files: vec![File {
                type_url: ADOPTED_README_PATH.to_string(),
                value: STANDARD.encode(adopted_chart_readme()),
            }],
        }
    }
}
