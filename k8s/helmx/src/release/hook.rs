use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The lifecycle events a hook may be bound to, by their `helm.sh/hook` annotation value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    PreInstall,
    PostInstall,
    PreDelete,
    PostDelete,
    PreUpgrade,
    PostUpgrade,
    PreRollback,
    PostRollback,
    #[serde(rename = "test-success")]
    ReleaseTestSuccess,
    #[serde(rename = "test-failure")]
    ReleaseTestFailure,
    CrdInstall,
}

impl HookEvent {
    /// The annotation value of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PreInstall => "pre-install",
            Self::PostInstall => "post-install",
            Self::PreDelete => "pre-delete",
            Self::PostDelete => "post-delete",
            Self::PreUpgrade => "pre-upgrade",
            Self::PostUpgrade => "post-upgrade",
            Self::PreRollback => "pre-rollback",
            Self::PostRollback => "post-rollback",
            Self::ReleaseTestSuccess => "test-success",
            Self::ReleaseTestFailure => "test-failure",
            Self::CrdInstall => "crd-install",
        }
    }
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pre-install" => Ok(Self::PreInstall),
            "post-install" => Ok(Self::PostInstall),
            "pre-delete" => Ok(Self::PreDelete),
            "post-delete" => Ok(Self::PostDelete),
            "pre-upgrade" => Ok(Self::PreUpgrade),
            "post-upgrade" => Ok(Self::PostUpgrade),
            "pre-rollback" => Ok(Self::PreRollback),
            "post-rollback" => Ok(Self::PostRollback),
            // 'test-success' is the older spelling of 'test'.
            "test-success" | "test" => Ok(Self::ReleaseTestSuccess),
            "test-failure" => Ok(Self::ReleaseTestFailure),
            "crd-install" => Ok(Self::CrdInstall),
            unknown => Err(unknown.to_string()),
        }
    }
}

/// When a hook resource is to be deleted, by its `helm.sh/hook-delete-policy` annotation value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HookDeletePolicy {
    HookSucceeded,
    HookFailed,
    BeforeHookCreation,
}

impl FromStr for HookDeletePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hook-succeeded" => Ok(Self::HookSucceeded),
            "hook-failed" => Ok(Self::HookFailed),
            "before-hook-creation" => Ok(Self::BeforeHookCreation),
            unknown => Err(unknown.to_string()),
        }
    }
}

/// A manifest document which helm runs at a lifecycle event instead of installing it
/// with the rest of the release.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hook {
    pub name: String,
    pub kind: String,
    pub path: String,
    pub manifest: String,
    pub events: Vec<HookEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_run: Option<DateTime<Utc>>,
    pub weight: i32,
    pub delete_policies: Vec<HookDeletePolicy>,
}
