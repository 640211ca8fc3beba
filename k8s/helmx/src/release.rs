/// Contains the adoption of a rendered manifest as a helm release.
pub mod adopt;

/// Contains the synthetic chart an adopted release is recorded under.
pub mod chart;

/// Contains helm hooks.
pub mod hook;

/// Contains the splitting of manifests into resources and hooks.
pub mod manifest;

/// Contains the release record.
pub mod record;

/// Contains the conversion of releases into helm's storage objects.
pub mod storage;
