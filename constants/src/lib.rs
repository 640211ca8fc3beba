/// Name of the product.
pub const PRODUCT_NAME: &str = "helm-x";

/// Description which is recorded on every adopted release.
pub fn adopted_release_description() -> String {
    format!("Adopted with {PRODUCT_NAME}")
}

/// Contents of the README.md file bundled into the synthetic chart of an adopted release.
pub fn adopted_chart_readme() -> String {
    format!("This release is generated by {PRODUCT_NAME}")
}

/// Chart version used when the adopted chart is not given one.
pub const DEFAULT_CHART_VERSION: &str = "0.0.0";

/// Namespace of the adopted release when none is given.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Namespace where Tiller keeps its release storage objects by default.
pub const DEFAULT_TILLER_NAMESPACE: &str = "kube-system";

/// Default helm binary, resolved through $PATH.
pub const DEFAULT_HELM_BIN: &str = "helm";

/// Environment variable which overrides the helm binary.
pub const HELM_BIN_ENV: &str = "HELM_BIN";

/// Environment variable which forces helm v3 flag semantics without probing the helm binary.
pub const HELM3_ENV: &str = "HELM_X_HELM3";

/// Environment variable for the Tiller namespace, shared with the helm v2 client.
pub const TILLER_NAMESPACE_ENV: &str = "TILLER_NAMESPACE";

/// Helm chart apiVersion for the synthetic chart.
pub const CHART_API_VERSION: &str = "v1";

/// Path of the single template which carries the adopted manifest.
pub const ADOPTED_TEMPLATE_PATH: &str = "templates/all.yaml";

/// Name of the README file bundled into the synthetic chart.
pub const ADOPTED_README_PATH: &str = "README.md";

/// Release storage objects store the encoded release under this data key.
pub const RELEASE_DATA_KEY: &str = "release";

/// Value of the OWNER label on release storage objects.
pub const RELEASE_OWNER: &str = "TILLER";

/// Release storage label keys.
pub const NAME_LABEL_KEY: &str = "NAME";
pub const OWNER_LABEL_KEY: &str = "OWNER";
pub const STATUS_LABEL_KEY: &str = "STATUS";
pub const VERSION_LABEL_KEY: &str = "VERSION";
pub const CREATED_AT_LABEL_KEY: &str = "CREATED_AT";
