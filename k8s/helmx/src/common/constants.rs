pub use ::constants::*;

/// Annotation which marks a manifest document as a helm hook.
pub const HOOK_ANNOTATION: &str = "helm.sh/hook";

/// Annotation which carries the execution weight of a helm hook.
pub const HOOK_WEIGHT_ANNOTATION: &str = "helm.sh/hook-weight";

/// Annotation which carries the deletion policies of a helm hook.
pub const HOOK_DELETE_POLICY_ANNOTATION: &str = "helm.sh/hook-delete-policy";

/// The version counter of a newly recorded release. Helm counts revisions from 1.
pub const FIRST_RELEASE_VERSION: i32 = 1;

/// Order in which helm installs resources, by kind. Kinds which are not listed here are
/// installed after these.
pub const INSTALL_ORDER: &[&str] = &[
    "Namespace",
    "ResourceQuota",
    "LimitRange",
    "PodSecurityPolicy",
    "PodDisruptionBudget",
    "Secret",
    "ConfigMap",
    "StorageClass",
    "PersistentVolume",
    "PersistentVolumeClaim",
    "ServiceAccount",
    "CustomResourceDefinition",
    "ClusterRole",
    "ClusterRoleList",
    "ClusterRoleBinding",
    "ClusterRoleBindingList",
    "Role",
    "RoleList",
    "RoleBinding",
    "RoleBindingList",
    "Service",
    "DaemonSet",
    "Pod",
    "ReplicationController",
    "ReplicaSet",
    "Deployment",
    "HorizontalPodAutoscaler",
    "StatefulSet",
    "Job",
    "CronJob",
    "Ingress",
    "APIService",
];
