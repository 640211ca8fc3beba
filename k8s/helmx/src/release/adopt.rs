use crate::{
    common::{
        constants::{
            adopted_release_description, DEFAULT_CHART_VERSION, DEFAULT_NAMESPACE,
            FIRST_RELEASE_VERSION,
        },
        error::{Result, YamlSerialize},
    },
    release::{
        chart::{Chart, Config},
        manifest::split_manifest_and_hooks,
        record::{Info, Release, Status, StatusCode},
        storage::ReleaseManifest,
    },
};
use chrono::Utc;
use snafu::ResultExt;
use tracing::{debug, info};

/// Records an already-applied manifest as the first revision of a deployed helm release.
/// An empty version or namespace falls back to the defaults.
pub fn adopted_release(
    chart_name: &str,
    version: &str,
    release_name: &str,
    namespace: &str,
    manifest: &str,
) -> Result<Release> {
    let (manifest, hooks) = split_manifest_and_hooks(manifest)?;

    let version = if version.is_empty() {
        DEFAULT_CHART_VERSION
    } else {
        version
    };
    let namespace = if namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        namespace
    };

    let now = Utc::now();
    Ok(Release {
        name: release_name.to_string(),
        info: Info {
            status: Status {
                code: StatusCode::Deployed,
            },
            first_deployed: now,
            last_deployed: now,
            deleted: None,
            description: adopted_release_description(),
        },
        chart: Chart::adopted(chart_name, version, manifest.as_str()),
        config: Config::empty(),
        manifest,
        hooks,
        version: FIRST_RELEASE_VERSION,
        namespace: namespace.to_string(),
    })
}

/// Turns the output of `helm template` into something which installs like `helm install`:
/// the manifest followed by a YAML document per release manifest, e.g. the helm storage object
/// which makes helm believe that the resources in the manifest belong to the release.
/// Nothing is returned unless every release manifest succeeds.
pub fn turn_helm_template_to_install(
    chart_name: &str,
    version: &str,
    tiller_ns: &str,
    release_name: &str,
    namespace: &str,
    manifest: &str,
    release_manifests: &[&dyn ReleaseManifest],
) -> Result<String> {
    let release = adopted_release(chart_name, version, release_name, namespace, manifest)?;
    info!(
        release = %release.name,
        namespace = %release.namespace,
        chart = %release.chart.metadata.name,
        version = %release.chart.metadata.version,
        hooks = release.hooks.len(),
        "Adopting manifest"
    );

    let mut concatenated = manifest.to_string();

    for release_manifest in release_manifests {
        let object = release_manifest.release_manifest(&release, tiller_ns)?;
        let yaml = serde_yaml::to_string(&object).context(YamlSerialize {
            kind: object
                .get("kind")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("release manifest")
                .to_string(),
        })?;
        debug!(%yaml, "Release manifest");

        concatenated.push_str("\n---\n");
        concatenated.push_str(yaml.as_str());
    }

    Ok(concatenated)
}

#[cfg(test)]
mod tests {
    use super::{adopted_release, turn_helm_template_to_install};
    use crate::{
        common::error::{Error, Result},
        release::{
            record::{Release, StatusCode},
            storage::{decode_release, ReleaseManifest, StorageDriver},
        },
    };

    const MANIFEST: &str = "apiVersion: v1
kind: Service
metadata:
  name: web
---
apiVersion: v1
kind: Pod
metadata:
  name: web-test
  annotations:
    helm.sh/hook: test-success
";

    #[test]
    fn empty_version_and_namespace_fall_back_to_defaults() {
        let release = adopted_release("web", "", "web", "", MANIFEST).unwrap();

        assert_eq!(release.chart.metadata.version, "0.0.0");
        assert_eq!(release.chart.metadata.app_version, "0.0.0");
        assert_eq!(release.namespace, "default");
    }

    #[test]
    fn adopted_release_is_the_first_deployed_revision() {
        let release = adopted_release("web", "1.0.0", "frontend", "apps", MANIFEST).unwrap();

        assert_eq!(release.name, "frontend");
        assert_eq!(release.version, 1);
        assert_eq!(release.namespace, "apps");
        assert_eq!(release.status(), StatusCode::Deployed);
        assert_eq!(release.info.first_deployed, release.info.last_deployed);
        assert_eq!(release.info.description, "Adopted with helm-x");
        assert_eq!(release.chart.metadata.name, "web");
        assert_eq!(release.chart.metadata.version, "1.0.0");
        assert_eq!(release.config.raw, "{}");
        assert!(release.manifest.contains("kind: Service"));
        assert!(!release.manifest.contains("web-test"));
        assert_eq!(release.hooks.len(), 1);
        assert_eq!(release.hooks[0].name, "web-test");
    }

    #[test]
    fn output_starts_with_the_original_manifest() {
        let output = turn_helm_template_to_install(
            "web",
            "1.0.0",
            "kube-system",
            "frontend",
            "apps",
            MANIFEST,
            &[&StorageDriver::ConfigMap, &StorageDriver::Secret],
        )
        .unwrap();

        assert!(output.starts_with(MANIFEST));

        let documents: Vec<&str> = output[MANIFEST.len()..].split("\n---\n").collect();
        // Nothing precedes the first separator.
        assert_eq!(documents.len(), 3);
        assert!(documents[0].is_empty());

        let config_map: serde_yaml::Value = serde_yaml::from_str(documents[1]).unwrap();
        assert_eq!(config_map["kind"].as_str(), Some("ConfigMap"));
        assert_eq!(config_map["apiVersion"].as_str(), Some("v1"));
        assert_eq!(config_map["metadata"]["name"].as_str(), Some("frontend.v1"));
        assert_eq!(
            config_map["metadata"]["namespace"].as_str(),
            Some("kube-system")
        );
        let release = decode_release(config_map["data"]["release"].as_str().unwrap()).unwrap();
        assert_eq!(release.name, "frontend");
        assert_eq!(release.version, 1);

        let secret: serde_yaml::Value = serde_yaml::from_str(documents[2]).unwrap();
        assert_eq!(secret["kind"].as_str(), Some("Secret"));
        assert_eq!(secret["metadata"]["name"].as_str(), Some("frontend.v1"));
    }

    #[test]
    fn without_release_manifests_the_manifest_is_returned_as_is() {
        let output =
            turn_helm_template_to_install("web", "", "kube-system", "web", "", MANIFEST, &[])
                .unwrap();
        assert_eq!(output, MANIFEST);
    }

    #[test]
    fn failing_release_manifest_fails_the_adoption() {
        let failing = |_: &Release, _: &str| -> Result<serde_json::Value> {
            Err(Error::HelmUpgradeOptionsAbsent)
        };
        let release_manifests: [&dyn ReleaseManifest; 2] = [&StorageDriver::ConfigMap, &failing];

        let result = turn_helm_template_to_install(
            "web",
            "",
            "kube-system",
            "web",
            "",
            MANIFEST,
            &release_manifests,
        );
        assert!(result.is_err());
    }

    #[test]
    fn broken_manifest_fails_the_adoption() {
        let result = turn_helm_template_to_install(
            "web",
            "",
            "kube-system",
            "web",
            "",
            "kind: [oops\n",
            &[&StorageDriver::ConfigMap],
        );
        assert!(matches!(result, Err(Error::YamlParseManifest { .. })));
    }
}
