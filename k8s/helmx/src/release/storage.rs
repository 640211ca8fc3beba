use crate::{
    common::{
        constants::{
            CREATED_AT_LABEL_KEY, NAME_LABEL_KEY, OWNER_LABEL_KEY, RELEASE_DATA_KEY,
            RELEASE_OWNER, STATUS_LABEL_KEY, VERSION_LABEL_KEY,
        },
        error::{
            JsonSerialize, ReleaseBase64Decode, ReleaseCompress, ReleaseDecode, ReleaseDecompress,
            ReleaseEncode, Result,
        },
    },
    release::record::Release,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use k8s_openapi::{
    api::core::v1::{ConfigMap, Secret},
    apimachinery::pkg::apis::meta::v1::ObjectMeta,
    ByteString,
};
use maplit::btreemap;
use snafu::ResultExt;
use std::{
    collections::BTreeMap,
    io::{Read, Write},
};
use tracing::debug;

/// Turns a release into an object which can be serialized next to the adopted manifest.
/// Anything from a storage object to a plain record may be produced.
pub trait ReleaseManifest {
    /// Produce the object for the release, to be stored in the given Tiller namespace.
    fn release_manifest(&self, release: &Release, tiller_ns: &str) -> Result<serde_json::Value>;
}

impl<F> ReleaseManifest for F
where
    F: Fn(&Release, &str) -> Result<serde_json::Value>,
{
    fn release_manifest(&self, release: &Release, tiller_ns: &str) -> Result<serde_json::Value> {
        self(release, tiller_ns)
    }
}

/// The kinds of Kubernetes objects helm can keep its release records in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageDriver {
    ConfigMap,
    Secret,
}

impl ReleaseManifest for StorageDriver {
    fn release_manifest(&self, release: &Release, tiller_ns: &str) -> Result<serde_json::Value> {
        match self {
            Self::ConfigMap => {
                serde_json::to_value(release_to_config_map(release, tiller_ns)?).context(
                    JsonSerialize {
                        kind: "ConfigMap".to_string(),
                    },
                )
            }
            Self::Secret => serde_json::to_value(release_to_secret(release, tiller_ns)?).context(
                JsonSerialize {
                    kind: "Secret".to_string(),
                },
            ),
        }
    }
}

/// Builds the ConfigMap which helm would store the release in.
pub fn release_to_config_map(release: &Release, tiller_ns: &str) -> Result<ConfigMap> {
    let labels = created_at_labels();
    let key = make_key(&release.name, release.version);

    let mut config_map = new_config_maps_object(&key, release, labels)?;
    config_map.metadata.namespace = Some(tiller_ns.to_string());

    Ok(config_map)
}

/// Builds the Secret which helm would store the release in.
pub fn release_to_secret(release: &Release, tiller_ns: &str) -> Result<Secret> {
    let labels = created_at_labels();
    let key = make_key(&release.name, release.version);

    let mut secret = new_secrets_object(&key, release, labels)?;
    secret.metadata.namespace = Some(tiller_ns.to_string());

    Ok(secret)
}

/// The name of the storage object of a release revision.
pub fn make_key(release_name: &str, version: i32) -> String {
    format!("{release_name}.v{version}")
}

/// Serializes a release into the payload of a storage object: JSON, gzip compressed,
/// base64 encoded.
pub fn encode_release(release: &Release) -> Result<String> {
    let json = serde_json::to_vec(release).context(ReleaseEncode {
        release_name: release.name.clone(),
    })?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(json.as_slice()).context(ReleaseCompress {
        release_name: release.name.clone(),
    })?;
    let compressed = encoder.finish().context(ReleaseCompress {
        release_name: release.name.clone(),
    })?;

    Ok(STANDARD.encode(compressed))
}

/// Deserializes the payload of a storage object back into a release.
pub fn decode_release(data: &str) -> Result<Release> {
    let compressed = STANDARD.decode(data.trim()).context(ReleaseBase64Decode)?;

    let mut json = Vec::new();
    GzDecoder::new(compressed.as_slice())
        .read_to_end(&mut json)
        .context(ReleaseDecompress)?;

    serde_json::from_slice(json.as_slice()).context(ReleaseDecode)
}

fn created_at_labels() -> BTreeMap<String, String> {
    btreemap! {
        CREATED_AT_LABEL_KEY.to_string() => Utc::now().timestamp().to_string(),
    }
}

/// Adds the labels helm uses to look up a release to the given ones. The given labels win.
fn storage_labels(release: &Release, labels: BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut all = btreemap! {
        NAME_LABEL_KEY.to_string() => release.name.clone(),
        OWNER_LABEL_KEY.to_string() => RELEASE_OWNER.to_string(),
        STATUS_LABEL_KEY.to_string() => release.status().to_string(),
        VERSION_LABEL_KEY.to_string() => release.version.to_string(),
    };
    all.extend(labels);
    all
}

fn new_config_maps_object(
    key: &str,
    release: &Release,
    labels: BTreeMap<String, String>,
) -> Result<ConfigMap> {
    let data = encode_release(release)?;
    debug!(%key, bytes = data.len(), "Encoded release for ConfigMap");

    Ok(ConfigMap {
        metadata: ObjectMeta {
            name: Some(key.to_string()),
            labels: Some(storage_labels(release, labels)),
            ..Default::default()
        },
        data: Some(btreemap! { RELEASE_DATA_KEY.to_string() => data }),
        ..Default::default()
    })
}

fn new_secrets_object(
    key: &str,
    release: &Release,
    labels: BTreeMap<String, String>,
) -> Result<Secret> {
    let data = encode_release(release)?;
    debug!(%key, bytes = data.len(), "Encoded release for Secret");

    Ok(Secret {
        metadata: ObjectMeta {
            name: Some(key.to_string()),
            labels: Some(storage_labels(release, labels)),
            ..Default::default()
        },
        data: Some(btreemap! { RELEASE_DATA_KEY.to_string() => ByteString(data.into_bytes()) }),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::{
        decode_release, encode_release, make_key, release_to_config_map, release_to_secret,
        ReleaseManifest, StorageDriver,
    };
    use crate::{
        common::error::{Error, Result},
        release::{
            chart::{Chart, Config},
            record::{Info, Release, Status, StatusCode},
        },
    };
    use chrono::Utc;

    fn release() -> Release {
        let now = Utc::now();
        Release {
            name: "shop".to_string(),
            info: Info {
                status: Status {
                    code: StatusCode::Deployed,
                },
                first_deployed: now,
                last_deployed: now,
                deleted: None,
                description: "Adopted with helm-x".to_string(),
            },
            chart: Chart::adopted("shop", "0.1.0", "kind: Service\n"),
            config: Config::empty(),
            manifest: "kind: Service\n".to_string(),
            hooks: vec![],
            version: 3,
            namespace: "apps".to_string(),
        }
    }

    #[test]
    fn storage_key_is_derived_from_name_and_version() {
        assert_eq!(make_key("shop", 1), "shop.v1");
        assert_eq!(make_key("shop", 12), "shop.v12");
        assert_eq!(make_key("shop", 12), make_key("shop", 12));
    }

    #[test]
    fn encoded_release_decodes_to_the_same_release() {
        let release = release();
        let encoded = encode_release(&release).unwrap();

        assert_eq!(decode_release(&encoded).unwrap(), release);
    }

    #[test]
    fn garbage_release_data_is_rejected() {
        assert!(matches!(
            decode_release("not base64!"),
            Err(Error::ReleaseBase64Decode { .. })
        ));
        assert!(matches!(
            decode_release("aGVsbG8="),
            Err(Error::ReleaseDecompress { .. })
        ));
    }

    #[test]
    fn config_map_stores_the_release() {
        let release = release();
        let config_map = release_to_config_map(&release, "kube-system").unwrap();

        assert_eq!(config_map.metadata.name.as_deref(), Some("shop.v3"));
        assert_eq!(config_map.metadata.namespace.as_deref(), Some("kube-system"));

        let labels = config_map.metadata.labels.unwrap();
        assert_eq!(labels["NAME"], "shop");
        assert_eq!(labels["OWNER"], "TILLER");
        assert_eq!(labels["STATUS"], "DEPLOYED");
        assert_eq!(labels["VERSION"], "3");
        assert!(labels["CREATED_AT"].parse::<i64>().unwrap() > 0);

        let data = config_map.data.unwrap();
        assert_eq!(decode_release(&data["release"]).unwrap(), release);
    }

    #[test]
    fn secret_stores_the_release() {
        let release = release();
        let secret = release_to_secret(&release, "tiller").unwrap();

        assert_eq!(secret.metadata.name.as_deref(), Some("shop.v3"));
        assert_eq!(secret.metadata.namespace.as_deref(), Some("tiller"));
        assert_eq!(secret.metadata.labels.unwrap()["STATUS"], "DEPLOYED");

        let data = secret.data.unwrap();
        let payload = std::str::from_utf8(&data["release"].0).unwrap();
        assert_eq!(decode_release(payload).unwrap(), release);
    }

    #[test]
    fn storage_drivers_stamp_type_metadata() {
        let release = release();

        let config_map = StorageDriver::ConfigMap
            .release_manifest(&release, "kube-system")
            .unwrap();
        assert_eq!(config_map["apiVersion"], "v1");
        assert_eq!(config_map["kind"], "ConfigMap");
        assert_eq!(config_map["metadata"]["namespace"], "kube-system");

        let secret = StorageDriver::Secret
            .release_manifest(&release, "kube-system")
            .unwrap();
        assert_eq!(secret["apiVersion"], "v1");
        assert_eq!(secret["kind"], "Secret");
        assert_eq!(secret["metadata"]["name"], "shop.v3");
    }

    #[test]
    fn closures_are_release_manifests() {
        let name_only = |release: &Release, tiller_ns: &str| -> Result<serde_json::Value> {
            Ok(serde_json::json!({ "name": release.name, "namespace": tiller_ns }))
        };

        let value = name_only.release_manifest(&release(), "tiller").unwrap();
        assert_eq!(value, serde_json::json!({ "name": "shop", "namespace": "tiller" }));
    }
}
