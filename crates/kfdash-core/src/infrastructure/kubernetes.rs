//! Storage class access on the cluster. Only the dashboard config annotation
//! is ever written; everything else on the object is read-only here.

use std::path::PathBuf;

use async_trait::async_trait;
use k8s_openapi::api::storage::v1::StorageClass;
use kube::api::{
    Api,
    ListParams,
    Patch,
    PatchParams,
};
use kube::Client;

use crate::domain::storage_class::CONFIG_ANNOTATION;
use crate::domain::{
    DomainError,
    DomainResult,
    StorageClassRecord,
};

#[async_trait]
pub trait StorageClassStore: Send + Sync {
    async fn list(&self) -> DomainResult<Vec<StorageClassRecord>>;

    async fn get(&self, name: &str) -> DomainResult<StorageClassRecord>;

    /// Replace the config annotation of one storage class
    async fn write_config(&self, name: &str, annotation: &str) -> DomainResult<()>;
}

pub struct KubeStorageClassStore {
    client: Client,
}

impl KubeStorageClassStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the given kubeconfig (colon separated paths are
    /// merged), or from the environment when nothing is configured.
    pub async fn from_kubeconfig(
        kubeconfig_path: Option<&str>, context: Option<&str>,
    ) -> DomainResult<Self> {
        let config = match (kubeconfig_path, context) {
            (None, None) if !default_kubeconfig_exists() => kube::Config::infer()
                .await
                .map_err(|e| {
                    DomainError::InvalidConfig(format!("Failed to infer cluster config: {}", e))
                })?,
            _ => {
                let paths = match kubeconfig_path {
                    Some(path) => split_kubeconfig_paths(path),
                    None => split_kubeconfig_paths(&default_kubeconfig_path()),
                };
                let kubeconfig = merge_kubeconfigs(paths)?;
                let options = kube::config::KubeConfigOptions {
                    context: context.map(str::to_string),
                    ..Default::default()
                };

                kube::Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| {
                        DomainError::InvalidConfig(format!("Failed to load kubeconfig: {}", e))
                    })?
            }
        };

        let client = Client::try_from(config).map_err(|e| {
            DomainError::InvalidConfig(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self::new(client))
    }

    fn api(&self) -> Api<StorageClass> {
        Api::all(self.client.clone())
    }
}

#[async_trait]
impl StorageClassStore for KubeStorageClassStore {
    async fn list(&self) -> DomainResult<Vec<StorageClassRecord>> {
        let list = self.api().list(&ListParams::default()).await?;
        let records: Vec<StorageClassRecord> = list.items.into_iter().filter_map(to_record).collect();

        tracing::debug!(count = records.len(), "Listed storage classes");
        Ok(records)
    }

    async fn get(&self, name: &str) -> DomainResult<StorageClassRecord> {
        let storage_class = self.api().get(name).await?;
        to_record(storage_class)
            .ok_or_else(|| DomainError::NotFound(format!("Storage class {} has no name", name)))
    }

    async fn write_config(&self, name: &str, annotation: &str) -> DomainResult<()> {
        let patch = serde_json::json!({
            "metadata": {
                "annotations": {
                    CONFIG_ANNOTATION: annotation,
                }
            }
        });

        self.api()
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;

        tracing::info!(storage_class = %name, "Updated storage class config");
        Ok(())
    }
}

fn to_record(storage_class: StorageClass) -> Option<StorageClassRecord> {
    Some(StorageClassRecord {
        name: storage_class.metadata.name?,
        provisioner: storage_class.provisioner,
        annotations: storage_class.metadata.annotations.unwrap_or_default(),
    })
}

fn merge_kubeconfigs(paths: Vec<String>) -> DomainResult<kube::config::Kubeconfig> {
    let mut merged = kube::config::Kubeconfig::default();
    let mut found_any = false;

    for path_str in paths {
        let path = PathBuf::from(&path_str);
        if !path.exists() {
            continue;
        }

        match kube::config::Kubeconfig::read_from(&path) {
            Ok(kc) => {
                found_any = true;
                merged.clusters.extend(kc.clusters);
                merged.auth_infos.extend(kc.auth_infos);
                merged.contexts.extend(kc.contexts);
                if merged.current_context.is_none() {
                    merged.current_context = kc.current_context;
                }
            }
            Err(e) => {
                tracing::warn!(path = %path_str, error = %e, "Skipping unreadable kubeconfig");
            }
        }
    }

    if !found_any {
        return Err(DomainError::InvalidConfig(
            "No valid kubeconfig files found".to_string(),
        ));
    }

    Ok(merged)
}

fn expand_path(path: &str) -> String {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped).to_string_lossy().to_string();
        }
    }

    shellexpand::env(path)
        .map(|expanded| expanded.to_string())
        .unwrap_or_else(|_| path.to_string())
}

fn default_kubeconfig_path() -> String {
    if let Ok(kubeconfig_env) = std::env::var("KUBECONFIG") {
        if !kubeconfig_env.trim().is_empty() {
            return kubeconfig_env;
        }
    }

    dirs::home_dir()
        .map(|home| home.join(".kube/config").to_string_lossy().to_string())
        .unwrap_or_else(|| "~/.kube/config".to_string())
}

fn default_kubeconfig_exists() -> bool {
    split_kubeconfig_paths(&default_kubeconfig_path())
        .iter()
        .any(|p| PathBuf::from(p).exists())
}

fn split_kubeconfig_paths(path: &str) -> Vec<String> {
    let separator = if cfg!(windows) { ';' } else { ':' };

    path.split(separator)
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(expand_path)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    use super::*;

    #[test]
    fn test_split_kubeconfig_paths_skips_blanks() {
        let separator = if cfg!(windows) { ";" } else { ":" };
        let joined = format!("/tmp/a{sep} {sep}/tmp/b{sep}", sep = separator);

        assert_eq!(split_kubeconfig_paths(&joined), vec!["/tmp/a", "/tmp/b"]);
    }

    #[test]
    fn test_expand_path_leaves_plain_paths() {
        assert_eq!(expand_path("/etc/kube/config"), "/etc/kube/config");
    }

    #[test]
    fn test_merge_kubeconfigs_requires_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").to_string_lossy().to_string();

        assert!(matches!(
            merge_kubeconfigs(vec![missing]),
            Err(DomainError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_merge_kubeconfigs_keeps_first_current_context() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, context: &str| {
            let path = dir.path().join(name);
            std::fs::write(
                &path,
                format!(
                    "apiVersion: v1\nkind: Config\ncurrent-context: {ctx}\nclusters:\n- name: {ctx}\n  cluster:\n    server: https://{ctx}.example:6443\ncontexts:\n- name: {ctx}\n  context:\n    cluster: {ctx}\n    user: {ctx}\nusers:\n- name: {ctx}\n  user:\n    token: abc\n",
                    ctx = context
                ),
            )
            .unwrap();
            path.to_string_lossy().to_string()
        };
        let first = write("first", "alpha");
        let second = write("second", "beta");

        let merged = merge_kubeconfigs(vec![first, second]).unwrap();

        assert_eq!(merged.current_context.as_deref(), Some("alpha"));
        assert_eq!(merged.clusters.len(), 2);
        assert_eq!(merged.contexts.len(), 2);
    }

    #[test]
    fn test_to_record_requires_name() {
        let mut annotations = BTreeMap::new();
        annotations.insert(CONFIG_ANNOTATION.to_string(), "{}".to_string());
        let storage_class = StorageClass {
            metadata: ObjectMeta {
                name: Some("gp3".to_string()),
                annotations: Some(annotations),
                ..Default::default()
            },
            provisioner: "ebs.csi.aws.com".to_string(),
            ..Default::default()
        };

        let record = to_record(storage_class).unwrap();
        assert_eq!(record.name, "gp3");
        assert_eq!(record.annotations.get(CONFIG_ANNOTATION).unwrap(), "{}");

        assert!(to_record(StorageClass::default()).is_none());
    }
}
