use crate::{
    common::{
        constants::{
            ADOPTED_TEMPLATE_PATH, HOOK_ANNOTATION, HOOK_DELETE_POLICY_ANNOTATION,
            HOOK_WEIGHT_ANNOTATION, INSTALL_ORDER,
        },
        error::{Result, YamlParseManifest},
    },
    release::hook::{Hook, HookDeletePolicy, HookEvent},
};
use serde::Deserialize;
use snafu::ResultExt;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// The part of a Kubernetes object which is needed to sort it and to tell hooks apart.
#[derive(Debug, Default, Deserialize)]
struct SimpleHead {
    kind: Option<String>,
    metadata: Option<HeadMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct HeadMetadata {
    name: Option<String>,
    annotations: Option<BTreeMap<String, String>>,
}

impl SimpleHead {
    fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or_default()
    }

    fn name(&self) -> &str {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.name.as_deref())
            .unwrap_or_default()
    }

    fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|metadata| metadata.annotations.as_ref())
            .and_then(|annotations| annotations.get(key))
            .map(String::as_str)
    }
}

/// A non-hook manifest document.
struct Resource {
    head: SimpleHead,
    content: String,
}

impl Resource {
    /// Position of the resource in helm's install order. Known kinds come first, in the
    /// order of INSTALL_ORDER, unknown kinds follow sorted by kind name.
    fn install_order(&self) -> (usize, &str) {
        let kind = self.head.kind();
        match INSTALL_ORDER.iter().position(|known| *known == kind) {
            Some(position) => (position, ""),
            None => (INSTALL_ORDER.len(), kind),
        }
    }
}

/// Splits a multi-document manifest into the manifest text helm records on a release and the
/// hooks defined in it. Resources are ordered as helm would install them.
pub fn split_manifest_and_hooks(manifest: &str) -> Result<(String, Vec<Hook>)> {
    let mut resources: Vec<Resource> = Vec::new();
    let mut hooks: Vec<Hook> = Vec::new();

    for (index, document) in split_documents(manifest).into_iter().enumerate() {
        let content = document.trim();
        if is_blank(content) {
            continue;
        }

        let head: SimpleHead =
            serde_yaml::from_str(content).context(YamlParseManifest { index })?;

        match head.annotation(HOOK_ANNOTATION) {
            Some(events) => {
                let hook = hook_from(&head, events, content);
                debug!(name = %hook.name, kind = %hook.kind, events = ?hook.events, "Found hook");
                hooks.push(hook);
            }
            None => resources.push(Resource {
                head,
                content: content.to_string(),
            }),
        }
    }

    // Stable, so that resources of the same kind keep their order.
    resources.sort_by(|a, b| a.install_order().cmp(&b.install_order()));

    let manifest = resources
        .iter()
        .map(|resource| format!("---\n# Source: {ADOPTED_TEMPLATE_PATH}\n{}\n", resource.content))
        .collect::<String>();

    Ok((manifest, hooks))
}

/// Splits text on YAML document separator lines.
fn split_documents(manifest: &str) -> Vec<String> {
    let mut documents = Vec::new();
    let mut current = String::new();

    for line in manifest.lines() {
        if line.trim_end() == "---" {
            documents.push(std::mem::take(&mut current));
            continue;
        }
        current.push_str(line);
        current.push('\n');
    }
    documents.push(current);

    documents
}

/// A document which holds nothing but whitespace and comments.
fn is_blank(document: &str) -> bool {
    document
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

fn hook_from(head: &SimpleHead, events: &str, content: &str) -> Hook {
    let events = comma_separated(events)
        .filter_map(|event| match event.parse::<HookEvent>() {
            Ok(event) => Some(event),
            Err(unknown) => {
                warn!(hook = head.name(), event = %unknown, "Ignoring unknown hook event");
                None
            }
        })
        .collect();

    let weight = match head.annotation(HOOK_WEIGHT_ANNOTATION) {
        Some(weight) => weight.trim().parse::<i32>().unwrap_or_else(|_| {
            warn!(hook = head.name(), %weight, "Ignoring non-integer hook weight");
            0
        }),
        None => 0,
    };

    let delete_policies = head
        .annotation(HOOK_DELETE_POLICY_ANNOTATION)
        .map(|policies| {
            comma_separated(policies)
                .filter_map(|policy| match policy.parse::<HookDeletePolicy>() {
                    Ok(policy) => Some(policy),
                    Err(unknown) => {
                        warn!(hook = head.name(), policy = %unknown, "Ignoring unknown hook delete policy");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default();

    Hook {
        name: head.name().to_string(),
        kind: head.kind().to_string(),
        path: ADOPTED_TEMPLATE_PATH.to_string(),
        manifest: content.to_string(),
        events,
        last_run: None,
        weight,
        delete_policies,
    }
}

fn comma_separated(value: &str) -> impl Iterator<Item = &str> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
}
