/*!

An in-memory [`ObjectClient`] standing in for the Kubernetes API server, so that the poller and
the convergence checker can be tested without a cluster.

The store can be scripted per identity (a queue of snapshots, failures or stalls) and can run a
fake reconciler that plays the part of the addon operator and the package operator with a few
reads of lag between each step. The fake reconciler builds the `ClusterPackage` config from the
secrets it finds, independently of the crate's expectation model.

!*/

#![allow(dead_code)]

use k8s_openapi::api::core::v1::{Namespace, NamespaceStatus, Secret};
use kube::Resource;
use pkotest_model::clients::{Error, ObjectClient, Observable, ResourceIdentity, Result};
use pkotest_model::{
    Addon, AddonStatus, ClusterObjectTemplate, ClusterObjectTemplateSpec, ClusterPackage,
    ClusterPackageSpec, ConditionStatus, PackageStatus, StatusCondition,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;

/// Reads of an addon's lifetime before each step of the fake reconciler happens.
const NAMESPACE_AFTER: u32 = 2;
const TEMPLATE_AFTER: u32 = 3;
const PACKAGE_AFTER: u32 = 4;
const PACKAGE_READY_AFTER: u32 = 6;
const ADDON_MIRROR_AFTER: u32 = 8;

pub(crate) const BROKEN_IMAGE: &str = "nonExistantImage";

/// One scripted response to a fetch.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Object(Value),
    Missing,
    Fail(String),
    /// The request never completes.
    Stall,
}

impl Scripted {
    pub(crate) fn object<K: Serialize>(object: &K) -> Self {
        Scripted::Object(serde_json::to_value(object).unwrap())
    }
}

/// Ways in which the fake reconciler can misbehave.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Fault {
    None,
    /// Writes the wrong cluster id.
    WrongClusterId,
    /// Writes a snitch URL even when there is no snitch secret.
    LeakSnitch,
    /// Never picks up the PagerDuty secret.
    IgnorePagerDuty,
    /// Writes an `addonsv1` section that is not an object.
    MalformedConfig,
}

#[derive(Default)]
struct State {
    objects: HashMap<ResourceIdentity, Value>,
    scripts: HashMap<ResourceIdentity, VecDeque<Scripted>>,
    fetches: HashMap<ResourceIdentity, usize>,
    /// Reads since each addon's spec last changed, keyed by addon name.
    ticks: HashMap<String, u32>,
}

pub(crate) struct MockCluster {
    state: Mutex<State>,
    reconciler: Option<Fault>,
}

impl MockCluster {
    /// A store without a reconciler. Objects only change when a test changes them.
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            reconciler: None,
        }
    }

    /// A store in which a fake addon operator and package operator react to created addons.
    pub(crate) fn with_reconciler(fault: Fault) -> Self {
        Self {
            state: Mutex::new(State::default()),
            reconciler: Some(fault),
        }
    }

    pub(crate) fn insert<K>(&self, object: &K)
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let mut state = self.state.lock().unwrap();
        put(&mut state, object);
    }

    /// Queues responses for `identity`. Once the queue is down to its last entry, that entry is
    /// returned for every later fetch.
    pub(crate) fn script(&self, identity: &ResourceIdentity, responses: Vec<Scripted>) {
        let mut state = self.state.lock().unwrap();
        state
            .scripts
            .insert(identity.clone(), responses.into_iter().collect());
    }

    pub(crate) fn fetch_count(&self, identity: &ResourceIdentity) -> usize {
        let state = self.state.lock().unwrap();
        state.fetches.get(identity).copied().unwrap_or(0)
    }

    pub(crate) fn get<K>(&self, identity: &ResourceIdentity) -> Option<K>
    where
        K: Observable,
    {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(identity)
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    fn next_response(&self, identity: &ResourceIdentity) -> Scripted {
        let mut state = self.state.lock().unwrap();
        *state.fetches.entry(identity.clone()).or_insert(0) += 1;
        if let Some(fault) = self.reconciler {
            reconcile(&mut state, fault);
        }
        if let Some(queue) = state.scripts.get_mut(identity) {
            let next = if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            };
            if let Some(next) = next {
                return next;
            }
        }
        match state.objects.get(identity) {
            Some(value) => Scripted::Object(value.clone()),
            None => Scripted::Missing,
        }
    }
}

fn put<K>(state: &mut State, object: &K)
where
    K: Resource<DynamicType = ()> + Serialize,
{
    let identity = ResourceIdentity::of(object).unwrap();
    state
        .objects
        .insert(identity, serde_json::to_value(object).unwrap());
}

fn condition(type_: &str, status: ConditionStatus, reason: &str) -> StatusCondition {
    StatusCondition::new(type_, status, reason)
}

/// Secrets in `namespace`, by name.
fn secrets_in(state: &State, namespace: &str) -> BTreeMap<String, BTreeMap<String, Vec<u8>>> {
    state
        .objects
        .iter()
        .filter(|(id, _)| id.is_kind::<Secret>() && id.namespace() == Some(namespace))
        .filter_map(|(_, value)| serde_json::from_value::<Secret>(value.clone()).ok())
        .map(|secret| {
            let data = secret
                .data
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, v.0))
                .collect();
            (secret.metadata.name.unwrap_or_default(), data)
        })
        .collect()
}

fn package_config(
    state: &State,
    fault: Fault,
    addon_name: &str,
    namespace: &str,
) -> (Value, usize) {
    if fault == Fault::MalformedConfig {
        return (json!({"addonsv1": "targetNamespace"}), 3);
    }
    let secrets = secrets_in(state, namespace);
    let mut section = Map::new();
    section.insert("targetNamespace".into(), json!(namespace));
    let cluster_id = if fault == Fault::WrongClusterId {
        "00000000-0000-0000-0000-000000000000"
    } else {
        "a440b136-b2d6-406b-a884-fca2d62cd170"
    };
    section.insert("clusterID".into(), json!(cluster_id));
    section.insert("ocmClusterID".into(), json!("foobar"));

    let mut found = 0;
    if let Some(data) = secrets.get(&format!("addon-{}-parameters", addon_name)) {
        found += 1;
        let parameters: Map<String, Value> = data
            .iter()
            .map(|(k, v)| (k.clone(), json!(base64::encode(v))))
            .collect();
        section.insert("addonParameters".into(), Value::Object(parameters));
    }
    match secrets.get(&format!("{}-deadmanssnitch", addon_name)) {
        Some(data) => {
            found += 1;
            section.insert(
                "deadMansSnitchUrl".into(),
                json!(base64::encode(&data["SNITCH_URL"])),
            );
        }
        None if fault == Fault::LeakSnitch => {
            section.insert("deadMansSnitchUrl".into(), json!("bGVha2Vk"));
        }
        None => {}
    }
    if fault != Fault::IgnorePagerDuty {
        if let Some(data) = secrets.get(&format!("{}-pagerduty", addon_name)) {
            found += 1;
            section.insert(
                "pagerDutyKey".into(),
                json!(base64::encode(&data["PAGERDUTY_KEY"])),
            );
        }
    }
    (json!({ "addonsv1": section }), found)
}

fn reconcile(state: &mut State, fault: Fault) {
    let addons: Vec<Addon> = state
        .objects
        .iter()
        .filter(|(id, _)| id.is_kind::<Addon>())
        .filter_map(|(_, value)| serde_json::from_value(value.clone()).ok())
        .collect();

    for mut addon in addons {
        let name = addon.metadata.name.clone().unwrap_or_default();
        let tick = {
            let tick = state.ticks.entry(name.clone()).or_insert(0);
            *tick += 1;
            *tick
        };
        let namespace = addon
            .spec
            .namespaces
            .first()
            .map(|n| n.name.clone())
            .unwrap_or_default();
        let image = addon.package_image().unwrap_or_default().to_string();

        if tick >= NAMESPACE_AFTER {
            let mut ns = Namespace::default();
            ns.metadata.name = Some(namespace.clone());
            ns.status = Some(NamespaceStatus {
                phase: Some("Active".to_string()),
                ..NamespaceStatus::default()
            });
            put(state, &ns);
        }
        if tick >= TEMPLATE_AFTER {
            let template = ClusterObjectTemplate::new(
                &name,
                ClusterObjectTemplateSpec {
                    template: format!(
                        "apiVersion: package-operator.run/v1alpha1\nkind: ClusterPackage\nmetadata:\n  name: {}\nspec:\n  image: {}\n",
                        name, image
                    ),
                    sources: Vec::new(),
                },
            );
            put(state, &template);
        }
        if tick < PACKAGE_AFTER {
            continue;
        }

        if image == BROKEN_IMAGE {
            if tick >= ADDON_MIRROR_AFTER {
                addon.status = Some(AddonStatus {
                    conditions: vec![condition(
                        "Available",
                        ConditionStatus::False,
                        "UnreadyClusterPackageTemplate",
                    )],
                    ..AddonStatus::default()
                });
                put(state, &addon);
            }
            continue;
        }

        let (config, found) = package_config(state, fault, &name, &namespace);
        let invalid = image.contains("required-params") && found < 3;
        let mut package = ClusterPackage::new(
            &name,
            ClusterPackageSpec {
                image: image.clone(),
                config: Some(config),
            },
        );
        if tick >= PACKAGE_READY_AFTER {
            let conditions = if invalid {
                vec![
                    condition("Invalid", ConditionStatus::True, "MissingParameters"),
                    condition("Available", ConditionStatus::False, "Invalid"),
                ]
            } else {
                vec![condition("Available", ConditionStatus::True, "Available")]
            };
            package.status = Some(PackageStatus {
                conditions,
                ..PackageStatus::default()
            });
        }
        put(state, &package);

        if tick >= ADDON_MIRROR_AFTER {
            let available = if invalid {
                condition(
                    "Available",
                    ConditionStatus::False,
                    "UnreadyClusterPackageTemplate",
                )
            } else {
                condition("Available", ConditionStatus::True, "FullyReconciled")
            };
            addon.status = Some(AddonStatus {
                conditions: vec![available],
                ..AddonStatus::default()
            });
            put(state, &addon);
        }
    }
}

#[async_trait::async_trait]
impl ObjectClient for MockCluster {
    async fn fetch<K>(&self, identity: &ResourceIdentity) -> Result<Option<K>>
    where
        K: Observable,
    {
        match self.next_response(identity) {
            Scripted::Object(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| Error::Serde {
                    what: identity.to_string(),
                    source,
                }),
            Scripted::Missing => Ok(None),
            Scripted::Fail(message) => Err(Error::RequestFailed {
                method: "get".to_string(),
                what: identity.to_string(),
                message,
            }),
            Scripted::Stall => std::future::pending().await,
        }
    }

    async fn create<K>(&self, object: &K) -> Result<K>
    where
        K: Observable,
    {
        let identity = ResourceIdentity::of(object).unwrap();
        let mut state = self.state.lock().unwrap();
        if let Some(namespace) = identity.namespace() {
            let namespace_id = ResourceIdentity::cluster_scoped::<Namespace, _>(namespace);
            if !state.objects.contains_key(&namespace_id) {
                return Err(Error::RequestFailed {
                    method: "create".to_string(),
                    what: identity.to_string(),
                    message: format!("namespaces \"{}\" not found", namespace),
                });
            }
        }
        if state.objects.contains_key(&identity) {
            return Err(Error::RequestFailed {
                method: "create".to_string(),
                what: identity.to_string(),
                message: "already exists".to_string(),
            });
        }
        if identity.is_kind::<Addon>() {
            state.ticks.insert(identity.name().to_string(), 0);
        }
        put(&mut state, object);
        Ok(object.clone())
    }

    async fn merge_patch<K>(&self, identity: &ResourceIdentity, patch: &Value) -> Result<K>
    where
        K: Observable,
    {
        let mut state = self.state.lock().unwrap();
        let current = match state.objects.get_mut(identity) {
            Some(current) => current,
            None => {
                return Err(Error::RequestFailed {
                    method: "patch".to_string(),
                    what: identity.to_string(),
                    message: "not found".to_string(),
                })
            }
        };
        json_patch::merge(current, patch);
        let patched = current.clone();
        if identity.is_kind::<Addon>() {
            state.ticks.insert(identity.name().to_string(), 0);
        }
        serde_json::from_value(patched).map_err(|source| Error::Serde {
            what: identity.to_string(),
            source,
        })
    }

    async fn delete<K>(&self, identity: &ResourceIdentity) -> Result<bool>
    where
        K: Observable,
    {
        let mut state = self.state.lock().unwrap();
        if identity.is_kind::<Addon>() {
            state.ticks.remove(identity.name());
        }
        Ok(state.objects.remove(identity).is_some())
    }
}
