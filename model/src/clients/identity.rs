use kube::Resource;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// The key that the poller and the clients use to address one object: its kind, name and, for
/// namespaced kinds, its namespace. Identities are immutable once built.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct ResourceIdentity {
    kind: String,
    name: String,
    namespace: Option<String>,
}

impl ResourceIdentity {
    /// The identity of a cluster-scoped object of kind `K`.
    pub fn cluster_scoped<K, S>(name: S) -> Self
    where
        K: Resource<DynamicType = ()>,
        S: Into<String>,
    {
        Self {
            kind: K::kind(&()).to_string(),
            name: name.into(),
            namespace: None,
        }
    }

    /// The identity of a namespaced object of kind `K`.
    pub fn namespaced<K, S1, S2>(name: S1, namespace: S2) -> Self
    where
        K: Resource<DynamicType = ()>,
        S1: Into<String>,
        S2: Into<String>,
    {
        Self {
            kind: K::kind(&()).to_string(),
            name: name.into(),
            namespace: Some(namespace.into()),
        }
    }

    /// Builds the identity from an object's own metadata. Returns `None` when the object has no
    /// name.
    pub fn of<K>(object: &K) -> Option<Self>
    where
        K: Resource<DynamicType = ()>,
    {
        let meta = object.meta();
        Some(Self {
            kind: K::kind(&()).to_string(),
            name: meta.name.clone()?,
            namespace: meta.namespace.clone(),
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Whether this identity addresses objects of kind `K`.
    pub fn is_kind<K>(&self) -> bool
    where
        K: Resource<DynamicType = ()>,
    {
        self.kind == K::kind(&())
    }
}

impl Display for ResourceIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{} '{}/{}'", self.kind, namespace, self.name),
            None => write!(f, "{} '{}'", self.kind, self.name),
        }
    }
}
