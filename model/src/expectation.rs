/*!

The config expectation model: which keys the `addonsv1` section of a `ClusterPackage` config must
hold for a given combination of present secrets, and the comparison of an observed payload
against that expectation. Nothing in here touches the cluster.

!*/

use crate::constants::{
    CLUSTER_ID_VALUE, CONFIG_ROOT_KEY, DEAD_MANS_SNITCH_URL_VALUE, OCM_CLUSTER_ID_VALUE,
    PAGER_DUTY_KEY_VALUE, PARAMETER_FOO1, PARAMETER_FOO2,
};
use crate::wait::Verdict;
use log::trace;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_plain::{derive_display_from_serialize, derive_fromstr_from_deserialize};
use snafu::{ensure, OptionExt, Snafu};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// Which of the optional secrets exist for a scenario. The same value drives fixture creation and
/// the expected config.
#[derive(Serialize, Deserialize, Debug, Default, Clone, Copy, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct PresenceFlags {
    pub parameters_secret_present: bool,
    pub snitch_secret_present: bool,
    pub pager_duty_key_present: bool,
}

impl PresenceFlags {
    pub const NONE: PresenceFlags = PresenceFlags::new(false, false, false);
    pub const ALL: PresenceFlags = PresenceFlags::new(true, true, true);

    pub const fn new(parameters: bool, snitch: bool, pager_duty: bool) -> Self {
        Self {
            parameters_secret_present: parameters,
            snitch_secret_present: snitch,
            pager_duty_key_present: pager_duty,
        }
    }

    pub fn all_present(&self) -> bool {
        self.parameters_secret_present && self.snitch_secret_present && self.pager_duty_key_present
    }
}

impl Display for PresenceFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mark = |present: bool| if present { '+' } else { '-' };
        write!(
            f,
            "{}parameters {}snitch {}pagerduty",
            mark(self.parameters_secret_present),
            mark(self.snitch_secret_present),
            mark(self.pager_duty_key_present)
        )
    }
}

/// The keys of the `addonsv1` config section, named as they appear on the wire.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
pub enum ConfigKey {
    #[serde(rename = "targetNamespace")]
    TargetNamespace,
    #[serde(rename = "clusterID")]
    ClusterId,
    #[serde(rename = "ocmClusterID")]
    OcmClusterId,
    #[serde(rename = "addonParameters")]
    AddonParameters,
    #[serde(rename = "deadMansSnitchUrl")]
    DeadMansSnitchUrl,
    #[serde(rename = "pagerDutyKey")]
    PagerDutyKey,
}

derive_display_from_serialize!(ConfigKey);
derive_fromstr_from_deserialize!(ConfigKey);

impl ConfigKey {
    pub const ALL: [ConfigKey; 6] = [
        ConfigKey::TargetNamespace,
        ConfigKey::ClusterId,
        ConfigKey::OcmClusterId,
        ConfigKey::AddonParameters,
        ConfigKey::DeadMansSnitchUrl,
        ConfigKey::PagerDutyKey,
    ];

    pub fn is_required(&self) -> bool {
        matches!(
            self,
            ConfigKey::TargetNamespace | ConfigKey::ClusterId | ConfigKey::OcmClusterId
        )
    }

    /// Whether the key belongs in the config for the given flags.
    pub fn is_expected(&self, flags: &PresenceFlags) -> bool {
        match self {
            ConfigKey::TargetNamespace | ConfigKey::ClusterId | ConfigKey::OcmClusterId => true,
            ConfigKey::AddonParameters => flags.parameters_secret_present,
            ConfigKey::DeadMansSnitchUrl => flags.snitch_secret_present,
            ConfigKey::PagerDutyKey => flags.pager_duty_key_present,
        }
    }
}

/// The value a config key must hold.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ExpectedValue {
    /// Compared verbatim.
    Plain(String),
    /// Held on the wire as the standard base64 encoding of the plaintext.
    Base64(String),
    /// A JSON object whose values are the base64 encoding of the given plaintexts.
    Base64Object(BTreeMap<String, String>),
}

impl ExpectedValue {
    /// The JSON value the reconciler is expected to write.
    pub fn to_json(&self) -> Value {
        match self {
            ExpectedValue::Plain(value) => Value::String(value.clone()),
            ExpectedValue::Base64(plaintext) => Value::String(base64::encode(plaintext)),
            ExpectedValue::Base64Object(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), Value::String(base64::encode(v))))
                    .collect(),
            ),
        }
    }

    pub fn matches(&self, observed: &Value) -> bool {
        &self.to_json() == observed
    }
}

/// Failures that make a config payload wrong rather than not-yet-converged.
#[derive(Debug, Snafu, Clone, Eq, PartialEq)]
#[snafu(visibility(pub(crate)))]
pub enum ExpectationError {
    #[snafu(display("Malformed config payload: {}", message))]
    MalformedPayload { message: String },

    #[snafu(display("Required key '{}' is missing from the config", key))]
    MissingRequiredKey { key: ConfigKey },

    #[snafu(display("Key '{}' should not be present but has value {}", key, actual))]
    UnexpectedKey { key: ConfigKey, actual: Value },

    #[snafu(display("Key '{}' expected {} but was {}", key, expected, actual))]
    ValueMismatch {
        key: ConfigKey,
        expected: Value,
        actual: Value,
    },
}

/// The complete expected `addonsv1` section for one set of flags.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ExpectedConfig {
    entries: BTreeMap<ConfigKey, ExpectedValue>,
}

/// Computes the keys and values the `addonsv1` section must hold for `flags` when the addon
/// targets `namespace`.
pub fn expected_config(flags: PresenceFlags, namespace: &str) -> ExpectedConfig {
    let entries = ConfigKey::ALL
        .iter()
        .filter(|key| key.is_expected(&flags))
        .map(|key| {
            let value = match key {
                ConfigKey::TargetNamespace => ExpectedValue::Plain(namespace.to_string()),
                ConfigKey::ClusterId => ExpectedValue::Plain(CLUSTER_ID_VALUE.to_string()),
                ConfigKey::OcmClusterId => ExpectedValue::Plain(OCM_CLUSTER_ID_VALUE.to_string()),
                ConfigKey::AddonParameters => ExpectedValue::Base64Object(
                    [PARAMETER_FOO1, PARAMETER_FOO2]
                        .iter()
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ),
                ConfigKey::DeadMansSnitchUrl => {
                    ExpectedValue::Base64(DEAD_MANS_SNITCH_URL_VALUE.to_string())
                }
                ConfigKey::PagerDutyKey => ExpectedValue::Base64(PAGER_DUTY_KEY_VALUE.to_string()),
            };
            (*key, value)
        })
        .collect();
    ExpectedConfig { entries }
}

impl ExpectedConfig {
    pub fn get(&self, key: ConfigKey) -> Option<&ExpectedValue> {
        self.entries.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ConfigKey> + '_ {
        self.entries.keys().copied()
    }

    /// The full config payload, `{"addonsv1": {...}}`, that satisfies this expectation.
    pub fn to_payload(&self) -> Value {
        let section: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_json()))
            .collect();
        let mut root = Map::new();
        root.insert(CONFIG_ROOT_KEY.to_string(), Value::Object(section));
        Value::Object(root)
    }

    /// Compares an observed `spec.config` against the expectation.
    ///
    /// A config that is absent, lacks the `addonsv1` section, or is missing an expected optional
    /// key has not converged yet. A payload that is not a two-level JSON object, a missing
    /// required key, an optional key that should be absent, or a wrong value is an error. Keys
    /// outside of [`ConfigKey`] are ignored.
    pub fn compare(&self, config: Option<&Value>) -> Result<Verdict, ExpectationError> {
        let section = match decode_section(config)? {
            Some(section) => section,
            None => return Ok(Verdict::pending(format!("no '{}' config", CONFIG_ROOT_KEY))),
        };

        for (name, actual) in section {
            let key = match name.parse::<ConfigKey>() {
                Ok(key) => key,
                Err(_) => {
                    trace!("Ignoring unknown config key '{}'", name);
                    continue;
                }
            };
            ensure!(
                self.entries.contains_key(&key),
                UnexpectedKeySnafu {
                    key,
                    actual: actual.clone()
                }
            );
        }

        let mut missing = Vec::new();
        for (key, expected) in &self.entries {
            let actual = match section.get(&key.to_string()) {
                Some(actual) => actual,
                None => {
                    ensure!(!key.is_required(), MissingRequiredKeySnafu { key: *key });
                    missing.push(key.to_string());
                    continue;
                }
            };
            ensure!(
                expected.matches(actual),
                ValueMismatchSnafu {
                    key: *key,
                    expected: expected.to_json(),
                    actual: actual.clone(),
                }
            );
        }

        if missing.is_empty() {
            Ok(Verdict::Done)
        } else {
            Ok(Verdict::pending(format!(
                "waiting for config keys {}",
                missing.join(", ")
            )))
        }
    }
}

/// Finds the `addonsv1` section. Every top-level value of the config must be an object.
fn decode_section(config: Option<&Value>) -> Result<Option<&Map<String, Value>>, ExpectationError> {
    let root = match config {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value.as_object().context(MalformedPayloadSnafu {
            message: format!("expected an object but found {}", value),
        })?,
    };
    for (name, value) in root {
        ensure!(
            value.is_object(),
            MalformedPayloadSnafu {
                message: format!("'{}' is not an object: {}", name, value),
            }
        );
    }
    Ok(root.get(CONFIG_ROOT_KEY).and_then(Value::as_object))
}
