/*!

This library provides the models of the addon operator and package operator custom resources, an
identity-addressed client for them, a condition poller, and the parameter injection conformance
scenarios built on top of those.

!*/

#![deny(
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::panicking_unwrap,
    clippy::unwrap_in_result,
    clippy::unwrap_used
)]

pub use addon::{
    Addon, AddonInstallOlmCommon, AddonInstallSpec, AddonInstallType, AddonNamespace,
    AddonPackageOperator, AddonSpec, AddonStatus, EnvObject, SubscriptionConfig,
};
pub use condition::{ConditionStatus, HasConditions, StatusCondition};
pub use convergence::{verify_scenario, verify_status_propagation, FailureKind, PropagationCheck};
pub use crd_ext::CrdExt;
pub use expectation::{expected_config, ConfigKey, ExpectedConfig, ExpectedValue, PresenceFlags};
pub use fixtures::InstallSettings;
pub use package::{
    ClusterObjectTemplate, ClusterObjectTemplateSpec, ClusterPackage, ClusterPackageSpec,
    ObjectTemplateSource, ObjectTemplateSourceItem, PackageStatus,
};
pub use report::{scenario_list, ScenarioOutcome, SuiteReport};
pub use runner::{SuiteConfig, SuiteRunner};
pub use scenario::{scenario_table, ImageSet, Scenario, SourceImage, TerminalStatus};

mod addon;
pub mod clients;
pub mod condition;
pub mod constants;
pub mod convergence;
mod crd_ext;
pub mod expectation;
pub mod fixtures;
mod package;
mod report;
mod runner;
pub mod scenario;
pub mod wait;
