/*!

Provides utilities for running the conformance scenarios against a live cluster that already runs
the addon operator and the package operator. We call this testing modality `selftest` to
distinguish it from the scenarios themselves.

!*/

pub mod cluster;
mod test_settings;

pub use cluster::Cluster;
pub use test_settings::TestSettings;
