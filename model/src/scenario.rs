use crate::clients::ResourceIdentity;
use crate::constants::{
    CONDITION_AVAILABLE, CONDITION_INVALID, PKO_IMAGE_OPTIONAL_PARAMS, PKO_IMAGE_REQUIRED_PARAMS,
    SCENARIO_ADDON_NAME, SCENARIO_ADDON_NAMESPACE,
};
use crate::expectation::PresenceFlags;
use crate::{Addon, ClusterPackage};
use serde::{Deserialize, Serialize};
use serde_plain::derive_display_from_serialize;

/// The two test packages. One treats every injected parameter as optional, the other requires
/// all of them.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum SourceImage {
    OptionalParams,
    RequiredParams,
}

derive_display_from_serialize!(SourceImage);

/// The status the generated `ClusterPackage` is expected to settle in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum TerminalStatus {
    Available,
    Invalid,
}

derive_display_from_serialize!(TerminalStatus);

impl TerminalStatus {
    /// The package condition type that is `True` in this status.
    pub fn condition_type(&self) -> &'static str {
        match self {
            TerminalStatus::Available => CONDITION_AVAILABLE,
            TerminalStatus::Invalid => CONDITION_INVALID,
        }
    }
}

/// Image references for the two source images.
#[derive(Serialize, Deserialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImageSet {
    pub optional_params: String,
    pub required_params: String,
}

impl Default for ImageSet {
    fn default() -> Self {
        Self {
            optional_params: PKO_IMAGE_OPTIONAL_PARAMS.to_string(),
            required_params: PKO_IMAGE_REQUIRED_PARAMS.to_string(),
        }
    }
}

impl ImageSet {
    pub fn image(&self, source_image: SourceImage) -> &str {
        match source_image {
            SourceImage::OptionalParams => &self.optional_params,
            SourceImage::RequiredParams => &self.required_params,
        }
    }
}

/// One row of the scenario table.
#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    /// Position in the table, used to derive per-scenario object names.
    pub index: usize,
    pub name: String,
    pub source_image: SourceImage,
    pub flags: PresenceFlags,
    pub expected: TerminalStatus,
}

impl Scenario {
    /// The name of this scenario's `Addon` and of the `ClusterPackage` generated for it.
    pub fn addon_name(&self) -> String {
        format!("{}-{}", SCENARIO_ADDON_NAME, self.index)
    }

    /// The namespace this scenario's addon is installed into.
    pub fn namespace(&self) -> String {
        format!("{}-{}", SCENARIO_ADDON_NAMESPACE, self.index)
    }

    pub fn addon_identity(&self) -> ResourceIdentity {
        ResourceIdentity::cluster_scoped::<Addon, _>(self.addon_name())
    }

    pub fn package_identity(&self) -> ResourceIdentity {
        ResourceIdentity::cluster_scoped::<ClusterPackage, _>(self.addon_name())
    }
}

/// The ordered combinations of present secrets used for each image. Each row leaves out one
/// secret, except the first (all absent) and the last (all present).
const FLAG_ROWS: [(&str, PresenceFlags); 5] = [
    ("AllMissing", PresenceFlags::new(false, false, false)),
    ("1stMissing", PresenceFlags::new(false, true, true)),
    ("2ndMissing", PresenceFlags::new(true, false, true)),
    ("3rdMissing", PresenceFlags::new(true, true, false)),
    ("AllPresent", PresenceFlags::new(true, true, true)),
];

/// The expected terminal status for a source image and set of flags. The required-params package
/// only becomes available once every secret is present.
pub fn expected_status(source_image: SourceImage, flags: &PresenceFlags) -> TerminalStatus {
    match source_image {
        SourceImage::OptionalParams => TerminalStatus::Available,
        SourceImage::RequiredParams if flags.all_present() => TerminalStatus::Available,
        SourceImage::RequiredParams => TerminalStatus::Invalid,
    }
}

/// All ten scenarios in order.
pub fn scenario_table() -> Vec<Scenario> {
    [SourceImage::OptionalParams, SourceImage::RequiredParams]
        .iter()
        .flat_map(|source_image| {
            FLAG_ROWS
                .iter()
                .map(move |(suffix, flags)| (*source_image, *suffix, *flags))
        })
        .enumerate()
        .map(|(index, (source_image, suffix, flags))| Scenario {
            index,
            name: format!("{}{}", source_image, suffix),
            source_image,
            flags,
            expected: expected_status(source_image, &flags),
        })
        .collect()
}
