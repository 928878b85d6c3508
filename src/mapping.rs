//! Static lookup tables between joint naming conventions.

use crate::joint::JointId;
use serde::{Deserialize, Serialize};

/// Naming convention used by an external skeleton description.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingConvention {
    /// `JointId` variant names (`SpineLower`, `LeftThumbMetacarpal`, ...)
    #[default]
    Canonical,
    /// Unity `HumanBodyBones` names. Its `Spine`/`Chest`/`UpperChest` are our
    /// `SpineLower`/`SpineUpper`/`Chest`, and its thumb starts at `Proximal`.
    UnityHumanoid,
}

/// Unity `HumanBodyBones` name for every joint, indexed by `JointId`
const UNITY_HUMANOID_NAMES: [&str; JointId::COUNT] = [
    "Hips",
    "Spine",
    "Chest",
    "UpperChest",
    "Neck",
    "Head",
    "LeftShoulder",
    "LeftUpperArm",
    "LeftLowerArm",
    "LeftHand",
    "RightShoulder",
    "RightUpperArm",
    "RightLowerArm",
    "RightHand",
    "LeftUpperLeg",
    "LeftLowerLeg",
    "LeftFoot",
    "RightUpperLeg",
    "RightLowerLeg",
    "RightFoot",
    "LeftThumbProximal",
    "LeftThumbIntermediate",
    "LeftThumbDistal",
    "LeftIndexProximal",
    "LeftIndexIntermediate",
    "LeftIndexDistal",
    "LeftMiddleProximal",
    "LeftMiddleIntermediate",
    "LeftMiddleDistal",
    "LeftRingProximal",
    "LeftRingIntermediate",
    "LeftRingDistal",
    "LeftLittleProximal",
    "LeftLittleIntermediate",
    "LeftLittleDistal",
    "RightThumbProximal",
    "RightThumbIntermediate",
    "RightThumbDistal",
    "RightIndexProximal",
    "RightIndexIntermediate",
    "RightIndexDistal",
    "RightMiddleProximal",
    "RightMiddleIntermediate",
    "RightMiddleDistal",
    "RightRingProximal",
    "RightRingIntermediate",
    "RightRingDistal",
    "RightLittleProximal",
    "RightLittleIntermediate",
    "RightLittleDistal",
];

/// Name of `joint` under `convention`
pub fn joint_name(joint: JointId, convention: NamingConvention) -> &'static str {
    match convention {
        NamingConvention::Canonical => joint.name(),
        NamingConvention::UnityHumanoid => UNITY_HUMANOID_NAMES[joint.index()],
    }
}

/// Resolve a joint name under `convention`. Matching is exact.
pub fn joint_from_name(name: &str, convention: NamingConvention) -> Option<JointId> {
    JointId::ALL
        .into_iter()
        .find(|joint| joint_name(*joint, convention) == name)
}

/// Translate a name from one convention to another
pub fn translate_name(
    name: &str,
    from: NamingConvention,
    to: NamingConvention,
) -> Option<&'static str> {
    joint_from_name(name, from).map(|joint| joint_name(joint, to))
}
