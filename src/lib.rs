//! Retarget Deform - humanoid pose deformation core
//!
//! Keeps a tracked humanoid pose at the proportions of a target rig: spine
//! alignment, proportion enforcement, spine translation correction, arm and
//! hand blending, plus two-bone IK, twist distribution, hip pinning and
//! mirrored copies. Poses are plain world-space joint buffers; wasm32 builds
//! expose a handle-based session API.

#[cfg(target_arch = "wasm32")]
pub mod bindings;
pub mod deformation;
pub mod error;
pub mod hand;
pub mod hip_pinning;
pub mod ik;
pub mod joint;
pub mod mapping;
pub mod math;
pub mod mirror;
pub mod skeleton;
pub mod skeleton_constants;
pub mod twist;

pub use deformation::{
    DeformationEngine, DeformationSettings, DeformationWeights, ShoulderBlendSpace,
    SpineCorrectionPolicy, SpineTargets,
};
pub use error::{DeformationError, Result};
pub use glam::{Quat, Vec3};
pub use hand::HandDeformation;
pub use hip_pinning::{HipPinning, HipPinningEvent, HipPinningSettings, HipPropagation};
pub use ik::{solve_two_bone_ik, TwoBoneIkSettings, TwoBoneIkSolution};
pub use joint::{JointId, JointMask, JointPose, Pose, Side};
pub use mapping::NamingConvention;
pub use skeleton::Skeleton;
pub use twist::{TwistDistribution, TwistJointSpec};

#[cfg(target_arch = "wasm32")]
pub use bindings::{
    bone_pair_info, create_deformation_session, destroy_deformation_session, evaluate_deformation,
    joint_count, set_deformation_scale, set_deformation_settings,
};
