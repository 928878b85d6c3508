use crate::error::{DeformationError, Result};
use crate::joint::{JointId, Pose};
use crate::skeleton::Skeleton;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How the hips correction spreads to the rest of the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HipPropagation {
    /// Every joint after the hips moves with them
    Rigid,
    /// Only the first `affected_joints` properties move, each by its offset
    /// weight; the rest stay tracked and get their constraint weight raised
    /// when pulled away.
    #[serde(rename_all = "camelCase")]
    Decreasing { affected_joints: usize },
}

impl Default for HipPropagation {
    fn default() -> Self {
        Self::Decreasing { affected_joints: 3 }
    }
}

/// Runtime options of the hip pinning solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HipPinningSettings {
    /// Let the hips move inside a box around the calibrated position
    pub constrained_movement: bool,
    /// Half extents of that box
    pub movement_bounds: Vec3,
    pub propagation: HipPropagation,
    /// Clamp hips yaw to the calibrated limits
    pub limit_yaw: bool,
    /// Tracked hips farther than this from the calibrated position end pinning
    pub leave_range: Option<f32>,
}

impl Default for HipPinningSettings {
    fn default() -> Self {
        Self {
            constrained_movement: true,
            movement_bounds: Vec3::new(0.1, 0.05, 0.1),
            propagation: HipPropagation::default(),
            limit_yaw: false,
            leave_range: Some(0.4),
        }
    }
}

impl HipPinningSettings {
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("movementBounds.x", self.movement_bounds.x),
            ("movementBounds.y", self.movement_bounds.y),
            ("movementBounds.z", self.movement_bounds.z),
            ("leaveRange", self.leave_range.unwrap_or(0.0)),
        ] {
            if value < 0.0 {
                return Err(DeformationError::NegativeExtent { name, value });
            }
        }
        Ok(())
    }
}

/// Per-joint tuning used by decreasing propagation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyJointProperties {
    pub joint: JointId,
    /// Rotation relative to the parent at calibration
    pub rest_local_rotation: Quat,
    /// Base weight of the joint's external position constraint
    pub constraint_weight: f32,
    /// Share of the hips correction this joint receives
    pub offset_weight: f32,
    /// Distance from the pinned hips past which the constraint weight grows
    pub distance_threshold: f32,
    /// Constraint weight added per meter past the threshold
    pub weight_scale: f32,
}

/// Calibrated rotation window of the hips, degrees from the rest rotation.
/// Only the Y (yaw) range is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationLimits {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for RotationLimits {
    fn default() -> Self {
        Self {
            min: Vec3::new(-30.0, -60.0, -30.0),
            max: Vec3::new(30.0, 60.0, 30.0),
        }
    }
}

/// Ordered joint properties plus the hips rotation limits.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HipPinningProperties {
    pub joints: Vec<BodyJointProperties>,
    pub limits: RotationLimits,
}

impl HipPinningProperties {
    /// Properties for every present joint after the hips, in topological
    /// order. Offset weights fall off linearly from 1 and thresholds sit at
    /// each joint's rest distance from the hips.
    pub fn from_rest(skeleton: &Skeleton, rest: &Pose) -> Self {
        let hips = rest.position(JointId::Hips);
        let body: Vec<JointId> = skeleton
            .present()
            .without(JointId::Hips)
            .iter()
            .collect();
        let count = body.len().max(1) as f32;
        let joints = body
            .iter()
            .enumerate()
            .map(|(i, joint)| BodyJointProperties {
                joint: *joint,
                rest_local_rotation: skeleton.local_of(rest, *joint).rotation,
                constraint_weight: 1.0,
                offset_weight: 1.0 - i as f32 / count,
                distance_threshold: rest.position(*joint).distance(hips),
                weight_scale: 1.0,
            })
            .collect();
        Self {
            joints,
            limits: RotationLimits::default(),
        }
    }
}
