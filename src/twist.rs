//! Twist distribution across helper joints that sit between two driven joints.
//!
//! Twist helpers are not part of the humanoid joint set, so they are
//! addressed by slot index and carried as plain world poses.

use crate::error::{DeformationError, Result};
use crate::joint::JointPose;
use crate::math::{look_rotation, SQR_EPSILON};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A helper joint as authored: its world rest pose and how much twist it takes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwistJointSpec {
    pub rest: JointPose,
    /// 0 keeps the start joint's orientation, 1 takes the full end twist
    pub weight: f32,
}

/// Rest data of one helper joint, captured by `TwistDistribution::setup`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwistJoint {
    pub weight: f32,
    /// Rest rotation relative to the start joint
    pub rest_local_rotation: Quat,
    /// Helper's rest up axis expressed in the end joint's rest frame
    pub up_axis: Vec3,
    /// Fraction along start -> end where the helper sits, in [0, 1]
    pub spacing: f32,
    /// Rest rotation relative to the segment's look frame
    pub axis_offset: Quat,
}

/// Spreads the twist between a start and an end joint over helper joints.
#[derive(Debug, Clone, PartialEq)]
pub struct TwistDistribution {
    joints: Vec<TwistJoint>,
}

impl TwistDistribution {
    /// Capture helper rest data against the rest poses of the segment ends.
    pub fn setup(start: JointPose, end: JointPose, joints: &[TwistJointSpec]) -> Result<Self> {
        let segment = end.position - start.position;
        let length_sq = segment.length_squared();
        if length_sq < SQR_EPSILON {
            return Err(DeformationError::TwistSegmentDegenerate);
        }

        let joints = joints
            .iter()
            .map(|spec| {
                let up = spec.rest.rotation * Vec3::Y;
                let spacing = ((spec.rest.position - start.position).dot(segment) / length_sq).clamp(0.0, 1.0);
                TwistJoint {
                    weight: spec.weight,
                    rest_local_rotation: (start.rotation.inverse() * spec.rest.rotation).normalize(),
                    up_axis: end.rotation.inverse() * up,
                    spacing,
                    axis_offset: (look_rotation(segment, up).inverse() * spec.rest.rotation).normalize(),
                }
            })
            .collect();

        Ok(Self { joints })
    }

    pub fn joints(&self) -> &[TwistJoint] {
        &self.joints
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Pose every helper from the current start and end poses. The result
    /// only depends on the inputs, so repeated calls give the same output.
    ///
    /// `out` must have one slot per helper; extra slots are left alone.
    pub fn apply(&self, start: &JointPose, end: &JointPose, weight: f32, out: &mut [JointPose]) {
        let direction = end.position - start.position;
        for (joint, slot) in self.joints.iter().zip(out.iter_mut()) {
            let untwisted = start.rotation * joint.rest_local_rotation;
            let twisted = look_rotation(direction, end.rotation * joint.up_axis) * joint.axis_offset;
            *slot = JointPose::new(
                start.position.lerp(end.position, joint.spacing),
                untwisted.slerp(twisted, joint.weight * weight).normalize(),
            );
        }
    }

    /// Allocating form of `apply`
    pub fn evaluate(&self, start: &JointPose, end: &JointPose, weight: f32) -> Vec<JointPose> {
        let mut out = vec![JointPose::IDENTITY; self.joints.len()];
        self.apply(start, end, weight, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn forearm() -> (JointPose, JointPose, TwistDistribution) {
        let start = JointPose::from_position(Vec3::ZERO);
        let end = JointPose::from_position(Vec3::new(0.3, 0.0, 0.0));
        let specs = [
            TwistJointSpec {
                rest: JointPose::from_position(Vec3::new(0.1, 0.0, 0.0)),
                weight: 0.5,
            },
            TwistJointSpec {
                rest: JointPose::from_position(Vec3::new(0.2, 0.02, 0.0)),
                weight: 1.0,
            },
        ];
        let twist = TwistDistribution::setup(start, end, &specs).unwrap();
        (start, end, twist)
    }

    #[test]
    fn test_setup_spacing() {
        let (_, _, twist) = forearm();
        assert_eq!(twist.len(), 2);
        assert!((twist.joints()[0].spacing - 1.0 / 3.0).abs() < 1e-5);
        assert!((twist.joints()[1].spacing - 2.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_rest_pose_reproduces_rest_rotation() {
        let (start, end, twist) = forearm();
        for pose in twist.evaluate(&start, &end, 1.0) {
            assert!(pose.rotation.angle_between(Quat::IDENTITY) < 1e-4);
        }
    }

    #[test]
    fn test_twist_is_split_by_weight() {
        let (start, mut end, twist) = forearm();
        end.rotation = Quat::from_rotation_x(FRAC_PI_2);
        let out = twist.evaluate(&start, &end, 1.0);

        assert!(out[0].rotation.angle_between(Quat::from_rotation_x(FRAC_PI_2 * 0.5)) < 1e-4);
        assert!(out[1].rotation.angle_between(end.rotation) < 1e-4);

        let halved = twist.evaluate(&start, &end, 0.5);
        assert!(halved[1].rotation.angle_between(Quat::from_rotation_x(FRAC_PI_2 * 0.5)) < 1e-4);
    }

    #[test]
    fn test_positions_follow_segment() {
        let (start, mut end, twist) = forearm();
        end.position = Vec3::new(0.0, 0.6, 0.0);
        let out = twist.evaluate(&start, &end, 1.0);
        assert!(out[0].position.distance(Vec3::new(0.0, 0.2, 0.0)) < 1e-5);
        assert!(out[1].position.distance(Vec3::new(0.0, 0.4, 0.0)) < 1e-5);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let (start, mut end, twist) = forearm();
        end.rotation = Quat::from_rotation_x(1.1);
        end.position = Vec3::new(0.25, 0.1, 0.05);

        let mut out = [JointPose::IDENTITY; 2];
        twist.apply(&start, &end, 0.8, &mut out);
        let first = out;
        twist.apply(&start, &end, 0.8, &mut out);
        assert_eq!(first, out);
    }

    #[test]
    fn test_degenerate_segment_rejected() {
        let pose = JointPose::from_position(Vec3::ONE);
        assert!(matches!(
            TwistDistribution::setup(pose, pose, &[]),
            Err(DeformationError::TwistSegmentDegenerate)
        ));
    }
}
