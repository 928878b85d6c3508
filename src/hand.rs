//! Finger proportion enforcement.

use crate::joint::{Finger, JointId, JointMask, Pose, Side, FINGER_SEGMENTS};
use crate::mirror::copy_mirrored;
use crate::skeleton::Skeleton;
use glam::Vec3;

/// One finger from the wrist outwards, with rest bone lengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerChain {
    pub side: Side,
    pub finger: Finger,
    /// Hand followed by the finger's segments
    pub joints: [JointId; FINGER_SEGMENTS + 1],
    pub distances: [f32; FINGER_SEGMENTS],
    /// Unit segment directions in each segment start's rest frame
    pub rest_directions: [Vec3; FINGER_SEGMENTS],
}

/// Keeps tracked fingers at the rig's finger lengths.
#[derive(Debug, Clone, Default)]
pub struct HandDeformation {
    chains: Vec<FingerChain>,
}

impl HandDeformation {
    /// Capture every finger whose hand and segments are all present.
    /// Incomplete fingers are skipped and pass through.
    pub fn bind(skeleton: &Skeleton, rest: &Pose) -> Self {
        let mut chains = Vec::new();
        for side in Side::BOTH {
            let [_, _, hand] = JointId::arm(side);
            for finger in Finger::ALL {
                let [a, b, c] = JointId::finger(side, finger);
                let joints = [hand, a, b, c];
                if joints.iter().any(|joint| !skeleton.contains(*joint)) {
                    log::debug!("Skipping {:?} {:?} finger, chain incomplete", side, finger);
                    continue;
                }
                let mut distances = [0.0; FINGER_SEGMENTS];
                let mut rest_directions = [Vec3::ZERO; FINGER_SEGMENTS];
                for i in 0..FINGER_SEGMENTS {
                    let segment = rest.position(joints[i + 1]) - rest.position(joints[i]);
                    distances[i] = segment.length();
                    rest_directions[i] = (rest.rotation(joints[i]).inverse() * segment).normalize_or_zero();
                }
                chains.push(FingerChain {
                    side,
                    finger,
                    joints,
                    distances,
                    rest_directions,
                });
            }
        }
        Self { chains }
    }

    pub fn chains(&self) -> &[FingerChain] {
        &self.chains
    }

    /// Rescale every finger segment to its rest length along the tracked
    /// direction, wrist first. `weight` 0 leaves the pose untouched.
    pub fn apply(&self, pose: &mut Pose, weight: f32) {
        if weight == 0.0 {
            return;
        }
        for chain in &self.chains {
            for i in 0..FINGER_SEGMENTS {
                let start = pose[chain.joints[i]];
                let end = chain.joints[i + 1];
                let direction = (pose.position(end) - start.position)
                    .try_normalize()
                    .unwrap_or_else(|| start.rotation * chain.rest_directions[i]);
                let target = start.position + direction * chain.distances[i];
                let blended = pose.position(end).lerp(target, weight);
                pose.set_position(end, blended);
            }
        }
    }

    /// Give the fingers of the side opposite `source` the mirrored local
    /// shape of `source`'s fingers.
    pub fn apply_mirrored(&self, skeleton: &Skeleton, pose: &mut Pose, source: Side) {
        let target_side = match source {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        let joints: Vec<JointId> = self
            .chains
            .iter()
            .filter(|chain| chain.side == target_side)
            .flat_map(|chain| chain.joints[1..].iter().copied())
            .collect();
        let snapshot = pose.clone();
        copy_mirrored(skeleton, &snapshot, pose, JointMask::from_joints(&joints));
    }
}
