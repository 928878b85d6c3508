use super::arm::ArmChain;
use crate::error::{DeformationError, Result};
use crate::joint::{JointId, Pose, Side};
use crate::math::EPSILON;
use crate::skeleton::Skeleton;
use glam::Vec3;
use std::ops::Range;

/// Rest-pose distance between two adjacent joints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BonePair {
    pub start: JointId,
    pub end: JointId,
    /// Rest distance in meters, never negative
    pub distance: f32,
    /// `distance` over the total hips -> head rest distance
    pub height_proportion: f32,
    /// Spine pairs: same as `height_proportion`. Arm pairs: `distance` over
    /// the arm chain's rest length.
    pub limb_proportion: f32,
    /// Unit start -> end direction in the start joint's rest frame, used when
    /// tracked start and end coincide
    pub rest_direction: Vec3,
}

/// Highest present spine joint, which stands in for the chest when the chest
/// itself is missing.
pub fn chest_reference(skeleton: &Skeleton) -> Option<JointId> {
    skeleton.first_present(&[
        JointId::Chest,
        JointId::SpineUpper,
        JointId::SpineLower,
        JointId::Hips,
    ])
}

/// All bone pairs of a bound rig, in evaluation order: the spine chain
/// first, then each usable arm from the chest outwards. Every pair's start is
/// either the hips or the end of an earlier pair.
#[derive(Debug, Clone)]
pub struct BonePairs {
    pairs: Vec<BonePair>,
    spine: Range<usize>,
    arms: [Range<usize>; 2],
    total_height: f32,
}

impl BonePairs {
    pub fn build(skeleton: &Skeleton, rest: &Pose, arms: &[Option<ArmChain>; 2]) -> Result<Self> {
        for required in [JointId::Hips, JointId::Head] {
            if !skeleton.contains(required) {
                return Err(DeformationError::MissingJoint(required));
            }
        }
        let chest = chest_reference(skeleton).ok_or(DeformationError::MissingJoint(JointId::Hips))?;

        let distance = |start: JointId, end: JointId| rest.position(start).distance(rest.position(end));
        let rest_direction = |start: JointId, end: JointId| {
            (rest.rotation(start).inverse() * (rest.position(end) - rest.position(start)))
                .normalize_or_zero()
        };

        let spine_chain: Vec<JointId> = JointId::SPINE_CHAIN
            .into_iter()
            .filter(|joint| skeleton.contains(*joint))
            .collect();
        let spine_distances: Vec<(JointId, JointId, f32)> = spine_chain
            .windows(2)
            .map(|pair| (pair[0], pair[1], distance(pair[0], pair[1])))
            .collect();
        let total_height: f32 = spine_distances.iter().map(|(_, _, d)| d).sum();
        if total_height <= EPSILON {
            return Err(DeformationError::DegenerateSpine);
        }

        let mut pairs: Vec<BonePair> = spine_distances
            .into_iter()
            .map(|(start, end, distance)| BonePair {
                start,
                end,
                distance,
                height_proportion: distance / total_height,
                limb_proportion: distance / total_height,
                rest_direction: rest_direction(start, end),
            })
            .collect();
        let spine = 0..pairs.len();

        let mut arm_ranges = [0..0, 0..0];
        for side in Side::BOTH {
            let Some(arm) = &arms[side.index()] else {
                continue;
            };
            let chain: Vec<JointId> = [Some(chest), arm.shoulder]
                .into_iter()
                .flatten()
                .chain(arm.limb())
                .collect();
            let distances: Vec<f32> = chain.windows(2).map(|p| distance(p[0], p[1])).collect();
            let arm_length: f32 = distances.iter().sum();

            let first = pairs.len();
            for (joints, distance) in chain.windows(2).zip(distances) {
                pairs.push(BonePair {
                    start: joints[0],
                    end: joints[1],
                    distance,
                    height_proportion: distance / total_height,
                    limb_proportion: if arm_length > EPSILON {
                        distance / arm_length
                    } else {
                        0.0
                    },
                    rest_direction: rest_direction(joints[0], joints[1]),
                });
            }
            arm_ranges[side.index()] = first..pairs.len();
        }

        Ok(Self {
            pairs,
            spine,
            arms: arm_ranges,
            total_height,
        })
    }

    pub fn pairs(&self) -> &[BonePair] {
        &self.pairs
    }

    /// Hips -> head pairs
    pub fn spine(&self) -> &[BonePair] {
        &self.pairs[self.spine.clone()]
    }

    /// Pairs of one arm, empty if that arm is not usable
    pub fn arm(&self, side: Side) -> &[BonePair] {
        &self.pairs[self.arms[side.index()].clone()]
    }

    /// Sum of the hips -> head rest distances
    pub fn total_height(&self) -> f32 {
        self.total_height
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointMask;
    use crate::skeleton_constants::*;

    fn humanoid_pairs(present: JointMask) -> (Skeleton, BonePairs) {
        let skeleton = Skeleton::humanoid_subset(present);
        let rest = skeleton.rest_pose();
        let chest = chest_reference(&skeleton).unwrap();
        let arms = Side::BOTH.map(|side| ArmChain::capture(&skeleton, &rest, side, chest).ok());
        let pairs = BonePairs::build(&skeleton, &rest, &arms).unwrap();
        (skeleton, pairs)
    }

    #[test]
    fn test_full_humanoid_pairs() {
        let (_, pairs) = humanoid_pairs(JointMask::all());

        assert_eq!(pairs.spine().len(), 5);
        assert_eq!(pairs.arm(Side::Left).len(), 4);
        assert_eq!(pairs.arm(Side::Right).len(), 4);
        assert_eq!(pairs.len(), 13);

        let expected_height = DEFAULT_HIPS.distance(DEFAULT_HEAD);
        assert!((pairs.total_height() - expected_height).abs() < 1e-5);

        let proportion_sum: f32 = pairs.spine().iter().map(|p| p.height_proportion).sum();
        assert!((proportion_sum - 1.0).abs() < 1e-5);
        for pair in pairs.spine() {
            assert_eq!(pair.height_proportion, pair.limb_proportion);
        }

        let left = pairs.arm(Side::Left);
        assert_eq!(left[0].start, JointId::Chest);
        assert_eq!(left[0].end, JointId::LeftShoulder);
        assert_eq!(left[3].end, JointId::LeftHand);
        let limb_sum: f32 = left.iter().map(|p| p.limb_proportion).sum();
        assert!((limb_sum - 1.0).abs() < 1e-5);
        assert!((left[2].distance - DEFAULT_LEFT_UPPER_ARM.distance(DEFAULT_LEFT_LOWER_ARM)).abs() < 1e-5);
        assert!((left[3].distance - DEFAULT_LEFT_LOWER_ARM.distance(DEFAULT_LEFT_HAND)).abs() < 1e-5);
    }

    #[test]
    fn test_missing_spine_bones_fall_back() {
        let present = JointMask::all()
            .without(JointId::SpineUpper)
            .without(JointId::Chest);
        let (skeleton, pairs) = humanoid_pairs(present);

        assert_eq!(chest_reference(&skeleton), Some(JointId::SpineLower));
        let spine: Vec<(JointId, JointId)> = pairs.spine().iter().map(|p| (p.start, p.end)).collect();
        assert_eq!(
            spine,
            vec![
                (JointId::Hips, JointId::SpineLower),
                (JointId::SpineLower, JointId::Neck),
                (JointId::Neck, JointId::Head),
            ]
        );
        assert_eq!(pairs.arm(Side::Right)[0].start, JointId::SpineLower);
    }

    #[test]
    fn test_chest_reference_order() {
        let skeleton = Skeleton::humanoid_subset(JointMask::all().without(JointId::Chest));
        assert_eq!(chest_reference(&skeleton), Some(JointId::SpineUpper));

        let skeleton = Skeleton::humanoid_subset(JointMask::from_joints(&[JointId::Hips, JointId::Head]));
        assert_eq!(chest_reference(&skeleton), Some(JointId::Hips));
    }

    #[test]
    fn test_unusable_arm_has_no_pairs() {
        let (_, pairs) = humanoid_pairs(JointMask::all().without(JointId::LeftLowerArm));
        assert!(pairs.arm(Side::Left).is_empty());
        assert_eq!(pairs.arm(Side::Right).len(), 4);
    }

    #[test]
    fn test_degenerate_spine_rejected() {
        let skeleton = Skeleton::humanoid_subset(JointMask::from_joints(&[JointId::Hips, JointId::Head]));
        let mut rest = skeleton.rest_pose();
        rest[JointId::Head].position = rest.position(JointId::Hips);
        let result = BonePairs::build(&skeleton, &rest, &[None, None]);
        assert!(matches!(result, Err(DeformationError::DegenerateSpine)));
    }

    #[test]
    fn test_missing_head_rejected() {
        let skeleton = Skeleton::humanoid_subset(JointMask::all().without(JointId::Head));
        let rest = skeleton.rest_pose();
        let result = BonePairs::build(&skeleton, &rest, &[None, None]);
        assert!(matches!(result, Err(DeformationError::MissingJoint(JointId::Head))));
    }
}
