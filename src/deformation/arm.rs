use crate::error::{DeformationError, Result};
use crate::joint::{JointId, Pose, Side};
use crate::math::SQR_EPSILON;
use crate::skeleton::Skeleton;
use glam::Vec3;

/// Rest-pose data for one arm, captured at bind time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmChain {
    pub side: Side,
    pub shoulder: Option<JointId>,
    pub upper_arm: JointId,
    pub lower_arm: JointId,
    pub hand: JointId,
    /// Shoulder rest position in the chest reference frame
    pub rest_shoulder_offset: Vec3,
    /// Shoulder rest position in its skeleton parent's frame
    pub rest_shoulder_local: Vec3,
    /// Unit lower-arm -> hand direction in the lower arm's rest frame
    pub lower_arm_to_hand_axis: Vec3,
}

impl ArmChain {
    /// Capture the arm on `side`. Fails if upper arm, lower arm or hand are
    /// missing, or if lower arm and hand coincide at rest.
    pub fn capture(skeleton: &Skeleton, rest: &Pose, side: Side, chest: JointId) -> Result<Self> {
        let [upper_arm, lower_arm, hand] = JointId::arm(side);
        if [upper_arm, lower_arm, hand]
            .iter()
            .any(|joint| !skeleton.contains(*joint))
        {
            return Err(DeformationError::ArmNotInitialized(side));
        }

        let shoulder = Some(JointId::shoulder(side)).filter(|joint| skeleton.contains(*joint));
        let (rest_shoulder_offset, rest_shoulder_local) = match shoulder {
            Some(shoulder) => (
                rest[chest].to_local(&rest[shoulder]).position,
                skeleton
                    .rest_local(shoulder)
                    .map(|local| local.position)
                    .unwrap_or(Vec3::ZERO),
            ),
            None => (Vec3::ZERO, Vec3::ZERO),
        };

        let to_hand = rest.position(hand) - rest.position(lower_arm);
        let axis = rest.rotation(lower_arm).inverse() * to_hand;
        let arm = Self {
            side,
            shoulder,
            upper_arm,
            lower_arm,
            hand,
            rest_shoulder_offset,
            rest_shoulder_local,
            lower_arm_to_hand_axis: axis.normalize_or_zero(),
        };
        if !arm.is_initialized() {
            return Err(DeformationError::ArmNotInitialized(side));
        }
        Ok(arm)
    }

    /// Upper arm, lower arm and hand are bound and the hand axis is usable
    pub fn is_initialized(&self) -> bool {
        self.lower_arm_to_hand_axis.length_squared() > SQR_EPSILON
    }

    /// Joint that the upper arm hangs from: the shoulder, or the chest reference
    pub fn anchor(&self, chest: JointId) -> JointId {
        self.shoulder.unwrap_or(chest)
    }

    /// Joints that move with the arm, shoulder excluded
    pub fn limb(&self) -> [JointId; 3] {
        [self.upper_arm, self.lower_arm, self.hand]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointMask;

    #[test]
    fn test_capture_default_arm() {
        let skeleton = Skeleton::humanoid();
        let rest = skeleton.rest_pose();
        let arm = ArmChain::capture(&skeleton, &rest, Side::Left, JointId::Chest).unwrap();

        assert_eq!(arm.shoulder, Some(JointId::LeftShoulder));
        assert_eq!(arm.hand, JointId::LeftHand);
        assert!(arm.is_initialized());
        assert!(arm.lower_arm_to_hand_axis.distance(Vec3::NEG_X) < 1e-5);
        assert!(arm.rest_shoulder_offset.distance(Vec3::new(-0.05, 0.1, 0.0)) < 1e-5);
        assert_eq!(arm.anchor(JointId::Chest), JointId::LeftShoulder);
    }

    #[test]
    fn test_capture_without_shoulder() {
        let skeleton = Skeleton::humanoid_subset(JointMask::all().without(JointId::RightShoulder));
        let rest = skeleton.rest_pose();
        let arm = ArmChain::capture(&skeleton, &rest, Side::Right, JointId::Chest).unwrap();

        assert_eq!(arm.shoulder, None);
        assert_eq!(arm.anchor(JointId::Chest), JointId::Chest);
    }

    #[test]
    fn test_missing_hand_is_not_initialized() {
        let skeleton = Skeleton::humanoid_subset(JointMask::all().without(JointId::LeftHand));
        let rest = skeleton.rest_pose();
        let result = ArmChain::capture(&skeleton, &rest, Side::Left, JointId::Chest);
        assert!(matches!(result, Err(DeformationError::ArmNotInitialized(Side::Left))));
    }

    #[test]
    fn test_coincident_hand_is_not_initialized() {
        let skeleton = Skeleton::humanoid();
        let mut rest = skeleton.rest_pose();
        rest[JointId::LeftHand].position = rest.position(JointId::LeftLowerArm);
        let result = ArmChain::capture(&skeleton, &rest, Side::Left, JointId::Chest);
        assert!(matches!(result, Err(DeformationError::ArmNotInitialized(Side::Left))));
    }
}
