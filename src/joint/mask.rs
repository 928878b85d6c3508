use super::id::JointId;
use static_assertions::const_assert;

const_assert!(JointId::COUNT <= 64);

/// Set of joints, one bit per `JointId` index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct JointMask(u64);

impl JointMask {
    /// Every joint in the skeleton
    pub const fn all() -> Self {
        Self((1u64 << JointId::COUNT) - 1)
    }

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Mask containing exactly the given joints
    pub fn from_joints(joints: &[JointId]) -> Self {
        joints.iter().fold(Self::empty(), |mask, &joint| mask.with(joint))
    }

    #[inline]
    pub const fn contains(&self, joint: JointId) -> bool {
        (self.0 & (1 << joint.index())) != 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Return a new mask with the joint added
    #[inline]
    pub const fn with(self, joint: JointId) -> Self {
        Self(self.0 | (1 << joint.index()))
    }

    /// Return a new mask with the joint removed
    #[inline]
    pub const fn without(self, joint: JointId) -> Self {
        Self(self.0 & !(1 << joint.index()))
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Joints in topological order
    pub fn iter(self) -> impl Iterator<Item = JointId> {
        JointId::ALL.into_iter().filter(move |joint| self.contains(*joint))
    }
}

/// Compute, for each joint, the mask of itself and all its descendants.
///
/// `parents` must be a strict tree in topological order, so walking each
/// joint up to the root terminates within `JointId::COUNT` steps.
pub fn descendant_masks(parents: &[Option<JointId>; JointId::COUNT]) -> [JointMask; JointId::COUNT] {
    let mut masks = [JointMask::empty(); JointId::COUNT];
    for joint in JointId::ALL {
        let mut current = Some(joint);
        let mut depth = 0;
        while let Some(ancestor) = current {
            masks[ancestor.index()] = masks[ancestor.index()].with(joint);
            current = parents[ancestor.index()];
            depth += 1;
            if depth > JointId::COUNT {
                break;
            }
        }
    }
    masks
}
