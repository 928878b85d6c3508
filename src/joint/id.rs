use serde::{Deserialize, Serialize};

/// Body side for paired limbs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Fingers, thumb first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Little,
    ];
}

/// Unique identifier for each joint in the humanoid skeleton.
/// Ordered for topological traversal (parents before children).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum JointId {
    // Root
    Hips = 0,

    // Spine chain, hips -> head
    SpineLower = 1,
    SpineUpper = 2,
    Chest = 3,
    Neck = 4,
    Head = 5,

    // Left arm chain
    LeftShoulder = 6,
    LeftUpperArm = 7,
    LeftLowerArm = 8,
    LeftHand = 9,

    // Right arm chain
    RightShoulder = 10,
    RightUpperArm = 11,
    RightLowerArm = 12,
    RightHand = 13,

    // Legs
    LeftUpperLeg = 14,
    LeftLowerLeg = 15,
    LeftFoot = 16,
    RightUpperLeg = 17,
    RightLowerLeg = 18,
    RightFoot = 19,

    // Left fingers
    LeftThumbMetacarpal = 20,
    LeftThumbProximal = 21,
    LeftThumbDistal = 22,
    LeftIndexProximal = 23,
    LeftIndexIntermediate = 24,
    LeftIndexDistal = 25,
    LeftMiddleProximal = 26,
    LeftMiddleIntermediate = 27,
    LeftMiddleDistal = 28,
    LeftRingProximal = 29,
    LeftRingIntermediate = 30,
    LeftRingDistal = 31,
    LeftLittleProximal = 32,
    LeftLittleIntermediate = 33,
    LeftLittleDistal = 34,

    // Right fingers
    RightThumbMetacarpal = 35,
    RightThumbProximal = 36,
    RightThumbDistal = 37,
    RightIndexProximal = 38,
    RightIndexIntermediate = 39,
    RightIndexDistal = 40,
    RightMiddleProximal = 41,
    RightMiddleIntermediate = 42,
    RightMiddleDistal = 43,
    RightRingProximal = 44,
    RightRingIntermediate = 45,
    RightRingDistal = 46,
    RightLittleProximal = 47,
    RightLittleIntermediate = 48,
    RightLittleDistal = 49,
}

/// Number of segments per finger chain
pub const FINGER_SEGMENTS: usize = 3;

const LEFT_FINGER_START: u8 = JointId::LeftThumbMetacarpal as u8;
const RIGHT_FINGER_START: u8 = JointId::RightThumbMetacarpal as u8;

impl JointId {
    /// Total number of joints in the skeleton
    pub const COUNT: usize = 50;

    /// Convert to array index
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Get all joint IDs in topological order (parents before children)
    pub const ALL: [JointId; Self::COUNT] = [
        JointId::Hips,
        JointId::SpineLower,
        JointId::SpineUpper,
        JointId::Chest,
        JointId::Neck,
        JointId::Head,
        JointId::LeftShoulder,
        JointId::LeftUpperArm,
        JointId::LeftLowerArm,
        JointId::LeftHand,
        JointId::RightShoulder,
        JointId::RightUpperArm,
        JointId::RightLowerArm,
        JointId::RightHand,
        JointId::LeftUpperLeg,
        JointId::LeftLowerLeg,
        JointId::LeftFoot,
        JointId::RightUpperLeg,
        JointId::RightLowerLeg,
        JointId::RightFoot,
        JointId::LeftThumbMetacarpal,
        JointId::LeftThumbProximal,
        JointId::LeftThumbDistal,
        JointId::LeftIndexProximal,
        JointId::LeftIndexIntermediate,
        JointId::LeftIndexDistal,
        JointId::LeftMiddleProximal,
        JointId::LeftMiddleIntermediate,
        JointId::LeftMiddleDistal,
        JointId::LeftRingProximal,
        JointId::LeftRingIntermediate,
        JointId::LeftRingDistal,
        JointId::LeftLittleProximal,
        JointId::LeftLittleIntermediate,
        JointId::LeftLittleDistal,
        JointId::RightThumbMetacarpal,
        JointId::RightThumbProximal,
        JointId::RightThumbDistal,
        JointId::RightIndexProximal,
        JointId::RightIndexIntermediate,
        JointId::RightIndexDistal,
        JointId::RightMiddleProximal,
        JointId::RightMiddleIntermediate,
        JointId::RightMiddleDistal,
        JointId::RightRingProximal,
        JointId::RightRingIntermediate,
        JointId::RightRingDistal,
        JointId::RightLittleProximal,
        JointId::RightLittleIntermediate,
        JointId::RightLittleDistal,
    ];

    /// Spine chain from hips to head, optional bones included
    pub const SPINE_CHAIN: [JointId; 6] = [
        JointId::Hips,
        JointId::SpineLower,
        JointId::SpineUpper,
        JointId::Chest,
        JointId::Neck,
        JointId::Head,
    ];

    /// Look up a joint by its index
    #[inline]
    pub fn from_index(index: usize) -> Option<JointId> {
        Self::ALL.get(index).copied()
    }

    /// Canonical name, identical to the variant name
    pub const fn name(self) -> &'static str {
        JOINT_NAMES[self.index()]
    }

    /// Parent in the default humanoid hierarchy
    pub const fn default_parent(self) -> Option<JointId> {
        DEFAULT_PARENTS[self.index()]
    }

    /// Side of the body, `None` for the center line
    pub const fn side(self) -> Option<Side> {
        use JointId::*;
        match self {
            Hips | SpineLower | SpineUpper | Chest | Neck | Head => None,
            LeftShoulder | LeftUpperArm | LeftLowerArm | LeftHand | LeftUpperLeg
            | LeftLowerLeg | LeftFoot => Some(Side::Left),
            RightShoulder | RightUpperArm | RightLowerArm | RightHand | RightUpperLeg
            | RightLowerLeg | RightFoot => Some(Side::Right),
            _ => {
                if (self as u8) < RIGHT_FINGER_START {
                    Some(Side::Left)
                } else {
                    Some(Side::Right)
                }
            }
        }
    }

    /// The same joint on the opposite side (center joints map to themselves)
    pub const fn mirrored(self) -> JointId {
        use JointId::*;
        let idx = self as u8;
        if idx >= RIGHT_FINGER_START {
            return Self::ALL[(idx - RIGHT_FINGER_START + LEFT_FINGER_START) as usize];
        }
        if idx >= LEFT_FINGER_START {
            return Self::ALL[(idx - LEFT_FINGER_START + RIGHT_FINGER_START) as usize];
        }
        match self {
            LeftShoulder => RightShoulder,
            LeftUpperArm => RightUpperArm,
            LeftLowerArm => RightLowerArm,
            LeftHand => RightHand,
            RightShoulder => LeftShoulder,
            RightUpperArm => LeftUpperArm,
            RightLowerArm => LeftLowerArm,
            RightHand => LeftHand,
            LeftUpperLeg => RightUpperLeg,
            LeftLowerLeg => RightLowerLeg,
            LeftFoot => RightFoot,
            RightUpperLeg => LeftUpperLeg,
            RightLowerLeg => LeftLowerLeg,
            RightFoot => LeftFoot,
            other => other,
        }
    }

    /// Shoulder joint for a side
    pub const fn shoulder(side: Side) -> JointId {
        match side {
            Side::Left => JointId::LeftShoulder,
            Side::Right => JointId::RightShoulder,
        }
    }

    /// Upper arm, lower arm and hand for a side
    pub const fn arm(side: Side) -> [JointId; 3] {
        match side {
            Side::Left => [
                JointId::LeftUpperArm,
                JointId::LeftLowerArm,
                JointId::LeftHand,
            ],
            Side::Right => [
                JointId::RightUpperArm,
                JointId::RightLowerArm,
                JointId::RightHand,
            ],
        }
    }

    /// Finger segments, proximal to distal
    pub const fn finger(side: Side, finger: Finger) -> [JointId; FINGER_SEGMENTS] {
        let base = match side {
            Side::Left => LEFT_FINGER_START,
            Side::Right => RIGHT_FINGER_START,
        } as usize
            + finger as usize * FINGER_SEGMENTS;
        [Self::ALL[base], Self::ALL[base + 1], Self::ALL[base + 2]]
    }
}

const JOINT_NAMES: [&str; JointId::COUNT] = [
    "Hips",
    "SpineLower",
    "SpineUpper",
    "Chest",
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
    "LeftThumbMetacarpal",
    "LeftThumbProximal",
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
    "RightThumbMetacarpal",
    "RightThumbProximal",
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

const fn finger_parents(hand: JointId, start: u8) -> [Option<JointId>; 15] {
    let mut parents = [None; 15];
    let mut i = 0;
    while i < 15 {
        parents[i] = if i % FINGER_SEGMENTS == 0 {
            Some(hand)
        } else {
            Some(JointId::ALL[start as usize + i - 1])
        };
        i += 1;
    }
    parents
}

/// Default humanoid hierarchy: shoulders hang off the chest, legs off the hips,
/// every finger chain starts at its hand.
const DEFAULT_PARENTS: [Option<JointId>; JointId::COUNT] = {
    use JointId::*;
    let mut parents: [Option<JointId>; JointId::COUNT] = [
        None,
        Some(Hips),
        Some(SpineLower),
        Some(SpineUpper),
        Some(Chest),
        Some(Neck),
        Some(Chest),
        Some(LeftShoulder),
        Some(LeftUpperArm),
        Some(LeftLowerArm),
        Some(Chest),
        Some(RightShoulder),
        Some(RightUpperArm),
        Some(RightLowerArm),
        Some(Hips),
        Some(LeftUpperLeg),
        Some(LeftLowerLeg),
        Some(Hips),
        Some(RightUpperLeg),
        Some(RightLowerLeg),
        None, None, None, None, None, None, None, None, None, None, None, None, None, None, None,
        None, None, None, None, None, None, None, None, None, None, None, None, None, None, None,
    ];
    let left = finger_parents(LeftHand, LEFT_FINGER_START);
    let right = finger_parents(RightHand, RIGHT_FINGER_START);
    let mut i = 0;
    while i < 15 {
        parents[LEFT_FINGER_START as usize + i] = left[i];
        parents[RIGHT_FINGER_START as usize + i] = right[i];
        i += 1;
    }
    parents
};
