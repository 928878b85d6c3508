use crate::error::{DeformationError, Result};
use crate::joint::Side;
use serde::{Deserialize, Serialize};

/// Which tracked spine endpoints are pinned exactly after proportion enforcement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpineCorrectionPolicy {
    /// Leave the proportion-enforced spine as is
    #[default]
    None,
    /// Distribute the head error along the spine and snap the head
    AccurateHead,
    /// Snap the hips, carrying the whole body with them
    AccurateHips,
    /// Both of the above
    AccurateHipsAndHead,
}

/// Frame in which shoulders are blended back toward their rest offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShoulderBlendSpace {
    /// Rest offset expressed in the chest frame, blended in world space.
    /// Suits flattened hierarchies where shoulders are not chest children.
    #[default]
    World,
    /// Rest offset expressed in the shoulder's parent frame, blended locally.
    Local,
}

/// Per-channel correction weights, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeformationWeights {
    pub spine_lower_alignment_weight: f32,
    pub spine_upper_alignment_weight: f32,
    pub chest_alignment_weight: f32,
    pub left_shoulder_weight: f32,
    pub right_shoulder_weight: f32,
    pub left_arm_weight: f32,
    pub right_arm_weight: f32,
    pub left_hand_weight: f32,
    pub right_hand_weight: f32,
}

impl Default for DeformationWeights {
    fn default() -> Self {
        Self {
            spine_lower_alignment_weight: 0.0,
            spine_upper_alignment_weight: 0.0,
            chest_alignment_weight: 0.0,
            left_shoulder_weight: 0.75,
            right_shoulder_weight: 0.75,
            left_arm_weight: 1.0,
            right_arm_weight: 1.0,
            left_hand_weight: 1.0,
            right_hand_weight: 1.0,
        }
    }
}

impl DeformationWeights {
    /// Whether any spine alignment channel is active
    pub fn aligns_spine(&self) -> bool {
        self.spine_lower_alignment_weight != 0.0
            || self.spine_upper_alignment_weight != 0.0
            || self.chest_alignment_weight != 0.0
    }

    pub fn shoulder(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left_shoulder_weight,
            Side::Right => self.right_shoulder_weight,
        }
    }

    pub fn arm(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left_arm_weight,
            Side::Right => self.right_arm_weight,
        }
    }

    pub fn hand(&self, side: Side) -> f32 {
        match side {
            Side::Left => self.left_hand_weight,
            Side::Right => self.right_hand_weight,
        }
    }

    fn channels(&self) -> [(&'static str, f32); 9] {
        [
            ("spineLowerAlignmentWeight", self.spine_lower_alignment_weight),
            ("spineUpperAlignmentWeight", self.spine_upper_alignment_weight),
            ("chestAlignmentWeight", self.chest_alignment_weight),
            ("leftShoulderWeight", self.left_shoulder_weight),
            ("rightShoulderWeight", self.right_shoulder_weight),
            ("leftArmWeight", self.left_arm_weight),
            ("rightArmWeight", self.right_arm_weight),
            ("leftHandWeight", self.left_hand_weight),
            ("rightHandWeight", self.right_hand_weight),
        ]
    }
}

/// Author-time configuration of the deformation engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeformationSettings {
    #[serde(flatten)]
    pub weights: DeformationWeights,
    #[serde(rename = "spineTranslationCorrectionType")]
    pub spine_correction: SpineCorrectionPolicy,
    /// Master blend; 0 disables the engine entirely
    pub overall_weight: f32,
    pub shoulder_blend_space: ShoulderBlendSpace,
}

impl Default for DeformationSettings {
    fn default() -> Self {
        Self {
            weights: DeformationWeights::default(),
            spine_correction: SpineCorrectionPolicy::None,
            overall_weight: 1.0,
            shoulder_blend_space: ShoulderBlendSpace::World,
        }
    }
}

impl DeformationSettings {
    /// Parse and validate settings from JSON. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject weights outside [0, 1]. Evaluation itself never clamps.
    pub fn validate(&self) -> Result<()> {
        let overall = ("overallWeight", self.overall_weight);
        for (name, value) in self.weights.channels().into_iter().chain([overall]) {
            if !(0.0..=1.0).contains(&value) {
                return Err(DeformationError::WeightOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_json() {
        let json = r#"{
            "spineLowerAlignmentWeight": 0.5,
            "chestAlignmentWeight": 1.0,
            "rightHandWeight": 0.25,
            "spineTranslationCorrectionType": "AccurateHipsAndHead",
            "overallWeight": 0.8,
            "shoulderBlendSpace": "Local"
        }"#;
        let settings = DeformationSettings::from_json(json).unwrap();

        assert_eq!(settings.weights.spine_lower_alignment_weight, 0.5);
        assert_eq!(settings.weights.spine_upper_alignment_weight, 0.0);
        assert_eq!(settings.weights.chest_alignment_weight, 1.0);
        assert_eq!(settings.weights.hand(Side::Right), 0.25);
        assert_eq!(settings.weights.hand(Side::Left), 1.0);
        assert_eq!(settings.spine_correction, SpineCorrectionPolicy::AccurateHipsAndHead);
        assert_eq!(settings.overall_weight, 0.8);
        assert_eq!(settings.shoulder_blend_space, ShoulderBlendSpace::Local);
        assert!(settings.weights.aligns_spine());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let settings = DeformationSettings::from_json("{}").unwrap();
        assert_eq!(settings, DeformationSettings::default());
        assert!(!settings.weights.aligns_spine());
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let result = DeformationSettings::from_json(r#"{ "leftArmWeight": 1.5 }"#);
        assert!(matches!(
            result,
            Err(DeformationError::WeightOutOfRange {
                name: "leftArmWeight",
                ..
            })
        ));

        let result = DeformationSettings::from_json(r#"{ "overallWeight": -0.1 }"#);
        assert!(matches!(
            result,
            Err(DeformationError::WeightOutOfRange {
                name: "overallWeight",
                ..
            })
        ));
    }

    #[test]
    fn test_settings_json_round_trip() {
        let mut settings = DeformationSettings::default();
        settings.spine_correction = SpineCorrectionPolicy::AccurateHead;
        settings.weights.left_shoulder_weight = 0.1;

        let json = settings.to_json_string().unwrap();
        assert!(json.contains("\"spineTranslationCorrectionType\": \"AccurateHead\""));
        assert_eq!(DeformationSettings::from_json(&json).unwrap(), settings);
    }
}
