// Frame feature assembly - turns one frame of landmarks into an ordered feature vector

use crate::core::normalizer::{normalize, ReferenceFrame};
use crate::models::features::{FrameFeatureVector, NormalizeError};
use crate::models::landmark::{BodyJoint, BodyLandmarks, HandJoint, HandLandmarks};
use serde::{Deserialize, Serialize};

/// Most hands ever included in a feature vector
pub const MAX_HANDS: usize = 2;

/// Body joints in output order
pub const BODY_SCHEDULE: [BodyJoint; 8] = [
    BodyJoint::RightEye,
    BodyJoint::RightShoulder,
    BodyJoint::RightElbow,
    BodyJoint::RightWrist,
    BodyJoint::LeftEye,
    BodyJoint::LeftShoulder,
    BodyJoint::LeftElbow,
    BodyJoint::LeftWrist,
];

/// Hand joints in output order, repeated for each included hand
pub const HAND_SCHEDULE: [HandJoint; 6] = [
    HandJoint::IndexTip,
    HandJoint::MiddleTip,
    HandJoint::RingTip,
    HandJoint::LittleTip,
    HandJoint::ThumbTip,
    HandJoint::Wrist,
];

/// Which detected hands contribute to a frame's vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandPolicy {
    /// Hands are included only when at least two were detected; a lone hand
    /// is dropped and the vector keeps its 8 body slots.
    #[default]
    RequireBothHands,
    /// Every detected hand is included, up to two.
    EachDetectedHand,
}

impl HandPolicy {
    /// How many of `detected` hands go into the vector
    pub fn hands_to_include(&self, detected: usize) -> usize {
        match self {
            HandPolicy::RequireBothHands if detected < MAX_HANDS => 0,
            _ => detected.min(MAX_HANDS),
        }
    }
}

/// Assemble the feature vector for one frame.
///
/// Returns `Err` only when the frame has no usable coordinate system
/// (`MissingReference` or `DegenerateScale`); no vector is produced then.
/// Any other landmark that cannot be normalized stays in its slot as an
/// `Err`, so the output length depends only on the hand count and policy.
pub fn assemble_frame(
    body: &BodyLandmarks,
    hands: &[HandLandmarks],
    policy: HandPolicy,
    min_confidence: f32,
) -> Result<FrameFeatureVector, NormalizeError> {
    let reference = ReferenceFrame::from_body(body, min_confidence);
    reference.validate()?;

    let included = policy.hands_to_include(hands.len());
    if hands.len() > MAX_HANDS {
        log::debug!(
            "{} hands detected, only the first {} are used",
            hands.len(),
            MAX_HANDS
        );
    }

    let mut vector = FrameFeatureVector::with_capacity(
        FrameFeatureVector::BODY_SLOTS + included * FrameFeatureVector::HAND_SLOTS,
    );

    for joint in BODY_SCHEDULE {
        vector.push(normalize(body.point(joint, min_confidence), &reference));
    }

    for hand in &hands[..included] {
        for joint in HAND_SCHEDULE {
            vector.push(normalize(hand.point(joint, min_confidence), &reference));
        }
    }

    Ok(vector)
}
