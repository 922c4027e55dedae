// Data models for body and hand landmarks delivered by an external pose estimator

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ==============================================================================
// Coordinates
// ==============================================================================

/// A point in view space.
///
/// The two axes are named instead of being positional: in the portrait capture
/// layout the estimator's first coordinate runs along the screen *height* and
/// the second along the screen *width*. `vertical` always carries the former,
/// `horizontal` the latter, and shoulder width is measured on `horizontal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub vertical: f64,
    pub horizontal: f64,
}

impl Point2D {
    pub fn new(vertical: f64, horizontal: f64) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Convert unit-square estimator output into view space.
    ///
    /// `x` is scaled by the view height and `y` by the view width.
    pub fn from_normalized(x: f64, y: f64, size: ImageSize) -> Self {
        Self {
            vertical: x * size.height,
            horizontal: y * size.width,
        }
    }
}

/// Size of the view the landmarks are projected onto
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl ImageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A located landmark with its detection confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub location: Point2D,
    pub confidence: f32, // Detection confidence [0, 1]
}

impl Keypoint {
    pub fn new(location: Point2D, confidence: f32) -> Self {
        Self {
            location,
            confidence,
        }
    }

    pub fn is_visible(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }
}

// ==============================================================================
// Body (19 joints)
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyJoint {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    Neck,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    Root,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl BodyJoint {
    pub fn to_string(&self) -> &'static str {
        match self {
            BodyJoint::Nose => "nose",
            BodyJoint::LeftEye => "left_eye",
            BodyJoint::RightEye => "right_eye",
            BodyJoint::LeftEar => "left_ear",
            BodyJoint::RightEar => "right_ear",
            BodyJoint::Neck => "neck",
            BodyJoint::LeftShoulder => "left_shoulder",
            BodyJoint::RightShoulder => "right_shoulder",
            BodyJoint::LeftElbow => "left_elbow",
            BodyJoint::RightElbow => "right_elbow",
            BodyJoint::LeftWrist => "left_wrist",
            BodyJoint::RightWrist => "right_wrist",
            BodyJoint::Root => "root",
            BodyJoint::LeftHip => "left_hip",
            BodyJoint::RightHip => "right_hip",
            BodyJoint::LeftKnee => "left_knee",
            BodyJoint::RightKnee => "right_knee",
            BodyJoint::LeftAnkle => "left_ankle",
            BodyJoint::RightAnkle => "right_ankle",
        }
    }
}

/// Body landmarks detected in one frame. Joints the estimator did not locate
/// are simply absent from the map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyLandmarks {
    points: HashMap<BodyJoint, Keypoint>,
}

impl BodyLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, joint: BodyJoint, keypoint: Keypoint) {
        self.points.insert(joint, keypoint);
    }

    /// Builder-style insert with full confidence
    pub fn with(mut self, joint: BodyJoint, location: Point2D) -> Self {
        self.insert(joint, Keypoint::new(location, 1.0));
        self
    }

    pub fn get(&self, joint: BodyJoint) -> Option<&Keypoint> {
        self.points.get(&joint)
    }

    /// Location of `joint`, or `None` if it was not detected or its
    /// confidence is below `min_confidence`.
    pub fn point(&self, joint: BodyJoint, min_confidence: f32) -> Option<Point2D> {
        self.points
            .get(&joint)
            .filter(|kp| kp.is_visible(min_confidence))
            .map(|kp| kp.location)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ==============================================================================
// Hand (21 joints per hand)
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    LittleMcp,
    LittlePip,
    LittleDip,
    LittleTip,
}

/// Landmarks of a single detected hand
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks {
    points: HashMap<HandJoint, Keypoint>,
}

impl HandLandmarks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, joint: HandJoint, keypoint: Keypoint) {
        self.points.insert(joint, keypoint);
    }

    pub fn with(mut self, joint: HandJoint, location: Point2D) -> Self {
        self.insert(joint, Keypoint::new(location, 1.0));
        self
    }

    pub fn get(&self, joint: HandJoint) -> Option<&Keypoint> {
        self.points.get(&joint)
    }

    pub fn point(&self, joint: HandJoint, min_confidence: f32) -> Option<Point2D> {
        self.points
            .get(&joint)
            .filter(|kp| kp.is_visible(min_confidence))
            .map(|kp| kp.location)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// ==============================================================================
// Frame
// ==============================================================================

/// Everything the estimator reported for one video frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkFrame {
    pub timestamp: i64,
    pub body: BodyLandmarks,
    #[serde(default)]
    pub hands: Vec<HandLandmarks>, // In estimator order, normally at most 2
}

impl LandmarkFrame {
    pub fn new(timestamp: i64, body: BodyLandmarks, hands: Vec<HandLandmarks>) -> Self {
        Self {
            timestamp,
            body,
            hands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_normalized_swaps_axes() {
        let size = ImageSize::new(390.0, 844.0);
        let point = Point2D::from_normalized(0.5, 0.25, size);
        assert_eq!(point.vertical, 422.0);
        assert_eq!(point.horizontal, 97.5);
    }

    #[test]
    fn test_low_confidence_point_is_absent() {
        let mut body = BodyLandmarks::new();
        body.insert(BodyJoint::Nose, Keypoint::new(Point2D::new(1.0, 2.0), 0.3));

        assert_eq!(body.point(BodyJoint::Nose, 0.0), Some(Point2D::new(1.0, 2.0)));
        assert_eq!(body.point(BodyJoint::Nose, 0.3), Some(Point2D::new(1.0, 2.0)));
        assert_eq!(body.point(BodyJoint::Nose, 0.5), None);
        assert_eq!(body.point(BodyJoint::LeftEye, 0.0), None);
    }

    #[test]
    fn test_landmark_frame_json() {
        let json = r#"{
            "timestamp": 42,
            "body": {
                "nose": { "location": { "vertical": 10.0, "horizontal": 20.0 }, "confidence": 0.9 }
            }
        }"#;
        let frame: LandmarkFrame = serde_json::from_str(json).unwrap();
        assert_eq!(frame.timestamp, 42);
        assert!(frame.hands.is_empty());
        assert_eq!(frame.body.point(BodyJoint::Nose, 0.5), Some(Point2D::new(10.0, 20.0)));

        let back = serde_json::to_string(&frame).unwrap();
        let again: LandmarkFrame = serde_json::from_str(&back).unwrap();
        assert_eq!(frame, again);
    }

    #[test]
    fn test_body_joint_names_match_serde() {
        for joint in [BodyJoint::Nose, BodyJoint::LeftShoulder, BodyJoint::RightAnkle] {
            let json = serde_json::to_string(&joint).unwrap();
            assert_eq!(json, format!("\"{}\"", joint.to_string()));
        }
        assert_eq!(BodyJoint::RightWrist.to_string(), "right_wrist");
    }

    #[test]
    fn test_hand_builder() {
        let hand = HandLandmarks::new()
            .with(HandJoint::Wrist, Point2D::new(1.0, 1.0))
            .with(HandJoint::ThumbTip, Point2D::new(2.0, 2.0));
        assert_eq!(hand.len(), 2);
        assert_eq!(hand.get(HandJoint::ThumbTip).map(|kp| kp.confidence), Some(1.0));
        assert!(hand.point(HandJoint::IndexTip, 0.0).is_none());
    }
}
