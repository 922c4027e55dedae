// Coordinate normalization - expresses landmarks relative to the nose in shoulder-width units

use crate::models::features::{FeatureSlot, NormalizeError, NormalizedPoint};
use crate::models::landmark::{BodyJoint, BodyLandmarks, Point2D};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Scale applied to shoulder-width units before truncation
pub const UNITS_PER_SHOULDER_WIDTH: f64 = 100.0;

/// Overlay grid rows: 100 units above the nose to 300 below
pub const GRID_VERTICAL_RANGE: RangeInclusive<i32> = -100..=300;

/// Overlay grid columns: 250 units either side of the nose
pub const GRID_HORIZONTAL_RANGE: RangeInclusive<i32> = -250..=250;

/// Cells per grid row
pub const GRID_ROW_STRIDE: i32 = 500;

/// Origin and scale for one frame.
///
/// Rebuilt from scratch for every frame and passed explicitly to each call;
/// nothing carries over between frames.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFrame {
    pub nose: Option<Point2D>,
    pub left_shoulder: Option<Point2D>,
    pub right_shoulder: Option<Point2D>,
}

impl ReferenceFrame {
    pub fn new(
        nose: Option<Point2D>,
        left_shoulder: Option<Point2D>,
        right_shoulder: Option<Point2D>,
    ) -> Self {
        Self {
            nose,
            left_shoulder,
            right_shoulder,
        }
    }

    /// Pick the nose and both shoulders out of a frame's body landmarks
    pub fn from_body(body: &BodyLandmarks, min_confidence: f32) -> Self {
        Self {
            nose: body.point(BodyJoint::Nose, min_confidence),
            left_shoulder: body.point(BodyJoint::LeftShoulder, min_confidence),
            right_shoulder: body.point(BodyJoint::RightShoulder, min_confidence),
        }
    }

    fn anchors(&self) -> Result<(Point2D, Point2D, Point2D), NormalizeError> {
        match (self.nose, self.left_shoulder, self.right_shoulder) {
            (Some(nose), Some(left), Some(right)) => Ok((nose, left, right)),
            _ => Err(NormalizeError::MissingReference),
        }
    }

    /// Left minus right shoulder on the horizontal axis. Negative when the
    /// left shoulder sits at the smaller horizontal coordinate.
    pub fn signed_width(&self) -> Result<f64, NormalizeError> {
        let (_, left, right) = self.anchors()?;
        check_scale(left.horizontal - right.horizontal)
    }

    /// Magnitude of the shoulder span on the horizontal axis
    pub fn absolute_width(&self) -> Result<f64, NormalizeError> {
        let (_, left, right) = self.anchors()?;
        check_scale((left.horizontal - right.horizontal).abs())
    }

    /// Ok when `normalize` can produce coordinates for this frame
    pub fn validate(&self) -> Result<(), NormalizeError> {
        self.signed_width().map(|_| ())
    }

    fn origin(&self) -> Result<Point2D, NormalizeError> {
        self.anchors().map(|(nose, _, _)| nose)
    }
}

fn check_scale(width: f64) -> Result<f64, NormalizeError> {
    if width == 0.0 || !width.is_finite() {
        Err(NormalizeError::DegenerateScale)
    } else {
        Ok(width)
    }
}

/// Truncates toward zero; out-of-range values saturate at the i32 bounds.
fn to_units(offset: f64, width: f64) -> i32 {
    (UNITS_PER_SHOULDER_WIDTH * offset / width) as i32
}

fn project(point: Point2D, nose: Point2D, width: f64) -> NormalizedPoint {
    NormalizedPoint::new(
        to_units(point.vertical - nose.vertical, width),
        to_units(point.horizontal - nose.horizontal, width),
    )
}

/// Normalize `point` against the signed shoulder width.
///
/// Guards run in order: missing reference, zero width, missing point. The
/// result is never range-checked.
pub fn normalize(point: Option<Point2D>, reference: &ReferenceFrame) -> FeatureSlot {
    let width = reference.signed_width()?;
    let nose = reference.origin()?;
    let point = point.ok_or(NormalizeError::MissingPoint)?;

    Ok(project(point, nose, width))
}

/// Index of the overlay grid cell containing `point`.
///
/// Uses the absolute shoulder width, unlike [`normalize`]. A missing point is
/// reported before a zero width. Returns `(v + 100) * 500 + (h + 250)` when
/// both axes fall inside the grid ranges, `OutOfGridRange` otherwise.
pub fn cell_index(point: Option<Point2D>, reference: &ReferenceFrame) -> Result<u32, NormalizeError> {
    let (nose, _, _) = reference.anchors()?;
    let point = point.ok_or(NormalizeError::MissingPoint)?;
    let width = reference.absolute_width()?;

    let cell = project(point, nose, width);
    if !GRID_VERTICAL_RANGE.contains(&cell.vertical)
        || !GRID_HORIZONTAL_RANGE.contains(&cell.horizontal)
    {
        return Err(NormalizeError::OutOfGridRange);
    }

    let row = cell.vertical - GRID_VERTICAL_RANGE.start();
    let column = cell.horizontal - GRID_HORIZONTAL_RANGE.start();
    Ok((row * GRID_ROW_STRIDE + column) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> ReferenceFrame {
        ReferenceFrame::new(
            Some(Point2D::new(0.0, 0.0)),
            Some(Point2D::new(0.0, -50.0)),
            Some(Point2D::new(0.0, 50.0)),
        )
    }

    #[test]
    fn test_normalize_uses_signed_width() {
        let reference = reference();
        assert_eq!(reference.signed_width(), Ok(-100.0));

        let result = normalize(Some(Point2D::new(10.0, 25.0)), &reference);
        assert_eq!(result, Ok(NormalizedPoint::new(-10, -25)));
    }

    #[test]
    fn test_normalize_matches_truncated_formula() {
        let noses = [(0.0, 0.0), (120.0, -35.0), (-7.0, 400.0)];
        let shoulder_pairs = [(-50.0, 50.0), (80.0, -3.0), (13.0, 10.0), (300.0, 1.0)];

        for &(nose_v, nose_h) in &noses {
            for &(left_h, right_h) in &shoulder_pairs {
                let reference = ReferenceFrame::new(
                    Some(Point2D::new(nose_v, nose_h)),
                    Some(Point2D::new(nose_v + 40.0, left_h)),
                    Some(Point2D::new(nose_v + 40.0, right_h)),
                );
                let width = (left_h - right_h) as i64;

                for dv in (-300i64..=300).step_by(37) {
                    for dh in (-250i64..=250).step_by(29) {
                        let point = Point2D::new(nose_v + dv as f64, nose_h + dh as f64);
                        let expected = NormalizedPoint::new(
                            (100 * dv / width) as i32,
                            (100 * dh / width) as i32,
                        );
                        assert_eq!(normalize(Some(point), &reference), Ok(expected));
                    }
                }
            }
        }
    }

    #[test]
    fn test_normalize_is_repeatable() {
        let reference = reference();
        let point = Some(Point2D::new(33.3, -71.9));
        assert_eq!(normalize(point, &reference), normalize(point, &reference));
    }

    #[test]
    fn test_normalize_guard_order() {
        let mut reference = reference();
        reference.nose = None;
        assert_eq!(
            normalize(Some(Point2D::new(1.0, 1.0)), &reference),
            Err(NormalizeError::MissingReference)
        );

        let mut reference = self::reference();
        reference.left_shoulder = None;
        assert_eq!(normalize(None, &reference), Err(NormalizeError::MissingReference));

        let mut reference = self::reference();
        reference.left_shoulder = Some(Point2D::new(0.0, 50.0));
        assert_eq!(normalize(None, &reference), Err(NormalizeError::DegenerateScale));
        assert_eq!(
            normalize(Some(Point2D::new(1.0, 1.0)), &reference),
            Err(NormalizeError::DegenerateScale)
        );

        assert_eq!(normalize(None, &self::reference()), Err(NormalizeError::MissingPoint));
    }

    #[test]
    fn test_normalize_does_not_range_check() {
        let result = normalize(Some(Point2D::new(-5000.0, 9000.0)), &reference());
        assert_eq!(result, Ok(NormalizedPoint::new(5000, -9000)));
    }

    #[test]
    fn test_cell_index_bounds() {
        let reference = reference();
        assert_eq!(reference.absolute_width(), Ok(100.0));

        assert_eq!(cell_index(Some(Point2D::new(300.0, 250.0)), &reference), Ok(200_500));
        assert_eq!(cell_index(Some(Point2D::new(-100.0, -250.0)), &reference), Ok(0));
        assert_eq!(cell_index(Some(Point2D::new(0.0, 0.0)), &reference), Ok(100 * 500 + 250));
        assert_eq!(
            cell_index(Some(Point2D::new(301.0, 0.0)), &reference),
            Err(NormalizeError::OutOfGridRange)
        );
        assert_eq!(
            cell_index(Some(Point2D::new(0.0, -251.0)), &reference),
            Err(NormalizeError::OutOfGridRange)
        );
        assert_eq!(
            cell_index(Some(Point2D::new(-101.0, 0.0)), &reference),
            Err(NormalizeError::OutOfGridRange)
        );
    }

    #[test]
    fn test_cell_index_uses_absolute_width() {
        // Signed width is -100 here, so normalize flips both axes
        let reference = reference();
        let point = Some(Point2D::new(50.0, 20.0));

        assert_eq!(normalize(point, &reference), Ok(NormalizedPoint::new(-50, -20)));
        assert_eq!(cell_index(point, &reference), Ok((50 + 100) * 500 + (20 + 250)));
    }

    #[test]
    fn test_cell_index_guards() {
        let mut reference = reference();
        reference.right_shoulder = None;
        assert_eq!(cell_index(None, &reference), Err(NormalizeError::MissingReference));

        let mut reference = self::reference();
        reference.left_shoulder = Some(Point2D::new(10.0, 50.0));
        assert_eq!(cell_index(None, &reference), Err(NormalizeError::MissingPoint));
        assert_eq!(
            cell_index(Some(Point2D::new(1.0, 1.0)), &reference),
            Err(NormalizeError::DegenerateScale)
        );
    }

    #[test]
    fn test_reference_from_body() {
        let body = BodyLandmarks::new()
            .with(BodyJoint::Nose, Point2D::new(1.0, 2.0))
            .with(BodyJoint::LeftShoulder, Point2D::new(3.0, 4.0));

        let reference = ReferenceFrame::from_body(&body, 0.0);
        assert_eq!(reference.nose, Some(Point2D::new(1.0, 2.0)));
        assert_eq!(reference.right_shoulder, None);
        assert_eq!(reference.validate(), Err(NormalizeError::MissingReference));
    }
}
