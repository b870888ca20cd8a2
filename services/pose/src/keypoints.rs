//! Pose keypoints and the directional pose comparison
//!
//! Keypoints follow the 33-landmark body layout (nose = 0, shoulders = 11/12,
//! elbows = 13/14, wrists = 15/16, hips = 23/24, knees = 25/26, ankles =
//! 27/28) with coordinates normalized to the frame. Two poses are compared
//! limb by limb on the direction each limb points, so the score does not
//! depend on where the dancer stands or how far from the camera.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single landmark position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawKeypoint")]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
}

/// Accepted wire forms: `[x, y, ...]` (extra components such as depth or
/// visibility are ignored) or `{ "x": .., "y": .. }`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeypoint {
    Components(Vec<f64>),
    Point { x: f64, y: f64 },
}

impl TryFrom<RawKeypoint> for Keypoint {
    type Error = String;

    fn try_from(raw: RawKeypoint) -> Result<Self, Self::Error> {
        match raw {
            RawKeypoint::Components(components) if components.len() >= 2 => Ok(Keypoint {
                x: components[0],
                y: components[1],
            }),
            RawKeypoint::Components(components) => Err(format!(
                "keypoint needs at least 2 components, got {}",
                components.len()
            )),
            RawKeypoint::Point { x, y } => Ok(Keypoint { x, y }),
        }
    }
}

/// Landmark pairs whose direction is compared
pub const LIMBS: [(usize, usize); 12] = [
    (11, 12), // shoulders
    (11, 13), // left upper arm
    (13, 15), // left forearm
    (12, 14), // right upper arm
    (14, 16), // right forearm
    (11, 23), // left flank
    (12, 24), // right flank
    (23, 24), // hips
    (23, 25), // left thigh
    (25, 27), // left shin
    (24, 26), // right thigh
    (26, 28), // right shin
];

#[derive(Error, Debug, PartialEq)]
pub enum ComparisonError {
    #[error("no limb is present in both poses")]
    NoComparableLimbs,
}

/// Score how closely `user` follows `reference`, from 0 to 100.
///
/// Each limb present in both poses contributes the cosine similarity of its
/// two direction vectors, mapped from [-1, 1] onto [0, 100]; the score is the
/// mean over those limbs, rounded to two decimals. Limbs with a missing or
/// zero-length endpoint pair are skipped.
pub fn compare_pose_directional(
    user: &[Keypoint],
    reference: &[Keypoint],
) -> Result<f64, ComparisonError> {
    let similarities: Vec<f64> = LIMBS
        .iter()
        .filter_map(|&(from, to)| {
            let user_limb = direction(user, from, to)?;
            let reference_limb = direction(reference, from, to)?;
            let cosine = user_limb.0 * reference_limb.0 + user_limb.1 * reference_limb.1;
            Some(cosine.clamp(-1.0, 1.0))
        })
        .collect();

    if similarities.is_empty() {
        return Err(ComparisonError::NoComparableLimbs);
    }

    let mean = similarities.iter().sum::<f64>() / similarities.len() as f64;
    let score = (mean + 1.0) / 2.0 * 100.0;
    Ok((score * 100.0).round() / 100.0)
}

/// Unit vector from landmark `from` to landmark `to`
fn direction(pose: &[Keypoint], from: usize, to: usize) -> Option<(f64, f64)> {
    let start = pose.get(from)?;
    let end = pose.get(to)?;
    let (dx, dy) = (end.x - start.x, end.y - start.y);
    let length = dx.hypot(dy);

    if !length.is_finite() || length <= f64::EPSILON {
        return None;
    }

    Some((dx / length, dy / length))
}

/// Feedback tier for a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Feedback {
    Perfect,
    Good,
    Normal,
    Bad,
    Worst,
}

impl Feedback {
    pub fn for_score(score: f64) -> Self {
        if score >= 90.0 {
            Feedback::Perfect
        } else if score >= 80.0 {
            Feedback::Good
        } else if score >= 75.0 {
            Feedback::Normal
        } else if score >= 60.0 {
            Feedback::Bad
        } else {
            Feedback::Worst
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A standing pose with every landmark at a distinct position
    pub(crate) fn standing_pose() -> Vec<Keypoint> {
        (0..33)
            .map(|i| {
                let i = i as f64;
                Keypoint {
                    x: 0.3 + (i * 0.37).sin() * 0.2,
                    y: 0.1 + i * 0.025,
                }
            })
            .collect()
    }

    fn mirrored(pose: &[Keypoint]) -> Vec<Keypoint> {
        pose.iter()
            .map(|k| Keypoint { x: -k.x, y: -k.y })
            .collect()
    }

    #[test]
    fn test_identical_poses_score_full_marks() {
        let pose = standing_pose();
        assert_eq!(compare_pose_directional(&pose, &pose), Ok(100.0));
    }

    #[test]
    fn test_score_ignores_position_and_scale() {
        let pose = standing_pose();
        let moved: Vec<Keypoint> = pose
            .iter()
            .map(|k| Keypoint {
                x: k.x * 0.5 + 0.2,
                y: k.y * 0.5 + 0.1,
            })
            .collect();
        assert_eq!(compare_pose_directional(&moved, &pose), Ok(100.0));
    }

    #[test]
    fn test_opposite_limbs_score_zero() {
        let pose = standing_pose();
        assert_eq!(compare_pose_directional(&mirrored(&pose), &pose), Ok(0.0));
    }

    #[test]
    fn test_missing_landmarks_are_skipped() {
        let pose = standing_pose();
        // Only the shoulders and left arm are visible
        let upper_body = &pose[..16];
        assert_eq!(compare_pose_directional(upper_body, &pose), Ok(100.0));
        assert_eq!(
            compare_pose_directional(&pose[..11], &pose),
            Err(ComparisonError::NoComparableLimbs)
        );
    }

    #[test]
    fn test_feedback_tiers() {
        assert_eq!(Feedback::for_score(100.0), Feedback::Perfect);
        assert_eq!(Feedback::for_score(90.0), Feedback::Perfect);
        assert_eq!(Feedback::for_score(89.99), Feedback::Good);
        assert_eq!(Feedback::for_score(80.0), Feedback::Good);
        assert_eq!(Feedback::for_score(75.0), Feedback::Normal);
        assert_eq!(Feedback::for_score(74.99), Feedback::Bad);
        assert_eq!(Feedback::for_score(60.0), Feedback::Bad);
        assert_eq!(Feedback::for_score(59.99), Feedback::Worst);
        assert_eq!(Feedback::for_score(0.0), Feedback::Worst);
    }

    #[test]
    fn test_keypoint_wire_forms() {
        let keypoints: Vec<Keypoint> =
            serde_json::from_str(r#"[[0.1, 0.2], [0.3, 0.4, -0.1, 0.98], {"x": 0.5, "y": 0.6}]"#)
                .unwrap();
        assert_eq!(
            keypoints,
            vec![
                Keypoint { x: 0.1, y: 0.2 },
                Keypoint { x: 0.3, y: 0.4 },
                Keypoint { x: 0.5, y: 0.6 },
            ]
        );

        assert!(serde_json::from_str::<Keypoint>("[0.1]").is_err());
    }
}
