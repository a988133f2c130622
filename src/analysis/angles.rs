//! Joint angle geometry
//!
//! Computes interior joint angles from landmark triples and the torso tilt
//! used by the exercise classifier. All angles are in degrees. Joint angles
//! are rounded to whole degrees and always land in 0-180; torso tilt stays
//! fractional because the classifier compares it against float breakpoints.

use crate::pose::{self, Landmark};

/// Interior angle at `vertex` formed by the rays to `first` and `last`.
///
/// Uses only the x/y image coordinates. A reflex measurement (over 180
/// degrees) is folded back so the result is the interior angle. A triple
/// with a zero-length ray carries no direction, so it reads as 0.
pub fn joint_angle(first: Landmark, vertex: Landmark, last: Landmark) -> u32 {
    let degenerate = (first.x == vertex.x && first.y == vertex.y)
        || (last.x == vertex.x && last.y == vertex.y);
    if degenerate {
        return 0;
    }

    let radians =
        (last.y - vertex.y).atan2(last.x - vertex.x) - (first.y - vertex.y).atan2(first.x - vertex.x);
    let mut degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        degrees = 360.0 - degrees;
    }
    if !degrees.is_finite() {
        return 0;
    }

    degrees.round() as u32
}

/// Torso tilt in degrees, from the shoulder midpoint to the hip midpoint.
///
/// Near 90 means an upright torso, near 0 means horizontal (plank-like).
/// Returns `None` when the frame is too short to contain all four torso
/// landmarks; visibility is deliberately not consulted here.
pub fn torso_tilt_deg(frame: &[Landmark]) -> Option<f32> {
    let left_shoulder = pose::landmark(frame, pose::LEFT_SHOULDER)?;
    let right_shoulder = pose::landmark(frame, pose::RIGHT_SHOULDER)?;
    let left_hip = pose::landmark(frame, pose::LEFT_HIP)?;
    let right_hip = pose::landmark(frame, pose::RIGHT_HIP)?;

    let shoulder_mid_x = (left_shoulder.x + right_shoulder.x) / 2.0;
    let shoulder_mid_y = (left_shoulder.y + right_shoulder.y) / 2.0;
    let hip_mid_x = (left_hip.x + right_hip.x) / 2.0;
    let hip_mid_y = (left_hip.y + right_hip.y) / 2.0;

    let tilt = (shoulder_mid_y - hip_mid_y)
        .atan2(shoulder_mid_x - hip_mid_x)
        .abs()
        .to_degrees();
    Some(tilt)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lm(x: f32, y: f32) -> Landmark {
        Landmark::new(x, y, 0.0, 1.0)
    }

    #[test]
    fn test_right_angle() {
        // Vertical ray up, horizontal ray right
        let angle = joint_angle(lm(0.5, 0.3), lm(0.5, 0.5), lm(0.7, 0.5));
        assert_eq!(angle, 90);
    }

    #[test]
    fn test_straight_limb_reads_180() {
        let angle = joint_angle(lm(0.5, 0.2), lm(0.5, 0.5), lm(0.5, 0.8));
        assert_eq!(angle, 180);
    }

    #[test]
    fn test_fully_folded_limb_reads_0() {
        let angle = joint_angle(lm(0.5, 0.2), lm(0.5, 0.5), lm(0.5, 0.3));
        assert_eq!(angle, 0);
    }

    #[test]
    fn test_reflex_measurement_folds_back() {
        // Rays at polar angles -90 and 150: raw sweep is 240, interior is 120
        let angle = joint_angle(
            lm(0.5, 0.3),
            lm(0.5, 0.5),
            lm(0.5 - 0.173, 0.5 + 0.1),
        );
        assert_eq!(angle, 120);
    }

    #[test]
    fn test_degenerate_triple_reads_0() {
        let vertex = lm(0.5, 0.5);
        assert_eq!(joint_angle(vertex, vertex, lm(0.7, 0.5)), 0);
        assert_eq!(joint_angle(lm(0.7, 0.5), vertex, vertex), 0);
    }

    #[test]
    fn test_translation_invariance() {
        let base = joint_angle(lm(0.2, 0.1), lm(0.3, 0.4), lm(0.6, 0.5));
        let shifted = joint_angle(lm(0.45, 0.35), lm(0.55, 0.65), lm(0.85, 0.75));
        assert_eq!(base, shifted);
    }

    #[test]
    fn test_positive_scale_invariance() {
        let base = joint_angle(lm(0.2, 0.1), lm(0.3, 0.4), lm(0.6, 0.5));
        let scaled = joint_angle(lm(0.4, 0.2), lm(0.6, 0.8), lm(1.2, 1.0));
        assert_eq!(base, scaled);
    }

    #[test]
    fn test_angle_stays_in_valid_range() {
        let samples = [
            (lm(0.1, 0.9), lm(0.5, 0.5), lm(0.9, 0.9)),
            (lm(0.9, 0.1), lm(0.5, 0.5), lm(0.1, 0.9)),
            (lm(0.5, 0.1), lm(0.5, 0.5), lm(0.6, 0.9)),
            (lm(0.2, 0.5), lm(0.5, 0.5), lm(0.8, 0.51)),
        ];
        for (a, b, c) in samples {
            let angle = joint_angle(a, b, c);
            assert!(angle <= 180, "angle {} out of range", angle);
        }
    }

    #[test]
    fn test_torso_tilt_upright() {
        // Shoulders directly above hips
        let mut frame = vec![Landmark::default(); pose::POSE_LANDMARK_COUNT];
        frame[pose::LEFT_SHOULDER] = lm(0.45, 0.3);
        frame[pose::RIGHT_SHOULDER] = lm(0.55, 0.3);
        frame[pose::LEFT_HIP] = lm(0.45, 0.6);
        frame[pose::RIGHT_HIP] = lm(0.55, 0.6);

        let tilt = torso_tilt_deg(&frame).unwrap();
        assert!((tilt - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_torso_tilt_horizontal() {
        // Plank with shoulders ahead of hips along +x
        let mut frame = vec![Landmark::default(); pose::POSE_LANDMARK_COUNT];
        frame[pose::LEFT_SHOULDER] = lm(0.7, 0.5);
        frame[pose::RIGHT_SHOULDER] = lm(0.7, 0.56);
        frame[pose::LEFT_HIP] = lm(0.3, 0.5);
        frame[pose::RIGHT_HIP] = lm(0.3, 0.56);

        let tilt = torso_tilt_deg(&frame).unwrap();
        assert!(tilt < 1.0, "tilt {} should be near horizontal", tilt);
    }

    #[test]
    fn test_torso_tilt_missing_landmarks() {
        let frame = vec![Landmark::default(); pose::LEFT_HIP];
        assert!(torso_tilt_deg(&frame).is_none());
    }
}
