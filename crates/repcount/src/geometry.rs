//! Planar angle and distance helpers over normalized image coordinates.
//!
//! All functions are total: degenerate or non-finite input maps to a defined
//! fallback (`0.0`) instead of NaN, so downstream band checks simply fail.

use nalgebra::Vector2;

/// Rays shorter than this are treated as coincident points.
const EPS_LEN: f64 = 1e-12;

#[inline]
fn is_finite(p: Vector2<f64>) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

/// Angle at vertex `b` between the rays `b→a` and `b→c`, in degrees.
///
/// Pre: none; any input is accepted.
/// Post: result lies in `[0, 180]`. Reflex differences are folded to `360 − θ`.
/// Coincident or non-finite points give `0`.
pub fn angle(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    if !(is_finite(a) && is_finite(b) && is_finite(c)) {
        return 0.0;
    }
    let ba = a - b;
    let bc = c - b;
    if ba.norm() < EPS_LEN || bc.norm() < EPS_LEN {
        return 0.0;
    }
    let radians = bc.y.atan2(bc.x) - ba.y.atan2(ba.x);
    let deg = radians.to_degrees().abs();
    let folded = if deg > 180.0 { 360.0 - deg } else { deg };
    // Rounding in the degree conversion can step just outside the range.
    folded.clamp(0.0, 180.0)
}

/// Euclidean distance; `0` when either point is non-finite.
#[inline]
pub fn distance(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    if !(is_finite(a) && is_finite(b)) {
        return 0.0;
    }
    (a - b).norm()
}

/// Component-wise average of two points.
#[inline]
pub fn midpoint(a: Vector2<f64>, b: Vector2<f64>) -> Vector2<f64> {
    (a + b) * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn angle_table() {
        let cases = [
            // (a, b, c, expected)
            (vector![0.0, 0.0], vector![0.5, 0.0], vector![1.0, 0.0], 180.0),
            (vector![0.0, 0.0], vector![0.5, 0.0], vector![0.5, 0.5], 90.0),
            (vector![1.0, 0.0], vector![0.0, 0.0], vector![1.0, 1.0], 45.0),
            (vector![1.0, 0.0], vector![0.0, 0.0], vector![1.0, 0.0], 0.0),
            (vector![1.0, 0.0], vector![0.0, 0.0], vector![0.0, -1.0], 90.0),
            // atan2 difference of 270° folds to 90°
            (vector![-1.0, 0.0], vector![0.0, 0.0], vector![0.0, -1.0], 90.0),
        ];
        for (a, b, c, expected) in cases {
            let got = angle(a, b, c);
            assert!(
                (got - expected).abs() < 1e-9,
                "angle({a:?},{b:?},{c:?}) = {got}, expected {expected}"
            );
        }
    }

    #[test]
    fn angle_degenerate_is_zero() {
        let p = vector![0.3, 0.4];
        assert_eq!(angle(p, p, vector![1.0, 1.0]), 0.0);
        assert_eq!(angle(vector![1.0, 1.0], p, p), 0.0);
        assert_eq!(angle(p, p, p), 0.0);
        assert_eq!(angle(vector![f64::NAN, 0.0], p, vector![1.0, 1.0]), 0.0);
        assert_eq!(angle(vector![0.0, 0.0], p, vector![f64::INFINITY, 1.0]), 0.0);
    }

    #[test]
    fn angle_symmetric_in_outer_points_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let a = vector![rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)];
            let b = vector![rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)];
            let c = vector![rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)];
            let ab = angle(a, b, c);
            assert!((0.0..=180.0).contains(&ab));
            assert!((ab - angle(c, b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn distance_and_midpoint() {
        assert!((distance(vector![0.0, 0.0], vector![0.3, 0.4]) - 0.5).abs() < 1e-12);
        assert_eq!(distance(vector![f64::NAN, 0.0], vector![0.3, 0.4]), 0.0);
        let m = midpoint(vector![0.2, 0.4], vector![0.6, 0.8]);
        assert!((m.x - 0.4).abs() < 1e-12 && (m.y - 0.6).abs() < 1e-12);
    }
}
