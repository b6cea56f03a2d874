//! Joint angle from three landmarks
//!
//! Angle at vertex `b` between rays `b->a` and `b->c`:
//! cos(θ) = (v1 · v2) / (|v1| × |v2|), result in degrees within [0, 180].

use taiji_core::Point;

/// Whether the z coordinate takes part in the angle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Image plane only, z ignored
    #[default]
    Planar,
    /// Include z; a point without z sits at z = 0
    Spatial,
}

/// Rays shorter than this are treated as coincident points
const MIN_RAY_LENGTH: f64 = 1e-9;

/// Angle at `b`, or `None` if any point is missing or a ray is degenerate
pub fn joint_angle(
    a: Option<&Point>,
    b: Option<&Point>,
    c: Option<&Point>,
    projection: Projection,
) -> Option<f64> {
    angle_at(a?, b?, c?, projection)
}

/// Angle at `b` for points that are known to be present
pub fn angle_at(a: &Point, b: &Point, c: &Point, projection: Projection) -> Option<f64> {
    if !(a.is_finite() && b.is_finite() && c.is_finite()) {
        return None;
    }

    let v1 = ray(b, a, projection);
    let v2 = ray(b, c, projection);

    let dot = v1[0] * v2[0] + v1[1] * v2[1] + v1[2] * v2[2];
    let mag1 = (v1[0] * v1[0] + v1[1] * v1[1] + v1[2] * v1[2]).sqrt();
    let mag2 = (v2[0] * v2[0] + v2[1] * v2[1] + v2[2] * v2[2]).sqrt();

    if mag1 < MIN_RAY_LENGTH || mag2 < MIN_RAY_LENGTH {
        return None;
    }

    // Rounding can push the ratio just past ±1, which acos turns into NaN
    let cos_angle = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);

    Some(cos_angle.acos().to_degrees())
}

fn ray(from: &Point, to: &Point, projection: Projection) -> [f64; 3] {
    let dz = match projection {
        Projection::Planar => 0.0,
        Projection::Spatial => to.z.unwrap_or(0.0) - from.z.unwrap_or(0.0),
    };
    [to.x - from.x, to.y - from.y, dz]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_straight_limb() {
        let angle = angle_at(&p(0.0, 0.0), &p(0.5, 0.0), &p(1.0, 0.0), Projection::Planar);
        assert!((angle.unwrap() - 180.0).abs() < 1e-9);
    }

    #[test]
    fn test_right_angle() {
        let angle = angle_at(&p(0.0, 0.0), &p(0.5, 0.0), &p(0.5, 0.5), Projection::Planar);
        assert!((angle.unwrap() - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_folded_limb_is_zero_not_undefined() {
        let angle = angle_at(&p(1.0, 0.0), &p(0.0, 0.0), &p(2.0, 0.0), Projection::Planar);
        assert_eq!(angle, Some(0.0));
    }

    #[test]
    fn test_missing_point_is_undefined() {
        let a = p(0.0, 0.0);
        let b = p(1.0, 0.0);
        assert_eq!(joint_angle(Some(&a), Some(&b), None, Projection::Planar), None);
        assert_eq!(joint_angle(None, Some(&b), Some(&a), Projection::Planar), None);
    }

    #[test]
    fn test_coincident_points_are_undefined() {
        let b = p(0.3, 0.3);
        assert_eq!(angle_at(&b, &b, &p(1.0, 1.0), Projection::Planar), None);
        assert_eq!(angle_at(&p(1.0, 1.0), &b, &b, Projection::Planar), None);
    }

    #[test]
    fn test_non_finite_is_undefined() {
        let angle = angle_at(&p(f64::NAN, 0.0), &p(0.0, 0.0), &p(1.0, 1.0), Projection::Planar);
        assert_eq!(angle, None);
    }

    #[test]
    fn test_spatial_projection_uses_depth() {
        let a = p(0.0, 1.0).with_z(0.0);
        let b = p(0.0, 0.0).with_z(0.0);
        let c = p(0.0, 0.0).with_z(1.0);

        // In the image plane c sits on b, so the planar angle is undefined
        assert_eq!(angle_at(&a, &b, &c, Projection::Planar), None);
        let spatial = angle_at(&a, &b, &c, Projection::Spatial).unwrap();
        assert!((spatial - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_spatial_without_depth_matches_planar() {
        let a = p(0.1, 0.9);
        let b = p(0.4, 0.5);
        let c = p(0.8, 0.7);
        assert_eq!(
            angle_at(&a, &b, &c, Projection::Planar),
            angle_at(&a, &b, &c, Projection::Spatial)
        );
    }

    #[test]
    fn test_nearly_collinear_does_not_overshoot() {
        // Tiny perpendicular offsets make the cosine ratio round past 1.0
        let a = p(1e8, 1e-8);
        let b = p(0.0, 0.0);
        let c = p(3e8, 3e-8);
        let angle = angle_at(&a, &b, &c, Projection::Planar).unwrap();
        assert!(!angle.is_nan());
        assert!(angle >= 0.0);
    }

    fn coord() -> impl Strategy<Value = f64> {
        -1000.0f64..1000.0
    }

    proptest! {
        #[test]
        fn prop_angle_in_range(
            ax in coord(), ay in coord(),
            bx in coord(), by in coord(),
            cx in coord(), cy in coord(),
        ) {
            let a = p(ax, ay);
            let b = p(bx, by);
            let c = p(cx, cy);
            prop_assume!((ax - bx).hypot(ay - by) > 1e-6);
            prop_assume!((cx - bx).hypot(cy - by) > 1e-6);

            let angle = angle_at(&a, &b, &c, Projection::Planar);
            prop_assert!(angle.is_some());
            let angle = angle.unwrap();
            prop_assert!(!angle.is_nan());
            prop_assert!((0.0..=180.0).contains(&angle));
        }

        #[test]
        fn prop_swapping_ends_is_symmetric(
            ax in coord(), ay in coord(), az in coord(),
            bx in coord(), by in coord(), bz in coord(),
            cx in coord(), cy in coord(), cz in coord(),
        ) {
            let a = p(ax, ay).with_z(az);
            let b = p(bx, by).with_z(bz);
            let c = p(cx, cy).with_z(cz);

            for projection in [Projection::Planar, Projection::Spatial] {
                prop_assert_eq!(
                    angle_at(&a, &b, &c, projection),
                    angle_at(&c, &b, &a, projection)
                );
            }
        }

        #[test]
        fn prop_mirrored_rays_are_symmetric(
            bx in coord(), by in coord(),
            len in 0.01f64..100.0,
            half in 0.0f64..std::f64::consts::PI,
            axis in 0.0f64..std::f64::consts::TAU,
        ) {
            // a and c equidistant from b, mirrored about the axis through b
            let b = p(bx, by);
            let a = p(bx + len * (axis + half).cos(), by + len * (axis + half).sin());
            let c = p(bx + len * (axis - half).cos(), by + len * (axis - half).sin());

            let forward = angle_at(&a, &b, &c, Projection::Planar);
            let backward = angle_at(&c, &b, &a, Projection::Planar);
            prop_assert_eq!(forward, backward);
        }
    }
}
