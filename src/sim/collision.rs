//! Ray queries against platform and ceiling boxes
//!
//! Standing, bouncing, warping and spawn-overlap rejection all come down to
//! casting rays through a flat list of [`Collider`]s. No scene graph needed.

use glam::DVec3;

use super::aabb::{Aabb, Ray};
use super::field::PlatformId;

/// What a ray struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Platform(PlatformId),
    /// The descending ceiling surface
    Boundary,
}

/// A box tagged with the entity it belongs to
#[derive(Debug, Clone, Copy)]
pub struct Collider {
    pub aabb: Aabb,
    pub target: HitTarget,
}

/// Nearest hit along a ray
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f64,
    pub point: DVec3,
    pub target: HitTarget,
}

/// Cast a single ray, returning the nearest hit within `ray.max_dist`
pub fn cast_ray<'a, I>(ray: &Ray, colliders: I) -> Option<RayHit>
where
    I: IntoIterator<Item = &'a Collider>,
{
    colliders
        .into_iter()
        .filter_map(|c| {
            c.aabb.ray_hit(ray).map(|distance| RayHit {
                distance,
                point: ray.at(distance),
                target: c.target,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

/// Origins of the five-ray footprint probe: center first, then the four
/// corners of a horizontal square of side `body_size`.
pub fn probe_origins(center: DVec3, body_size: f64) -> [DVec3; 5] {
    let h = body_size / 2.0;
    [
        center,
        center + DVec3::new(-h, 0.0, -h),
        center + DVec3::new(-h, 0.0, h),
        center + DVec3::new(h, 0.0, -h),
        center + DVec3::new(h, 0.0, h),
    ]
}

/// Cast the footprint probe along `dir` (usually ±Y).
///
/// Rays are tried center-first then corners; the first ray that hits
/// anything decides, returning its nearest hit.
pub fn cast_probe(
    center: DVec3,
    dir: DVec3,
    length: f64,
    body_size: f64,
    colliders: &[Collider],
) -> Option<RayHit> {
    probe_origins(center, body_size)
        .into_iter()
        .find_map(|origin| cast_ray(&Ray::new(origin, dir, length), colliders))
}

/// Number of box surfaces crossed by a downward ray from `point`.
///
/// A box wholly below the point is entered and exited (2 crossings); a box
/// the point sits in is only exited (1 crossing).
pub fn crossing_count<'a, I>(point: DVec3, boxes: I) -> u32
where
    I: IntoIterator<Item = &'a Aabb>,
{
    let ray = Ray::unbounded(point, DVec3::NEG_Y);
    boxes
        .into_iter()
        .filter_map(|b| b.ray_span(&ray))
        .map(|(enter, _)| if enter > 0.0 { 2 } else { 1 })
        .sum()
}

/// Even crossing parity for each box on its own: the point is outside all
/// of them. The summed [`crossing_count`] reads as even for a point inside
/// two overlapping boxes.
#[inline]
pub fn point_is_free<'a, I>(point: DVec3, boxes: I) -> bool
where
    I: IntoIterator<Item = &'a Aabb>,
{
    let ray = Ray::unbounded(point, DVec3::NEG_Y);
    boxes
        .into_iter()
        .filter_map(|b| b.ray_span(&ray))
        .all(|(enter, _)| enter > 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slab(center: DVec3, id: u32) -> Collider {
        Collider {
            aabb: Aabb::from_center(center, DVec3::new(3.0, 0.5, 3.0)),
            target: HitTarget::Platform(PlatformId(id)),
        }
    }

    #[test]
    fn test_cast_ray_returns_nearest() {
        let colliders = [
            slab(DVec3::new(0.0, -10.0, 0.0), 1),
            slab(DVec3::new(0.0, -4.0, 0.0), 2),
        ];
        let hit = cast_ray(&Ray::down(DVec3::ZERO, 50.0), &colliders).unwrap();
        assert_eq!(hit.target, HitTarget::Platform(PlatformId(2)));
        assert!((hit.distance - 3.5).abs() < 1e-9);
        assert!((hit.point.y + 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_cast_ray_miss() {
        let colliders = [slab(DVec3::new(20.0, -4.0, 0.0), 1)];
        assert!(cast_ray(&Ray::down(DVec3::ZERO, 50.0), &colliders).is_none());
    }

    #[test]
    fn test_probe_corner_catches_ledge() {
        // Platform edge sits under the +x corners only
        let colliders = [slab(DVec3::new(3.5, -3.0, 0.0), 7)];
        let hit = cast_probe(DVec3::ZERO, DVec3::NEG_Y, 5.0, 2.0, &colliders).unwrap();
        assert_eq!(hit.target, HitTarget::Platform(PlatformId(7)));
        assert!((hit.distance - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_probe_center_wins_over_closer_corner() {
        let colliders = [
            slab(DVec3::new(0.0, -4.0, 0.0), 1),
            // Only reachable by the +x corners, and closer
            slab(DVec3::new(3.9, -1.0, 0.0), 2),
        ];
        let hit = cast_probe(DVec3::ZERO, DVec3::NEG_Y, 5.0, 2.0, &colliders).unwrap();
        assert_eq!(hit.target, HitTarget::Platform(PlatformId(1)));
    }

    #[test]
    fn test_crossing_parity() {
        let boxes = [
            Aabb::from_center(DVec3::new(0.0, -10.0, 0.0), DVec3::splat(2.0)),
            Aabb::from_center(DVec3::new(0.0, 0.0, 0.0), DVec3::splat(2.0)),
        ];
        // Above both: enters and exits each
        assert_eq!(crossing_count(DVec3::new(0.0, 5.0, 0.0), &boxes), 4);
        assert!(point_is_free(DVec3::new(0.0, 5.0, 0.0), &boxes));
        // Inside the upper box
        assert_eq!(crossing_count(DVec3::ZERO, &boxes), 3);
        assert!(!point_is_free(DVec3::ZERO, &boxes));
        // Empty field is always free
        assert!(point_is_free(DVec3::ZERO, &Vec::<Aabb>::new()));
    }

    #[test]
    fn test_point_in_two_overlapping_boxes_is_not_free() {
        let boxes = [
            Aabb::from_center(DVec3::new(0.0, -10.0, 0.0), DVec3::new(9.0, 6.0, 9.0)),
            Aabb::from_center(DVec3::new(10.0, -10.0, 0.0), DVec3::new(9.0, 6.0, 9.0)),
        ];
        let inside_both = DVec3::new(5.0, -10.0, 0.0);
        // One exit per box sums to an even count
        assert_eq!(crossing_count(inside_both, &boxes), 2);
        assert!(!point_is_free(inside_both, &boxes));
        // Above both boxes is still free
        assert!(point_is_free(DVec3::new(5.0, 0.0, 0.0), &boxes));
    }
}
