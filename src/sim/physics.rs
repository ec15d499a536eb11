//! Capsule Collision
//!
//! The player is modeled as a vertical capsule that is swept through a
//! static collision volume built from half-space planes (floor, arena
//! walls, ramps). The volume answers exactly one query: does a capsule
//! intersect, and if so what is the deepest contact?
//!
//! Contact response lives in the character controller; this module only
//! reports `{normal, depth}` pairs, so alternative volume implementations
//! can be swapped in behind the `CollisionQuery` trait.

use macroquad::math::Vec3;

/// Touching counts as contact up to this distance, so a capsule resting
/// exactly on a floor keeps reporting a zero-depth contact instead of
/// flickering between grounded and airborne.
pub const CONTACT_SKIN: f32 = 1e-3;

/// A swept-sphere collision probe: two endpoints and a radius.
///
/// `end` is the upper point for an upright character; the controller
/// writes `end` back as the entity position after resolution.
#[derive(Debug, Clone, Copy)]
pub struct Capsule {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Move both endpoints by the same offset.
    pub fn translate(&mut self, delta: Vec3) {
        self.start += delta;
        self.end += delta;
    }
}

/// A single collision contact: unit surface normal pointing out of the
/// obstacle, and how far the capsule has penetrated along it.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    pub normal: Vec3,
    pub depth: f32,
}

/// Anything that can answer the capsule query. The controller only ever
/// talks to this trait, never to a concrete volume type.
pub trait CollisionQuery {
    fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact>;
}

/// An oriented half-space: points with `normal · p + offset >= 0` are
/// outside the solid.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    normal: Vec3,
    offset: f32,
}

impl Plane {
    /// Build from a (not necessarily unit) normal and a point on the plane.
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            offset: -normal.dot(point),
        }
    }

    /// Horizontal floor at the given height, solid below.
    pub fn floor(height: f32) -> Self {
        Self::from_point_normal(Vec3::new(0.0, height, 0.0), Vec3::Y)
    }

    /// Signed distance from a point to the plane surface.
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.offset
    }
}

/// Static level geometry as a set of half-space planes.
///
/// Good enough for an arena (floor plus boundary walls); anything fancier
/// plugs in behind `CollisionQuery` without touching the controller.
#[derive(Debug, Default)]
pub struct StaticVolume {
    planes: Vec<Plane>,
}

impl StaticVolume {
    pub fn new() -> Self {
        Self { planes: Vec::new() }
    }

    pub fn push(&mut self, plane: Plane) {
        self.planes.push(plane);
    }

    /// Flat floor plus four boundary walls, the demo arena.
    pub fn arena(floor_height: f32, half_extent: f32) -> Self {
        let mut volume = Self::new();
        volume.push(Plane::floor(floor_height));
        volume.push(Plane::from_point_normal(
            Vec3::new(half_extent, 0.0, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        ));
        volume.push(Plane::from_point_normal(
            Vec3::new(-half_extent, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
        ));
        volume.push(Plane::from_point_normal(
            Vec3::new(0.0, 0.0, half_extent),
            Vec3::new(0.0, 0.0, -1.0),
        ));
        volume.push(Plane::from_point_normal(
            Vec3::new(0.0, 0.0, -half_extent),
            Vec3::new(0.0, 0.0, 1.0),
        ));
        volume
    }
}

impl CollisionQuery for StaticVolume {
    /// Deepest contact among all penetrated planes, or `None` when the
    /// capsule is clear of everything.
    fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact> {
        let mut deepest: Option<Contact> = None;

        for plane in &self.planes {
            let distance = plane
                .signed_distance(capsule.start)
                .min(plane.signed_distance(capsule.end));
            let penetration = capsule.radius - distance;

            if penetration < -CONTACT_SKIN {
                continue;
            }

            // Touching within the skin reports depth 0 so resolution is a
            // no-op for a resting contact.
            let contact = Contact {
                normal: plane.normal,
                depth: penetration.max(0.0),
            };
            match deepest {
                Some(best) if best.depth >= contact.depth => {}
                _ => deepest = Some(contact),
            }
        }

        deepest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::math::vec3;

    fn player_capsule(feet: Vec3) -> Capsule {
        Capsule::new(
            feet + vec3(0.0, 0.35, 0.0),
            feet + vec3(0.0, 1.0, 0.0),
            0.35,
        )
    }

    #[test]
    fn clear_capsule_reports_no_contact() {
        let volume = StaticVolume::arena(0.0, 50.0);
        let capsule = player_capsule(vec3(0.0, 5.0, 0.0));
        assert!(volume.capsule_intersect(&capsule).is_none());
    }

    #[test]
    fn resting_contact_has_zero_depth_and_up_normal() {
        let volume = StaticVolume::arena(0.0, 50.0);
        // Lower sphere center at y = 0.35 with radius 0.35: exactly resting.
        let capsule = player_capsule(Vec3::ZERO);

        let contact = volume.capsule_intersect(&capsule).unwrap();
        assert!(contact.normal.y > 0.0);
        assert!(contact.depth.abs() < 1e-6);
    }

    #[test]
    fn penetration_depth_matches_overlap() {
        let volume = StaticVolume::arena(0.0, 50.0);
        let capsule = player_capsule(vec3(0.0, -0.1, 0.0));

        let contact = volume.capsule_intersect(&capsule).unwrap();
        assert!((contact.depth - 0.1).abs() < 1e-6);
    }

    #[test]
    fn deepest_plane_wins() {
        let volume = StaticVolume::arena(0.0, 10.0);
        // Resting on the floor (depth 0) while 0.25 deep into the +X wall.
        let capsule = player_capsule(vec3(9.9, 0.0, 0.0));

        let contact = volume.capsule_intersect(&capsule).unwrap();
        assert!(contact.normal.x < 0.0, "wall contact should win: {contact:?}");
    }

    #[test]
    fn empty_volume_never_intersects() {
        let volume = StaticVolume::new();
        let capsule = player_capsule(vec3(0.0, -100.0, 0.0));
        assert!(volume.capsule_intersect(&capsule).is_none());
    }
}
