//! Collision math.
//!
//! Pure functions shared by the world's collision pass:
//! - Mass/radius conversion
//! - Circle contact tests
//! - Predator/prey role resolution and the squash test
//! - Rigid separation vectors

use glam::Vec2;

/// Mass = radius² / 100.
pub const MASS_CONVERSION: f32 = 100.0;

/// Calculate mass from radius.
#[inline]
pub fn radius_to_mass(radius: f32) -> f32 {
    (radius * radius) / MASS_CONVERSION
}

/// Calculate radius from mass.
#[inline]
pub fn mass_to_radius(mass: f32) -> f32 {
    (MASS_CONVERSION * mass.max(0.0)).sqrt()
}

/// Two overlapping circles.
#[derive(Debug, Clone, Copy)]
pub struct Contact {
    /// Vector from the first center to the second.
    pub delta: Vec2,
    pub distance_sq: f32,
    pub radius_sum: f32,
}

impl Contact {
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance_sq.sqrt()
    }
}

/// Circle overlap test in squared form. `None` when the circles do not overlap.
#[inline]
pub fn circle_contact(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> Option<Contact> {
    let delta = b_pos - a_pos;
    let distance_sq = delta.length_squared();
    let radius_sum = a_radius + b_radius;
    (distance_sq < radius_sum * radius_sum).then_some(Contact {
        delta,
        distance_sq,
        radius_sum,
    })
}

/// Which participant of a pair is the predator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predator {
    First,
    Second,
}

/// Role rule for an eat check: the larger circle is the predator, and only
/// when its radius is at least `eat_size_multiplier` times the prey's.
/// Pairs closer in size than that have no predator.
#[inline]
pub fn resolve_roles(a_radius: f32, b_radius: f32, eat_size_multiplier: f32) -> Option<Predator> {
    if a_radius >= b_radius * eat_size_multiplier {
        Some(Predator::First)
    } else if b_radius >= a_radius * eat_size_multiplier {
        Some(Predator::Second)
    } else {
        None
    }
}

/// Whether the prey sits deep enough inside the predator to be eaten:
/// `predator - overlap_factor * prey >= distance`, compared squared.
#[inline]
pub fn squashes(predator_radius: f32, prey_radius: f32, distance_sq: f32, overlap_factor: f32) -> bool {
    let reach = predator_radius - overlap_factor * prey_radius;
    reach >= 0.0 && reach * reach >= distance_sq
}

/// Displacements that make two overlapping circles exactly touch.
///
/// The push is split by inverse mass so heavier cells move less. Coincident
/// centers separate along +X.
pub fn separation(contact: &Contact, a_mass: f32, b_mass: f32) -> (Vec2, Vec2) {
    let distance = contact.distance();
    let overlap = contact.radius_sum - distance;
    if overlap <= 0.0 {
        return (Vec2::ZERO, Vec2::ZERO);
    }
    let axis = if distance > f32::EPSILON {
        contact.delta / distance
    } else {
        Vec2::X
    };

    let inv_a = if a_mass > 0.0 { 1.0 / a_mass } else { 1.0 };
    let inv_b = if b_mass > 0.0 { 1.0 / b_mass } else { 1.0 };
    let share_a = inv_a / (inv_a + inv_b);
    let share_b = 1.0 - share_a;

    (-axis * overlap * share_a, axis * overlap * share_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_radius_mass_conversion() {
        let mass = 100.0;
        let radius = mass_to_radius(mass);
        assert_eq!(radius, 100.0);
        assert!((radius_to_mass(radius) - mass).abs() < 0.001);
        assert_eq!(radius_to_mass(10.0), 1.0);
    }

    proptest! {
        #[test]
        fn mass_round_trip(mass in 0.0f32..1.0e6) {
            let back = radius_to_mass(mass_to_radius(mass));
            prop_assert!((back - mass).abs() <= mass * 1e-5 + 1e-5);
        }
    }

    #[test]
    fn test_collision_check() {
        let contact = circle_contact(Vec2::ZERO, 50.0, Vec2::new(30.0, 0.0), 20.0).unwrap();
        assert_eq!(contact.distance(), 30.0);
        assert_eq!(contact.radius_sum, 70.0);
    }

    #[test]
    fn test_no_collision() {
        assert!(circle_contact(Vec2::ZERO, 10.0, Vec2::new(100.0, 0.0), 10.0).is_none());
        // Touching is not overlapping.
        assert!(circle_contact(Vec2::ZERO, 10.0, Vec2::new(20.0, 0.0), 10.0).is_none());
    }

    #[test]
    fn test_resolve_roles() {
        assert_eq!(resolve_roles(40.0, 10.0, 1.15), Some(Predator::First));
        assert_eq!(resolve_roles(10.0, 40.0, 1.15), Some(Predator::Second));
        assert_eq!(resolve_roles(100.0, 90.0, 1.15), None);
        assert_eq!(resolve_roles(115.0, 100.0, 1.15), Some(Predator::First));
    }

    #[test]
    fn test_squashes() {
        let factor = 1.0 / 3.0;
        assert!(squashes(40.0, 10.0, 0.0, factor));
        // reach = 40 - 10/3 = 36.67
        assert!(squashes(40.0, 10.0, 36.0 * 36.0, factor));
        assert!(!squashes(40.0, 10.0, 37.0 * 37.0, factor));
        assert!(!squashes(10.0, 40.0, 0.0, factor));
    }

    #[test]
    fn test_separation_weights_by_mass() {
        let contact = circle_contact(Vec2::ZERO, 10.0, Vec2::new(10.0, 0.0), 10.0).unwrap();
        let (push_a, push_b) = separation(&contact, 1.0, 3.0);
        // Overlap 10, lighter cell takes three quarters.
        assert!((push_a.x + 7.5).abs() < 1e-4);
        assert!((push_b.x - 2.5).abs() < 1e-4);
        assert_eq!(push_a.y, 0.0);
    }

    #[test]
    fn test_separation_coincident_centers() {
        let contact = circle_contact(Vec2::ONE, 5.0, Vec2::ONE, 5.0).unwrap();
        let (push_a, push_b) = separation(&contact, 2.0, 2.0);
        assert_eq!(push_a, Vec2::new(-5.0, 0.0));
        assert_eq!(push_b, Vec2::new(5.0, 0.0));
    }
}
