use crate::color::{Color, WARM_PALETTE};
use crate::config::BoundaryPolicy;
use crate::rng::RandomSource;
use crate::Vector2D;
use core::f32::consts::TAU;

/// A single particle in the field
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub size: f32,
    pub color: Color,
    /// Orbit phase offset, only read by ambient particles
    pub drift: f32,
}

impl Particle {
    pub fn new(position: Vector2D, velocity: Vector2D, size: f32, color: Color) -> Self {
        Self {
            position,
            velocity,
            size,
            color,
            drift: 0.0,
        }
    }

    /// Scattered somewhere in the viewport with a slight initial drift
    pub fn random<R: RandomSource>(width: f32, height: f32, rng: &mut R) -> Self {
        let position = Vector2D::new(rng.next_f32() * width, rng.next_f32() * height);
        let velocity = Vector2D::new(rng.centered(0.6), rng.centered(0.6));
        let size = rng.range_f32(0.9, 3.0);
        let color = WARM_PALETTE[rng.index(WARM_PALETTE.len())];

        Self {
            drift: rng.next_f32() * TAU,
            ..Self::new(position, velocity, size, color)
        }
    }

    pub fn apply_force(&mut self, force: Vector2D) {
        self.velocity += force;
    }

    /// Damp velocity, then move by it
    pub fn integrate(&mut self, damping: f32) {
        self.velocity *= damping;
        self.position += self.velocity;
    }

    pub fn wrap_edges(&mut self, width: f32, height: f32, margin: f32) {
        if self.position.x < -margin {
            self.position.x = width + margin;
        } else if self.position.x > width + margin {
            self.position.x = -margin;
        }

        if self.position.y < -margin {
            self.position.y = height + margin;
        } else if self.position.y > height + margin {
            self.position.y = -margin;
        }
    }

    pub fn apply_boundary(&mut self, policy: BoundaryPolicy, width: f32, height: f32) {
        match policy {
            BoundaryPolicy::Wrap { margin } => self.wrap_edges(width, height, margin),
            BoundaryPolicy::Unbounded => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SimpleRng;

    #[test]
    fn test_particle_integrate() {
        let mut particle = Particle::new(
            Vector2D::new(0.0, 0.0),
            Vector2D::new(2.0, -4.0),
            1.0,
            WARM_PALETTE[0],
        );

        particle.integrate(0.5);

        assert_eq!(particle.velocity, Vector2D::new(1.0, -2.0));
        assert_eq!(particle.position, Vector2D::new(1.0, -2.0));
    }

    #[test]
    fn test_random_particle_attributes() {
        let mut rng = SimpleRng::new(99);

        for _ in 0..200 {
            let p = Particle::random(800.0, 600.0, &mut rng);
            assert!((0.0..800.0).contains(&p.position.x));
            assert!((0.0..600.0).contains(&p.position.y));
            assert!((0.9..3.0).contains(&p.size));
            assert!(p.velocity.x.abs() <= 0.6 && p.velocity.y.abs() <= 0.6);
            assert!(WARM_PALETTE.contains(&p.color));
            assert!((0.0..TAU).contains(&p.drift));
        }
    }

    #[test]
    fn test_wrap_past_right_edge() {
        let mut particle = Particle::new(
            Vector2D::new(820.5, 300.0),
            Vector2D::zero(),
            1.0,
            WARM_PALETTE[0],
        );

        particle.apply_boundary(BoundaryPolicy::Wrap { margin: 20.0 }, 800.0, 600.0);
        assert_eq!(particle.position.x, -20.0);
        assert_eq!(particle.position.y, 300.0);
    }

    #[test]
    fn test_wrap_past_top_edge() {
        let mut particle = Particle::new(
            Vector2D::new(10.0, -25.0),
            Vector2D::zero(),
            1.0,
            WARM_PALETTE[0],
        );

        particle.wrap_edges(800.0, 600.0, 20.0);
        assert_eq!(particle.position.y, 620.0);
    }

    #[test]
    fn test_unbounded_leaves_position() {
        let mut particle = Particle::new(
            Vector2D::new(-500.0, 900.0),
            Vector2D::zero(),
            1.0,
            WARM_PALETTE[0],
        );

        particle.apply_boundary(BoundaryPolicy::Unbounded, 800.0, 600.0);
        assert_eq!(particle.position, Vector2D::new(-500.0, 900.0));
    }
}
