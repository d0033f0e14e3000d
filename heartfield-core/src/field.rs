use crate::config::{FieldConfig, FrameClear};
use crate::math;
use crate::particle::Particle;
use crate::rng::RandomSource;
use crate::surface::Surface;
use crate::{PointerState, Vector2D};
use alloc::vec::Vec;
use heartfield_shared::SceneMode;

// Ambient orbit geometry, relative to min(width, height)
const ORBIT_BASE_RADIUS: f32 = 0.3;
const ORBIT_RADIUS_STEP: f32 = 0.05;
const ORBIT_VERTICAL_SQUASH: f32 = 0.6;
const ORBIT_VERTICAL_RATE: f32 = 1.2;

/// Velocity change a pointer at `pointer` applies to a particle at `position`.
///
/// Linear falloff from full `strength` at the pointer to zero at `radius`.
/// A positive `direction` pushes away from the pointer, a negative one pulls.
pub fn pointer_force(
    position: Vector2D,
    pointer: Vector2D,
    radius: f32,
    strength: f32,
    direction: f32,
) -> Vector2D {
    let offset = position - pointer;
    let mut distance = offset.magnitude();
    if distance == 0.0 {
        distance = 1.0;
    }
    if distance >= radius {
        return Vector2D::zero();
    }

    let falloff = (radius - distance) / radius;
    offset / distance * (falloff * strength * direction)
}

/// Fixed-size particle pool steering toward a target set
#[derive(Debug, Clone)]
pub struct ParticleField {
    pub particles: Vec<Particle>,
    pub targets: Vec<Vector2D>,
    pub config: FieldConfig,
    pub width: f32,
    pub height: f32,
    pulse_phase: f32,
    tick: u32,
}

impl ParticleField {
    pub fn new<R: RandomSource>(width: f32, height: f32, config: FieldConfig, rng: &mut R) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            targets: Vec::new(),
            config,
            width,
            height,
            pulse_phase: 0.0,
            tick: 0,
        };
        field.rebuild(width, height, rng);
        field
    }

    /// Replace the pool with fresh particles sized for the new viewport
    pub fn rebuild<R: RandomSource>(&mut self, width: f32, height: f32, rng: &mut R) {
        self.width = width;
        self.height = height;
        let count = self.config.particle_count(width, height);
        self.particles = (0..count)
            .map(|_| Particle::random(width, height, rng))
            .collect();
        log::debug!("particle pool rebuilt: {} particles for {}x{}", count, width, height);
    }

    pub fn set_targets(&mut self, targets: Vec<Vector2D>) {
        self.targets = targets;
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn pulse_phase(&self) -> f32 {
        self.pulse_phase
    }

    /// Heart frames advanced so far; drives the ambient orbit
    pub fn frame_tick(&self) -> u32 {
        self.tick
    }

    /// Particles below this index follow the sampled targets, the rest are ambient
    pub fn shape_count(&self, heart: bool) -> usize {
        if heart {
            let fraction = self.config.shape_fraction.clamp(0.0, 1.0);
            ((self.particles.len() as f32 * fraction) as usize).min(self.particles.len())
        } else {
            self.particles.len()
        }
    }

    /// Scale applied to heart targets around the viewport center this frame
    pub fn pulse_factor(&self, heart: bool) -> f32 {
        if heart {
            1.0 + math::sin(self.pulse_phase) * self.config.pulse_amplitude
        } else {
            1.0
        }
    }

    /// Point ambient particle `index` is currently chasing
    pub fn orbit_point(&self, index: usize, drift: f32) -> Vector2D {
        let radius = self.width.min(self.height)
            * (ORBIT_BASE_RADIUS + (index % 7) as f32 * ORBIT_RADIUS_STEP);
        let theta =
            self.tick as f32 * self.config.orbit_speed + drift * (1.0 + (index % 3) as f32 * 0.2);
        let center = self.center();

        Vector2D::new(
            center.x + math::cos(theta) * radius,
            center.y + math::sin(theta * ORBIT_VERTICAL_RATE) * radius * ORBIT_VERTICAL_SQUASH,
        )
    }

    /// Target for shape particle `index`, pulse included. `None` when there are no targets.
    pub fn shape_target(&self, index: usize, heart: bool) -> Option<Vector2D> {
        if self.targets.is_empty() {
            return None;
        }
        let target = self.targets[index % self.targets.len()];
        if heart {
            Some(target.scale_about(self.center(), self.pulse_factor(true)))
        } else {
            Some(target)
        }
    }

    /// Advance every particle by one frame
    pub fn step<R: RandomSource>(
        &mut self,
        heart: bool,
        pointer: &PointerState,
        mode: SceneMode,
        rng: &mut R,
    ) {
        if heart {
            self.pulse_phase += self.config.pulse_speed;
            self.tick = self.tick.wrapping_add(1);
        }

        let shape_count = self.shape_count(heart);
        let attraction = self.config.attraction(heart);
        let damping = self.config.damping(heart);
        let direction = mode.direction();
        let noise = self.config.ambient_noise / 2.0;

        // steering targets first, so the particle loop can borrow the pool mutably
        let steering: Vec<Option<Vector2D>> = self
            .particles
            .iter()
            .enumerate()
            .map(|(i, particle)| {
                if i >= shape_count {
                    Some(self.orbit_point(i, particle.drift))
                } else {
                    self.shape_target(i, heart)
                }
            })
            .collect();

        for (i, (particle, target)) in self.particles.iter_mut().zip(steering).enumerate() {
            if i >= shape_count {
                if let Some(orbit) = target {
                    let pull = (orbit - particle.position) * self.config.ambient_attraction;
                    particle.apply_force(pull);
                }
                particle.apply_force(Vector2D::new(rng.centered(noise), rng.centered(noise)));
            } else if let Some(target) = target {
                particle.apply_force((target - particle.position) * attraction);
            }

            if pointer.active {
                particle.apply_force(pointer_force(
                    particle.position,
                    pointer.position,
                    self.config.pointer_radius,
                    self.config.pointer_strength,
                    direction,
                ));
            }

            particle.integrate(damping);
            particle.apply_boundary(self.config.boundary, self.width, self.height);
        }
    }

    /// Draw the current state. Heart frames may fade instead of clearing.
    pub fn render<S: Surface>(&self, surface: &mut S, heart: bool) {
        match (heart, self.config.heart_frame) {
            (true, FrameClear::Trail { alpha }) => surface.fade(alpha),
            _ => surface.clear(),
        }

        let shape_count = self.shape_count(heart);
        for (i, particle) in self.particles.iter().enumerate() {
            if i >= shape_count {
                surface.fill_circle(
                    particle.position,
                    particle.size * self.config.ambient_size_scale,
                    particle.color,
                    self.config.ambient_alpha,
                );
            } else {
                surface.fill_circle(
                    particle.position,
                    particle.size,
                    particle.color,
                    self.config.shape_alpha,
                );
            }
        }
    }

    /// One animation frame: step, then render
    pub fn tick<S: Surface, R: RandomSource>(
        &mut self,
        heart: bool,
        pointer: &PointerState,
        mode: SceneMode,
        surface: &mut S,
        rng: &mut R,
    ) {
        self.step(heart, pointer, mode, rng);
        self.render(surface, heart);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::WARM_PALETTE;
    use crate::config::BoundaryPolicy;
    use crate::rng::SimpleRng;
    use crate::sampler;
    use crate::surface::testing::{DrawCall, RecordingSurface};

    fn still_particle(x: f32, y: f32) -> Particle {
        Particle::new(Vector2D::new(x, y), Vector2D::zero(), 2.0, WARM_PALETTE[1])
    }

    fn single_particle_field(config: FieldConfig, particle: Particle) -> ParticleField {
        let mut rng = SimpleRng::new(1);
        let mut field = ParticleField::new(800.0, 600.0, config, &mut rng);
        field.particles = alloc::vec![particle.clone()];
        field.set_targets(alloc::vec![particle.position]);
        field
    }

    #[test]
    fn test_field_creation() {
        let mut rng = SimpleRng::new(1);
        let field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);

        assert_eq!(field.len(), 550);
        assert_eq!(field.width, 800.0);
        assert_eq!(field.height, 600.0);
        assert!(field.targets.is_empty());
    }

    #[test]
    fn test_rebuild_rederives_count() {
        let mut rng = SimpleRng::new(1);
        let mut field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);
        field.rebuild(2200.0, 1100.0, &mut rng);

        assert_eq!(field.len(), 1100);
        assert_eq!(field.width, 2200.0);
    }

    #[test]
    fn test_pointer_force_falloff() {
        let pointer = Vector2D::new(0.0, 0.0);

        let near = pointer_force(Vector2D::new(10.0, 0.0), pointer, 150.0, 0.8, 1.0);
        let far = pointer_force(Vector2D::new(100.0, 0.0), pointer, 150.0, 0.8, 1.0);
        let outside = pointer_force(Vector2D::new(150.0, 0.0), pointer, 150.0, 0.8, 1.0);

        assert!(near.x > far.x && far.x > 0.0);
        assert!((near.x - 0.8 * 140.0 / 150.0).abs() < 1e-6);
        assert_eq!(outside, Vector2D::zero());
    }

    #[test]
    fn test_pointer_force_zero_distance_is_finite() {
        let p = Vector2D::new(5.0, 5.0);
        let force = pointer_force(p, p, 150.0, 0.8, 1.0);

        assert!(force.x.is_finite() && force.y.is_finite());
        assert_eq!(force, Vector2D::zero());
    }

    #[test]
    fn test_repel_pushes_away() {
        let mut field = single_particle_field(FieldConfig::layered(), still_particle(100.0, 100.0));
        let mut rng = SimpleRng::new(1);

        let pointer = PointerState::at(150.0, 100.0);
        field.step(false, &pointer, SceneMode::Repel, &mut rng);
        assert!(field.particles[0].velocity.x < 0.0);
    }

    #[test]
    fn test_attract_pulls_toward() {
        let mut field = single_particle_field(FieldConfig::layered(), still_particle(100.0, 100.0));
        let mut rng = SimpleRng::new(1);

        let pointer = PointerState::at(150.0, 100.0);
        field.step(false, &pointer, SceneMode::Attract, &mut rng);
        assert!(field.particles[0].velocity.x > 0.0);
    }

    #[test]
    fn test_inactive_pointer_has_no_effect() {
        let mut field = single_particle_field(FieldConfig::layered(), still_particle(100.0, 100.0));
        let mut rng = SimpleRng::new(1);
        let pointer = PointerState {
            position: Vector2D::new(110.0, 100.0),
            active: false,
        };

        field.step(false, &pointer, SceneMode::Repel, &mut rng);
        assert_eq!(field.particles[0].velocity, Vector2D::zero());
    }

    #[test]
    fn test_text_state_converges_to_targets() {
        let config = FieldConfig::layered();
        let mut rng = SimpleRng::new(21);
        let mut field = ParticleField::new(800.0, 600.0, config.clone(), &mut rng);
        let targets = sampler::simple_heart_targets(800.0, 600.0, 97, &config);
        field.set_targets(targets.clone());

        for _ in 0..800 {
            field.step(false, &PointerState::inactive(), SceneMode::Repel, &mut rng);
        }

        for (i, particle) in field.particles.iter().enumerate() {
            assert!(particle.position.distance(&targets[i % targets.len()]) < 0.05);
        }
    }

    #[test]
    fn test_wrap_on_integration() {
        let mut particle = still_particle(815.0, 300.0);
        particle.velocity = Vector2D::new(10.0, 0.0);
        let mut field = single_particle_field(FieldConfig::layered(), particle);
        field.targets.clear();
        let mut rng = SimpleRng::new(1);

        field.step(false, &PointerState::inactive(), SceneMode::Repel, &mut rng);
        assert_eq!(field.particles[0].position.x, -20.0);
    }

    #[test]
    fn test_unbounded_variant_drifts_past_edge() {
        let mut particle = still_particle(815.0, 300.0);
        particle.velocity = Vector2D::new(10.0, 0.0);
        let mut field = single_particle_field(FieldConfig::simple(), particle);
        field.targets.clear();
        let mut rng = SimpleRng::new(1);

        assert_eq!(field.config.boundary, BoundaryPolicy::Unbounded);
        field.step(false, &PointerState::inactive(), SceneMode::Repel, &mut rng);
        assert!(field.particles[0].position.x > 820.0);
    }

    #[test]
    fn test_empty_targets_are_guarded() {
        let mut rng = SimpleRng::new(4);
        let mut field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);

        for heart in [false, true] {
            let pointer = PointerState::at(400.0, 300.0);
            field.step(heart, &pointer, SceneMode::Attract, &mut rng);
        }
        assert!(field
            .particles
            .iter()
            .all(|p| p.position.x.is_finite() && p.position.y.is_finite()));
    }

    #[test]
    fn test_heart_pulse_advances_only_in_heart_state() {
        let mut rng = SimpleRng::new(4);
        let mut field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);

        field.step(false, &PointerState::inactive(), SceneMode::Repel, &mut rng);
        assert_eq!(field.pulse_phase(), 0.0);
        assert_eq!(field.pulse_factor(false), 1.0);

        field.step(true, &PointerState::inactive(), SceneMode::Repel, &mut rng);
        assert_eq!(field.pulse_phase(), 0.04);
        assert_eq!(field.frame_tick(), 1);
        let expected = 1.0 + 0.04f32.sin() * 0.07;
        assert!((field.pulse_factor(true) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_pulse_scales_targets_from_center() {
        let mut rng = SimpleRng::new(4);
        let mut field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);
        field.set_targets(alloc::vec![Vector2D::new(500.0, 300.0)]);
        field.step(true, &PointerState::inactive(), SceneMode::Repel, &mut rng);

        let target = field.shape_target(0, true).unwrap();
        let expected_x = 400.0 + 100.0 * field.pulse_factor(true);
        assert!((target.x - expected_x).abs() < 1e-3);
        assert_eq!(field.shape_target(0, false).unwrap(), Vector2D::new(500.0, 300.0));
    }

    fn still_field(config: FieldConfig, count: usize) -> ParticleField {
        let mut rng = SimpleRng::new(5);
        let mut field = ParticleField::new(800.0, 600.0, config, &mut rng);
        field.particles = (0..count)
            .map(|i| still_particle(100.0 + 50.0 * i as f32, 80.0 + 30.0 * i as f32))
            .collect();
        field.set_targets(
            (0..count)
                .map(|i| Vector2D::new(600.0 - 20.0 * i as f32, 450.0 - 10.0 * i as f32))
                .collect(),
        );
        field
    }

    #[test]
    fn test_heart_step_springs_shape_and_ambient_particles() {
        let mut field = still_field(FieldConfig::layered(), 10);
        let start: Vec<Vector2D> = field.particles.iter().map(|p| p.position).collect();
        let mut rng = SimpleRng::new(12);

        field.step(true, &PointerState::inactive(), SceneMode::Repel, &mut rng);

        let shape_count = field.shape_count(true);
        assert_eq!(shape_count, 8);
        for (i, particle) in field.particles.iter().enumerate() {
            if i < shape_count {
                let target = field.shape_target(i, true).unwrap();
                let expected = (target - start[i]) * 0.01 * 0.9;
                assert!((particle.velocity.x - expected.x).abs() < 1e-4);
                assert!((particle.velocity.y - expected.y).abs() < 1e-4);
            } else {
                let orbit = field.orbit_point(i, particle.drift);
                let expected = (orbit - start[i]) * 0.002 * 0.9;
                let noise_bound = 0.025 * 0.9 + 1e-4;
                assert!((particle.velocity.x - expected.x).abs() <= noise_bound);
                assert!((particle.velocity.y - expected.y).abs() <= noise_bound);
            }
        }
    }

    #[test]
    fn test_text_step_uses_text_spring_and_damping() {
        let mut field = still_field(FieldConfig::layered(), 4);
        let start: Vec<Vector2D> = field.particles.iter().map(|p| p.position).collect();
        let mut rng = SimpleRng::new(12);

        field.step(false, &PointerState::inactive(), SceneMode::Repel, &mut rng);

        for (i, particle) in field.particles.iter().enumerate() {
            let expected = (field.targets[i] - start[i]) * 0.008 * 0.86;
            assert!((particle.velocity.x - expected.x).abs() < 1e-4);
            assert!((particle.velocity.y - expected.y).abs() < 1e-4);
            assert!((particle.position.x - (start[i].x + expected.x)).abs() < 1e-3);
        }
    }

    #[test]
    fn test_ambient_share_in_heart_state() {
        let mut rng = SimpleRng::new(4);
        let field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);

        let shape = field.shape_count(true);
        assert!(shape > 440 && shape < 460);
        assert_eq!(field.shape_count(false), field.len());

        let simple = ParticleField::new(800.0, 600.0, FieldConfig::simple(), &mut rng);
        assert_eq!(simple.shape_count(true), simple.len());
    }

    #[test]
    fn test_orbit_points_circle_center() {
        let mut rng = SimpleRng::new(4);
        let field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);

        let p = field.orbit_point(0, 0.0);
        assert!((p.x - (400.0 + 180.0)).abs() < 1e-3);
        assert!((p.y - 300.0).abs() < 1e-3);
    }

    #[test]
    fn test_heart_render_fades_and_dims_ambient() {
        let mut rng = SimpleRng::new(8);
        let field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);
        let mut surface = RecordingSurface::default();

        field.render(&mut surface, true);

        assert_eq!(surface.calls[0], DrawCall::Fade(0.22));
        let ambient = surface.circles().filter(|(_, _, alpha)| *alpha == 0.45).count();
        let shape = surface.circles().filter(|(_, _, alpha)| *alpha == 0.95).count();
        assert_eq!(shape, field.shape_count(true));
        assert_eq!(ambient, field.len() - field.shape_count(true));

        let (_, radius, _) = surface.circles().last().unwrap();
        let last = field.particles.last().unwrap();
        assert!((radius - last.size * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_text_render_clears() {
        let mut rng = SimpleRng::new(8);
        let mut field = ParticleField::new(800.0, 600.0, FieldConfig::layered(), &mut rng);
        let mut surface = RecordingSurface::default();

        let pointer = PointerState::inactive();
        field.tick(false, &pointer, SceneMode::Repel, &mut surface, &mut rng);

        assert_eq!(surface.calls[0], DrawCall::Clear);
        assert_eq!(surface.circles().count(), field.len());
        assert!(surface.circles().all(|(_, _, alpha)| alpha == 0.95));
    }

    #[test]
    fn test_simple_variant_clears_heart_frames() {
        let mut rng = SimpleRng::new(8);
        let field = ParticleField::new(800.0, 600.0, FieldConfig::simple(), &mut rng);
        let mut surface = RecordingSurface::default();

        field.render(&mut surface, true);
        assert_eq!(surface.calls[0], DrawCall::Clear);
    }
}
