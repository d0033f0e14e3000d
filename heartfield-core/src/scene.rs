use crate::config::FieldConfig;
use crate::field::ParticleField;
use crate::rng::RandomSource;
use crate::sampler::{self, GlyphRasterizer};
use crate::surface::Surface;
use crate::{PointerState, Vector2D};
use heartfield_shared::{SceneMode, TargetLabel, DEFAULT_PHRASES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneState {
    Idle,
    Running,
}

/// Everything one animated scene needs, owned in one place.
///
/// Host callbacks (pointer, resize, label changes, animation frames) all go
/// through `&mut Scene`; nothing here is shared or duplicated.
pub struct Scene<G: GlyphRasterizer, R: RandomSource> {
    config: FieldConfig,
    field: Option<ParticleField>,
    label: TargetLabel,
    mode: SceneMode,
    pointer: PointerState,
    rasterizer: G,
    rng: R,
}

impl<G: GlyphRasterizer, R: RandomSource> Scene<G, R> {
    pub fn new(config: FieldConfig, rasterizer: G, rng: R) -> Self {
        Self {
            config,
            field: None,
            label: TargetLabel::parse(DEFAULT_PHRASES[0]),
            mode: SceneMode::default(),
            pointer: PointerState::inactive(),
            rasterizer,
            rng,
        }
    }

    pub fn state(&self) -> SceneState {
        if self.field.is_some() {
            SceneState::Running
        } else {
            SceneState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == SceneState::Running
    }

    /// Build the pool and sample targets. Restarts from scratch when already
    /// running. An empty viewport leaves the scene idle.
    pub fn start(&mut self, width: f32, height: f32) {
        if width <= 0.0 || height <= 0.0 {
            log::warn!("viewport {}x{} has no area, scene not started", width, height);
            self.field = None;
            return;
        }

        let field = ParticleField::new(width, height, self.config.clone(), &mut self.rng);
        log::info!("scene started at {}x{} with {} particles", width, height, field.len());
        self.field = Some(field);
        self.resample();
    }

    /// Drop the pool. Safe to call any number of times.
    pub fn stop(&mut self) {
        if self.field.take().is_some() {
            log::info!("scene stopped");
        }
        self.pointer = PointerState::inactive();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if !self.is_running() {
            return;
        }
        if width <= 0.0 || height <= 0.0 {
            log::warn!("ignoring resize to {}x{}", width, height);
            return;
        }
        if let Some(field) = self.field.as_mut() {
            field.config = self.config.clone();
            field.rebuild(width, height, &mut self.rng);
        }
        self.resample();
    }

    /// Switch what the particles form. Targets are only resampled on an actual change.
    pub fn set_label(&mut self, label: TargetLabel) {
        if label == self.label {
            return;
        }
        log::debug!("label changed to {:?}", label.as_str());
        self.label = label;
        self.resample();
    }

    pub fn label(&self) -> &TargetLabel {
        &self.label
    }

    pub fn set_mode(&mut self, mode: SceneMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> SceneMode {
        self.mode
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = PointerState {
            position: Vector2D::new(x, y),
            active: true,
        };
    }

    pub fn pointer_left(&mut self) {
        self.pointer.active = false;
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// New configuration takes effect on the next start or resize
    pub fn set_config(&mut self, config: FieldConfig) {
        self.config = config;
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn targets(&self) -> &[Vector2D] {
        self.field
            .as_ref()
            .map(|field| field.targets.as_slice())
            .unwrap_or(&[])
    }

    /// Advance and draw one frame; does nothing while idle
    pub fn frame<S: Surface>(&mut self, surface: &mut S) {
        let heart = self.label.is_heart();
        if let Some(field) = self.field.as_mut() {
            field.tick(heart, &self.pointer, self.mode, surface, &mut self.rng);
        }
    }

    fn resample(&mut self) {
        let Some(field) = self.field.as_mut() else {
            return;
        };
        let targets = sampler::sample_targets(
            &self.label,
            field.width,
            field.height,
            field.len(),
            &self.config,
            &mut self.rasterizer,
            &mut self.rng,
        );
        log::debug!("{} targets sampled for {:?}", targets.len(), self.label.as_str());
        field.set_targets(targets);
    }
}
