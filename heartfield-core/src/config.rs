use heapless::Vec as BoundedVec;
use heartfield_shared::{BoundarySetting, FieldSettings, HeartShape};

pub const MAX_HEART_LAYERS: usize = 8;

/// Relative scales of the concentric hearts in the layered formation
pub const DEFAULT_HEART_LAYERS: [f32; 7] = [1.0, 0.78, 0.58, 0.4, 0.27, 0.17, 0.1];

const DEFAULT_WRAP_MARGIN: f32 = 20.0;
const DEFAULT_TRAIL_ALPHA: f32 = 0.22;
const DEFAULT_HEART_JITTER: f32 = 1.1;

/// What happens to particles that leave the viewport
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryPolicy {
    /// Past `margin` outside an edge, reappear just outside the opposite edge
    Wrap { margin: f32 },
    /// Leave them alone; the spring pulls them back
    Unbounded,
}

/// How a heart frame treats the previous frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameClear {
    Full,
    /// Paint translucent black over the previous frame, leaving motion trails
    Trail { alpha: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeartStyle {
    /// One outline, one turn of the curve
    Simple,
    /// Several concentric outlines with per-point jitter
    Layered {
        layers: BoundedVec<f32, MAX_HEART_LAYERS>,
        jitter: f32,
    },
}

impl HeartStyle {
    pub fn layered() -> Self {
        HeartStyle::Layered {
            layers: BoundedVec::from_slice(&DEFAULT_HEART_LAYERS).unwrap_or_default(),
            jitter: DEFAULT_HEART_JITTER,
        }
    }
}

/// Text rasterization and bitmap scan parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSampling {
    /// Font size as a fraction of viewport width, before clamping
    pub font_scale: f32,
    pub min_font_px: f32,
    pub max_font_px: f32,
    /// Scan stride is `width / stride_divisor`, never below `min_stride`
    pub stride_divisor: f32,
    pub min_stride: usize,
    /// Pixels with alpha strictly above this count as opaque
    pub alpha_threshold: u8,
}

impl Default for TextSampling {
    fn default() -> Self {
        Self {
            font_scale: 0.12,
            min_font_px: 38.0,
            max_font_px: 120.0,
            stride_divisor: 180.0,
            min_stride: 2,
            alpha_threshold: 50,
        }
    }
}

/// Configuration for the particle field.
///
/// Covers both flavors of the engine: [`FieldConfig::layered`] (the default)
/// fills the heart with concentric layers, orbits ambient particles, wraps
/// at the edges and leaves trails; [`FieldConfig::simple`] draws a single
/// outline with every particle on the shape and no wrapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    /// Viewport area per particle
    pub density_divisor: f32,
    pub min_particles: usize,
    pub text_damping: f32,
    pub heart_damping: f32,
    pub text_attraction: f32,
    pub heart_attraction: f32,
    /// Share of particles forming the heart; the rest orbit as ambient particles
    pub shape_fraction: f32,
    pub ambient_attraction: f32,
    /// Full width of the random velocity kick given to ambient particles each frame
    pub ambient_noise: f32,
    /// Orbit angle advance per frame
    pub orbit_speed: f32,
    pub pointer_radius: f32,
    pub pointer_strength: f32,
    pub pulse_amplitude: f32,
    pub pulse_speed: f32,
    pub boundary: BoundaryPolicy,
    pub heart_frame: FrameClear,
    pub heart_style: HeartStyle,
    /// Heart curve units to pixels, as a fraction of `min(width, height)`
    pub heart_scale: f32,
    /// Vertical shift of the heart center in pixels (positive moves it down)
    pub heart_offset_y: f32,
    pub shape_alpha: f32,
    pub ambient_alpha: f32,
    pub ambient_size_scale: f32,
    pub text: TextSampling,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self::layered()
    }
}

impl FieldConfig {
    pub fn layered() -> Self {
        Self {
            density_divisor: 2200.0,
            min_particles: 550,
            text_damping: 0.86,
            heart_damping: 0.9,
            text_attraction: 0.008,
            heart_attraction: 0.01,
            shape_fraction: 0.82,
            ambient_attraction: 0.002,
            ambient_noise: 0.05,
            orbit_speed: 0.01,
            pointer_radius: 150.0,
            pointer_strength: 0.8,
            pulse_amplitude: 0.07,
            pulse_speed: 0.04,
            boundary: BoundaryPolicy::Wrap {
                margin: DEFAULT_WRAP_MARGIN,
            },
            heart_frame: FrameClear::Trail {
                alpha: DEFAULT_TRAIL_ALPHA,
            },
            heart_style: HeartStyle::layered(),
            heart_scale: 0.013,
            heart_offset_y: 0.0,
            shape_alpha: 0.95,
            ambient_alpha: 0.45,
            ambient_size_scale: 0.8,
            text: TextSampling::default(),
        }
    }

    pub fn simple() -> Self {
        Self {
            density_divisor: 2600.0,
            min_particles: 450,
            text_damping: 0.88,
            heart_damping: 0.9,
            text_attraction: 0.01,
            heart_attraction: 0.012,
            shape_fraction: 1.0,
            pointer_radius: 140.0,
            pointer_strength: 0.6,
            pulse_amplitude: 0.06,
            pulse_speed: 0.05,
            boundary: BoundaryPolicy::Unbounded,
            heart_frame: FrameClear::Full,
            heart_style: HeartStyle::Simple,
            ..Self::layered()
        }
    }

    /// Pool size for a viewport, never below `min_particles`
    pub fn particle_count(&self, width: f32, height: f32) -> usize {
        let area = (width.max(0.0) * height.max(0.0)) as f64;
        let by_area = if self.density_divisor > 0.0 {
            (area / self.density_divisor as f64) as usize
        } else {
            0
        };
        by_area.max(self.min_particles)
    }

    pub fn damping(&self, heart: bool) -> f32 {
        if heart {
            self.heart_damping
        } else {
            self.text_damping
        }
    }

    pub fn attraction(&self, heart: bool) -> f32 {
        if heart {
            self.heart_attraction
        } else {
            self.text_attraction
        }
    }

    /// Overlay the fields present in `settings`
    pub fn apply(&mut self, settings: &FieldSettings) {
        if let Some(value) = settings.density_divisor {
            self.density_divisor = value;
        }
        if let Some(value) = settings.min_particles {
            self.min_particles = value;
        }
        if let Some(value) = settings.text_damping {
            self.text_damping = value;
        }
        if let Some(value) = settings.heart_damping {
            self.heart_damping = value;
        }
        if let Some(value) = settings.text_attraction {
            self.text_attraction = value;
        }
        if let Some(value) = settings.heart_attraction {
            self.heart_attraction = value;
        }
        if let Some(value) = settings.ambient_attraction {
            self.ambient_attraction = value;
        }
        if let Some(value) = settings.pointer_radius {
            self.pointer_radius = value;
        }
        if let Some(value) = settings.pointer_strength {
            self.pointer_strength = value;
        }
        if let Some(value) = settings.pulse_amplitude {
            self.pulse_amplitude = value;
        }
        if let Some(value) = settings.pulse_speed {
            self.pulse_speed = value;
        }

        if let Some(fraction) = settings.ambient_fraction {
            self.shape_fraction = (1.0 - fraction).clamp(0.0, 1.0);
        }

        let margin = settings.wrap_margin.unwrap_or(match self.boundary {
            BoundaryPolicy::Wrap { margin } => margin,
            BoundaryPolicy::Unbounded => DEFAULT_WRAP_MARGIN,
        });
        self.boundary = match settings.boundary {
            Some(BoundarySetting::Wrap) => BoundaryPolicy::Wrap { margin },
            Some(BoundarySetting::Unbounded) => BoundaryPolicy::Unbounded,
            None => match self.boundary {
                BoundaryPolicy::Wrap { .. } => BoundaryPolicy::Wrap { margin },
                BoundaryPolicy::Unbounded => BoundaryPolicy::Unbounded,
            },
        };

        if let Some(alpha) = settings.trail_alpha {
            self.heart_frame = if alpha > 0.0 && alpha < 1.0 {
                FrameClear::Trail { alpha }
            } else {
                FrameClear::Full
            };
        }

        match settings.heart_shape {
            Some(HeartShape::Simple) => self.heart_style = HeartStyle::Simple,
            Some(HeartShape::Layered) => {
                if self.heart_style == HeartStyle::Simple {
                    self.heart_style = HeartStyle::layered();
                }
            }
            None => {}
        }
    }

    pub fn with_settings(mut self, settings: &FieldSettings) -> Self {
        self.apply(settings);
        self
    }
}
