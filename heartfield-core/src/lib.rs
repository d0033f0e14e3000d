#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod color;
pub mod config;
pub mod field;
mod math;
pub mod particle;
pub mod rng;
pub mod sampler;
pub mod scene;
pub mod surface;

pub use color::{Color, WARM_PALETTE};
pub use config::{BoundaryPolicy, FieldConfig, FrameClear, HeartStyle, TextSampling};
pub use field::ParticleField;
pub use heartfield_shared::{SceneMode, TargetLabel, HEART_SENTINEL};
pub use particle::Particle;
pub use rng::{RandomSource, SimpleRng};
pub use sampler::{AlphaMask, GlyphRasterizer, NoRasterizer};
pub use scene::{Scene, SceneState};
pub use surface::Surface;

#[cfg(feature = "std")]
pub use rng::ThreadRandom;

/// A 2D vector used for positions, velocities and target points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

impl Vector2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f32 {
        math::sqrt(self.x * self.x + self.y * self.y)
    }

    pub fn distance(&self, other: &Vector2D) -> f32 {
        (*self - *other).magnitude()
    }

    /// Scale this point away from (or toward) `origin` by `factor`
    pub fn scale_about(&self, origin: Vector2D, factor: f32) -> Self {
        origin + (*self - origin) * factor
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f32> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl core::ops::Div<f32> for Vector2D {
    type Output = Self;

    fn div(self, scalar: f32) -> Self {
        Self {
            x: self.x / scalar,
            y: self.y / scalar,
        }
    }
}

impl core::ops::AddAssign for Vector2D {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl core::ops::MulAssign<f32> for Vector2D {
    fn mul_assign(&mut self, scalar: f32) {
        self.x *= scalar;
        self.y *= scalar;
    }
}

/// Pointer position as last reported by the host, plus whether it is over the scene
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointerState {
    pub position: Vector2D,
    pub active: bool,
}

impl PointerState {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Vector2D::new(x, y),
            active: true,
        }
    }

    pub fn inactive() -> Self {
        Self::default()
    }
}
