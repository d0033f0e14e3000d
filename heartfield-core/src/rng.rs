/// Source of uniform floats in `[0, 1)`.
///
/// The field draws colors, sizes, jitter and ambient noise through this so
/// tests can pin the sequence with [`SimpleRng`].
pub trait RandomSource {
    fn next_f32(&mut self) -> f32;

    fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Uniform value in `[-half_span, half_span)`
    fn centered(&mut self, half_span: f32) -> f32 {
        (self.next_f32() - 0.5) * 2.0 * half_span
    }

    /// Uniform index in `0..len`; `len` must be non-zero
    fn index(&mut self, len: usize) -> usize {
        ((self.next_f32() * len as f32) as usize).min(len - 1)
    }
}

/// Simple pseudo-random number generator using LCG (Linear Congruential Generator).
/// Seedable and allocation free, good enough for visual noise.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        // Numerical Recipes parameters
        const A: u32 = 1664525;
        const C: u32 = 1013904223;

        self.state = self.state.wrapping_mul(A).wrapping_add(C);
        self.state
    }
}

impl RandomSource for SimpleRng {
    fn next_f32(&mut self) -> f32 {
        // top 24 bits fit the f32 mantissa exactly, so the result never rounds up to 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }
}

/// Non-deterministic source backed by the thread-local `rand` generator
#[cfg(feature = "std")]
pub struct ThreadRandom(rand::rngs::ThreadRng);

#[cfg(feature = "std")]
impl ThreadRandom {
    pub fn new() -> Self {
        Self(rand::thread_rng())
    }
}

#[cfg(feature = "std")]
impl Default for ThreadRandom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl RandomSource for ThreadRandom {
    fn next_f32(&mut self) -> f32 {
        use rand::Rng;
        self.0.gen::<f32>()
    }
}
