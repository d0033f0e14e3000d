//! Float helpers that go through `std` when it is available and `libm` otherwise.

pub(crate) fn sqrt(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrtf(v)
    }
}

pub(crate) fn sin(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.sin()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sinf(v)
    }
}

pub(crate) fn cos(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.cos()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::cosf(v)
    }
}

pub(crate) fn floor(v: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        v.floor()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::floorf(v)
    }
}
