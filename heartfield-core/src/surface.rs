use crate::color::Color;
use crate::Vector2D;

/// Drawing target the field renders into, one frame at a time
pub trait Surface {
    /// Erase the previous frame entirely
    fn clear(&mut self);

    /// Paint black at `alpha` over the previous frame
    fn fade(&mut self, alpha: f32);

    fn fill_circle(&mut self, center: Vector2D, radius: f32, color: Color, alpha: f32);
}
