use super::State;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRef {
    pub state: State,
    pub index: usize,
}

/// What the renderer needs to draw the actor for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderDescriptor {
    pub frame: FrameRef,
    /// Bottom-center of the sprite in logical screen space.
    pub anchor: Vec2,
    pub fullscreen: bool,
    /// `None` draws fully opaque.
    pub alpha: Option<u8>,
}

/// Linear 0..=255 ramp over `fade_in_ms`.
pub fn fade_in_alpha(elapsed_ms: u64, fade_in_ms: u64) -> u8 {
    if fade_in_ms == 0 || elapsed_ms >= fade_in_ms {
        return u8::MAX;
    }
    (elapsed_ms * u64::from(u8::MAX) / fade_in_ms) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fade_ramps_from_transparent_to_opaque() {
        assert_eq!(fade_in_alpha(0, 600), 0);
        assert_eq!(fade_in_alpha(300, 600), 127);
        assert_eq!(fade_in_alpha(600, 600), 255);
        assert_eq!(fade_in_alpha(5_000, 600), 255);
        assert_eq!(fade_in_alpha(0, 0), 255);
    }
}
