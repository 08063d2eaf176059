use crate::character::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Uniform scale plus letterbox offset mapping the logical screen into the
/// window's pixel viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportFit {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

pub fn fit_logical_screen(logical: Viewport, viewport: Viewport) -> ViewportFit {
    if logical.width == 0 || logical.height == 0 {
        return ViewportFit {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
    }
    let scale_x = viewport.width as f32 / logical.width as f32;
    let scale_y = viewport.height as f32 / logical.height as f32;
    let scale = scale_x.min(scale_y);
    ViewportFit {
        scale,
        offset_x: (viewport.width as f32 - logical.width as f32 * scale) * 0.5,
        offset_y: (viewport.height as f32 - logical.height as f32 * scale) * 0.5,
    }
}

pub fn logical_to_viewport(point: Vec2, logical: Viewport, viewport: Viewport) -> (i32, i32) {
    let fit = fit_logical_screen(logical, viewport);
    (
        (fit.offset_x + point.x * fit.scale).round() as i32,
        (fit.offset_y + point.y * fit.scale).round() as i32,
    )
}
