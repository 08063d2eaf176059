use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::assets::{FrameLibrary, Sprite};
use crate::app::overlay::{draw_overlay, OverlayData};
use crate::character::{RenderDescriptor, Vec2};

use super::transform::{fit_logical_screen, logical_to_viewport};
use super::Viewport;

const LETTERBOX_COLOR: [u8; 4] = [8, 9, 12, 255];
const CLEAR_COLOR_DEFAULT: [u8; 4] = [20, 22, 28, 255];
const CLEAR_COLOR_ALTERNATE: [u8; 4] = [92, 20, 28, 255];
const GROUND_COLOR: [u8; 4] = [52, 58, 70, 255];
const MISSING_FRAME_COLOR: [u8; 4] = [255, 0, 255, 255];
const MISSING_FRAME_HALF_SIZE_PX: i32 = 6;

/// Which clear color the scene is drawn over. Switched by background effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackgroundMode {
    #[default]
    Default,
    Alternate,
}

impl BackgroundMode {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Alternate => "alternate",
        }
    }

    fn clear_color(self) -> [u8; 4] {
        match self {
            Self::Default => CLEAR_COLOR_DEFAULT,
            Self::Alternate => CLEAR_COLOR_ALTERNATE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct SceneLayout {
    pub logical: Viewport,
    pub ground_y: f32,
}

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_frame(
        &mut self,
        layout: SceneLayout,
        descriptor: &RenderDescriptor,
        frames: &FrameLibrary,
        background: BackgroundMode,
        overlay: Option<&OverlayData>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }

        let viewport = self.viewport;
        let frame = self.pixels.frame_mut();
        draw_scene(
            frame,
            viewport,
            layout,
            descriptor,
            frames.frame(descriptor.frame),
            background,
        );
        if let Some(data) = overlay {
            draw_overlay(frame, viewport.width, viewport.height, data);
        }

        self.pixels.render()
    }
}

pub(crate) fn draw_scene(
    frame: &mut [u8],
    viewport: Viewport,
    layout: SceneLayout,
    descriptor: &RenderDescriptor,
    sprite: Option<&Sprite>,
    background: BackgroundMode,
) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&LETTERBOX_COLOR);
    }

    let logical = layout.logical;
    let (left, top) = logical_to_viewport(Vec2::new(0.0, 0.0), logical, viewport);
    let (right, bottom) = logical_to_viewport(
        Vec2::new(logical.width as f32, logical.height as f32),
        logical,
        viewport,
    );
    fill_rect(frame, viewport, left, top, right, bottom, background.clear_color());

    let (_, ground_px) = logical_to_viewport(Vec2::new(0.0, layout.ground_y), logical, viewport);
    fill_rect(frame, viewport, left, ground_px, right, ground_px + 1, GROUND_COLOR);

    let alpha = descriptor.alpha.unwrap_or(u8::MAX);
    let Some(sprite) = sprite else {
        let (x, y) = logical_to_viewport(descriptor.anchor, logical, viewport);
        fill_rect(
            frame,
            viewport,
            x - MISSING_FRAME_HALF_SIZE_PX,
            y - MISSING_FRAME_HALF_SIZE_PX * 2,
            x + MISSING_FRAME_HALF_SIZE_PX,
            y,
            MISSING_FRAME_COLOR,
        );
        return;
    };

    if descriptor.fullscreen {
        let width = (right - left).max(1) as f32;
        let height = (bottom - top).max(1) as f32;
        let scale = (width / sprite.width.max(1) as f32).min(height / sprite.height.max(1) as f32);
        draw_sprite_bottom_center_scaled(
            frame,
            viewport,
            (left + right) / 2,
            bottom,
            sprite,
            scale,
            alpha,
        );
    } else {
        let (x, y) = logical_to_viewport(descriptor.anchor, logical, viewport);
        let scale = fit_logical_screen(logical, viewport).scale;
        draw_sprite_bottom_center_scaled(frame, viewport, x, y, sprite, scale, alpha);
    }
}

/// Fills `[left, right) x [top, bottom)`, clipped to the viewport.
fn fill_rect(
    frame: &mut [u8],
    viewport: Viewport,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    color: [u8; 4],
) {
    let left = left.max(0);
    let top = top.max(0);
    let right = right.min(viewport.width as i32);
    let bottom = bottom.min(viewport.height as i32);
    for y in top..bottom {
        for x in left..right {
            write_pixel_rgba_clipped(frame, viewport.width as usize, x, y, color);
        }
    }
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let Some(byte_offset) = (y as usize)
        .checked_mul(width)
        .and_then(|row| row.checked_add(x as usize))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    if let Some(dst) = frame.get_mut(byte_offset..byte_offset + 4) {
        dst.copy_from_slice(&color);
    }
}

fn blend_channel(src: u8, dst: u8, alpha: u32) -> u8 {
    ((u32::from(src) * alpha + u32::from(dst) * (255 - alpha)) / 255) as u8
}

fn scaled_sprite_dimensions(sprite: &Sprite, scale: f32) -> (u32, u32) {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };
    let width = (sprite.width as f32 * scale).round().max(1.0) as u32;
    let height = (sprite.height as f32 * scale).round().max(1.0) as u32;
    (width, height)
}

/// Draws `sprite` with its bottom edge centered on `(anchor_x, anchor_y)`,
/// blending by the product of per-pixel alpha and `opacity`.
fn draw_sprite_bottom_center_scaled(
    frame: &mut [u8],
    viewport: Viewport,
    anchor_x: i32,
    anchor_y: i32,
    sprite: &Sprite,
    scale: f32,
    opacity: u8,
) {
    if sprite.width == 0 || sprite.height == 0 || opacity == 0 {
        return;
    }
    if sprite.rgba.len() < sprite.width as usize * sprite.height as usize * 4 {
        return;
    }

    let (scaled_w, scaled_h) = scaled_sprite_dimensions(sprite, scale);
    let left = anchor_x - scaled_w as i32 / 2;
    let top = anchor_y - scaled_h as i32;
    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = (left + scaled_w as i32).min(viewport.width as i32);
    let draw_bottom = anchor_y.min(viewport.height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = viewport.width as usize;
    let x_ratio = sprite.width as f32 / scaled_w as f32;
    let y_ratio = sprite.height as f32 / scaled_h as f32;
    for out_y in draw_top..draw_bottom {
        let src_y = (((out_y - top) as f32 * y_ratio) as u32).min(sprite.height - 1);
        for out_x in draw_left..draw_right {
            let src_x = (((out_x - left) as f32 * x_ratio) as u32).min(sprite.width - 1);
            let src = sprite.pixel(src_x, src_y);
            let alpha = u32::from(src[3]) * u32::from(opacity) / 255;
            if alpha == 0 {
                continue;
            }
            let offset = (out_y as usize * frame_width + out_x as usize) * 4;
            let Some(dst) = frame.get_mut(offset..offset + 4) else {
                continue;
            };
            for channel in 0..3 {
                dst[channel] = blend_channel(src[channel], dst[channel], alpha);
            }
            dst[3] = 255;
        }
    }
}
