use crate::character::{State, Symbol};

use super::rendering::BackgroundMode;
use super::LoopMetricsSnapshot;

const GLYPH_WIDTH: i32 = 3;
const GLYPH_HEIGHT: usize = 5;
const TEXT_SCALE: i32 = 2;
const GLYPH_ADVANCE: i32 = (GLYPH_WIDTH + 1) * TEXT_SCALE;
const LINE_ADVANCE: i32 = (GLYPH_HEIGHT as i32 + 2) * TEXT_SCALE;
const PADDING: i32 = 6 * TEXT_SCALE;
const PANEL_INSET: i32 = 3 * TEXT_SCALE;
const TEXT_COLOR: [u8; 4] = [236, 240, 246, 255];
const PANEL_BG_COLOR: [u8; 4] = [10, 12, 16, 255];
const PANEL_BORDER_COLOR: [u8; 4] = [92, 106, 126, 255];

/// Everything the F3 panel prints. Built fresh each rendered frame.
#[derive(Debug, Clone)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub state: State,
    pub symbol: Symbol,
    pub frame_index: usize,
    pub frame_count: usize,
    pub x: f32,
    pub y_offset: f32,
    pub background: BackgroundMode,
}

pub(crate) fn draw_overlay(frame: &mut [u8], width: u32, height: u32, data: &OverlayData) {
    if width == 0 || height == 0 {
        return;
    }

    let lines = overlay_lines(data);
    let longest = lines
        .iter()
        .map(|line| line.chars().count() as i32)
        .max()
        .unwrap_or(0);
    let panel = PanelRect {
        left: PADDING - PANEL_INSET,
        top: PADDING - PANEL_INSET,
        width: longest * GLYPH_ADVANCE + PANEL_INSET * 2,
        height: lines.len() as i32 * LINE_ADVANCE + PANEL_INSET * 2,
    };
    panel.fill(frame, width, height, PANEL_BG_COLOR);
    panel.outline(frame, width, height, PANEL_BORDER_COLOR);

    let mut y = PADDING;
    for line in &lines {
        draw_text_clipped(frame, width, height, PADDING, y, line, TEXT_COLOR);
        y += LINE_ADVANCE;
    }
}

fn overlay_lines(data: &OverlayData) -> Vec<String> {
    let cap = match data.render_fps_cap {
        Some(value) => value.to_string(),
        None => "inf".to_string(),
    };
    vec![
        format!("fps {:.0} / {}", data.metrics.fps, cap),
        format!("tps {:.1}", data.metrics.tps),
        format!("frame {:.2} ms", data.metrics.frame_time_ms),
        format!("state {}", data.state.as_token()),
        format!("input {}", data.symbol.as_token()),
        format!("anim {}/{}", data.frame_index + 1, data.frame_count),
        format!("pos {:.1},{:.1}", data.x, data.y_offset),
        format!("bg {}", data.background.as_token()),
    ]
}

#[derive(Debug, Clone, Copy)]
struct PanelRect {
    left: i32,
    top: i32,
    width: i32,
    height: i32,
}

impl PanelRect {
    fn fill(self, frame: &mut [u8], width: u32, height: u32, color: [u8; 4]) {
        let start_x = self.left.max(0);
        let start_y = self.top.max(0);
        let end_x = (self.left + self.width).min(width as i32);
        let end_y = (self.top + self.height).min(height as i32);
        for py in start_y..end_y {
            for px in start_x..end_x {
                write_pixel_rgba(frame, width as usize, px as usize, py as usize, color);
            }
        }
    }

    fn outline(self, frame: &mut [u8], width: u32, height: u32, color: [u8; 4]) {
        if self.width <= 1 || self.height <= 1 {
            return;
        }
        let edges = [
            (self.left, self.top, self.width, 1),
            (self.left, self.top + self.height - 1, self.width, 1),
            (self.left, self.top, 1, self.height),
            (self.left + self.width - 1, self.top, 1, self.height),
        ];
        for (left, top, edge_width, edge_height) in edges {
            PanelRect {
                left,
                top,
                width: edge_width,
                height: edge_height,
            }
            .fill(frame, width, height, color);
        }
    }
}

fn draw_text_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    mut x: i32,
    y: i32,
    text: &str,
    color: [u8; 4],
) {
    for ch in text.chars() {
        draw_glyph_clipped(frame, width, height, x, y, glyph_rows(ch), color);
        x += GLYPH_ADVANCE;
    }
}

fn draw_glyph_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rows: [u8; GLYPH_HEIGHT],
    color: [u8; 4],
) {
    for (row_index, bits) in rows.iter().enumerate() {
        for col in 0..GLYPH_WIDTH {
            if bits & (1 << (GLYPH_WIDTH - 1 - col)) == 0 {
                continue;
            }
            for sy in 0..TEXT_SCALE {
                let py = y + row_index as i32 * TEXT_SCALE + sy;
                if py < 0 || py >= height as i32 {
                    continue;
                }
                for sx in 0..TEXT_SCALE {
                    let px = x + col * TEXT_SCALE + sx;
                    if px < 0 || px >= width as i32 {
                        continue;
                    }
                    write_pixel_rgba(frame, width as usize, px as usize, py as usize, color);
                }
            }
        }
    }
}

fn write_pixel_rgba(frame: &mut [u8], width: usize, x: usize, y: usize, color: [u8; 4]) {
    let Some(offset) = y
        .checked_mul(width)
        .and_then(|row| row.checked_add(x))
        .and_then(|pixel| pixel.checked_mul(4))
    else {
        return;
    };
    if let Some(dst) = frame.get_mut(offset..offset + 4) {
        dst.copy_from_slice(&color);
    }
}

/// 3x5 glyphs, one row per digit, most significant bit on the left.
/// Letters are case-insensitive; anything missing renders as a blank cell.
const FONT: &[(char, [u8; GLYPH_HEIGHT])] = &[
    ('0', [7, 5, 5, 5, 7]),
    ('1', [2, 6, 2, 2, 7]),
    ('2', [7, 1, 7, 4, 7]),
    ('3', [7, 1, 7, 1, 7]),
    ('4', [5, 5, 7, 1, 1]),
    ('5', [7, 4, 7, 1, 7]),
    ('6', [7, 4, 7, 5, 7]),
    ('7', [7, 1, 2, 2, 2]),
    ('8', [7, 5, 7, 5, 7]),
    ('9', [7, 5, 7, 1, 7]),
    ('a', [2, 5, 7, 5, 5]),
    ('b', [6, 5, 6, 5, 6]),
    ('c', [3, 4, 4, 4, 3]),
    ('d', [6, 5, 5, 5, 6]),
    ('e', [7, 4, 6, 4, 7]),
    ('f', [7, 4, 6, 4, 4]),
    ('g', [3, 4, 5, 5, 3]),
    ('h', [5, 5, 7, 5, 5]),
    ('i', [7, 2, 2, 2, 7]),
    ('j', [1, 1, 1, 5, 2]),
    ('k', [5, 5, 6, 5, 5]),
    ('l', [4, 4, 4, 4, 7]),
    ('m', [5, 7, 7, 5, 5]),
    ('n', [6, 5, 5, 5, 5]),
    ('o', [2, 5, 5, 5, 2]),
    ('p', [6, 5, 6, 4, 4]),
    ('q', [2, 5, 5, 6, 3]),
    ('r', [6, 5, 6, 5, 5]),
    ('s', [3, 4, 2, 1, 6]),
    ('t', [7, 2, 2, 2, 2]),
    ('u', [5, 5, 5, 5, 7]),
    ('v', [5, 5, 5, 5, 2]),
    ('w', [5, 5, 7, 7, 5]),
    ('x', [5, 5, 2, 5, 5]),
    ('y', [5, 5, 2, 2, 2]),
    ('z', [7, 1, 2, 4, 7]),
    ('.', [0, 0, 0, 0, 2]),
    (',', [0, 0, 0, 2, 4]),
    (':', [0, 2, 0, 2, 0]),
    ('/', [1, 1, 2, 4, 4]),
    ('-', [0, 0, 7, 0, 0]),
    ('_', [0, 0, 0, 0, 7]),
];

fn glyph_rows(ch: char) -> [u8; GLYPH_HEIGHT] {
    let ch = ch.to_ascii_lowercase();
    FONT.iter()
        .find(|(glyph, _)| *glyph == ch)
        .map(|(_, rows)| *rows)
        .unwrap_or([0; GLYPH_HEIGHT])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OverlayData {
        OverlayData {
            metrics: LoopMetricsSnapshot {
                fps: 59.6,
                tps: 60.0,
                frame_time_ms: 16.7,
            },
            render_fps_cap: None,
            state: State::DashRight,
            symbol: Symbol::Dash,
            frame_index: 2,
            frame_count: 8,
            x: 120.0,
            y_offset: -4.5,
            background: BackgroundMode::Default,
        }
    }

    #[test]
    fn lines_report_controller_state() {
        let lines = overlay_lines(&sample());
        assert_eq!(lines[0], "fps 60 / inf");
        assert!(lines.iter().any(|line| line == "anim 3/8"));
        assert!(lines.iter().any(|line| line == "pos 120.0,-4.5"));
        assert!(lines.iter().any(|line| line == "bg default"));
    }

    #[test]
    fn every_overlay_character_has_a_glyph() {
        for line in overlay_lines(&sample()) {
            for ch in line.chars().filter(|ch| *ch != ' ') {
                assert_ne!(glyph_rows(ch), [0; GLYPH_HEIGHT], "missing glyph for {ch:?}");
            }
        }
    }

    #[test]
    fn unknown_character_draws_nothing() {
        let mut frame = vec![0u8; 16 * 16 * 4];
        draw_text_clipped(&mut frame, 16, 16, 0, 0, "~", TEXT_COLOR);
        assert!(frame.iter().all(|byte| *byte == 0));
    }

    #[test]
    fn draw_overlay_writes_panel_pixels() {
        let (width, height) = (320u32, 200u32);
        let mut frame = vec![0u8; (width * height * 4) as usize];
        draw_overlay(&mut frame, width, height, &sample());
        let offset = ((PADDING - PANEL_INSET) as usize * width as usize
            + (PADDING - PANEL_INSET) as usize)
            * 4;
        assert_eq!(&frame[offset..offset + 4], &PANEL_BORDER_COLOR);
        assert!(frame.chunks_exact(4).any(|px| px == TEXT_COLOR));
    }

    #[test]
    fn tiny_viewports_never_write_out_of_bounds() {
        for (width, height) in [(1u32, 1u32), (3, 2), (7, 40)] {
            let mut frame = vec![0u8; (width * height * 4) as usize];
            draw_overlay(&mut frame, width, height, &sample());
            assert_eq!(frame.len(), (width * height * 4) as usize);
        }
        draw_overlay(&mut [], 0, 0, &sample());
    }
}
