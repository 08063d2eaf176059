use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::{info, warn};

use crate::character::{Facing, FrameRef, FrameSource, State, STATE_COUNT};

const PLACEHOLDER_WIDTH: u32 = 48;
const PLACEHOLDER_HEIGHT: u32 = 96;
const PLACEHOLDER_FILL: [u8; 4] = [220, 220, 240, 255];
const PLACEHOLDER_EDGE: [u8; 4] = [90, 96, 120, 255];

/// Straight RGBA8 image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Sprite {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn placeholder() -> Self {
        let mut sprite = Self::new(PLACEHOLDER_WIDTH, PLACEHOLDER_HEIGHT);
        for y in 0..PLACEHOLDER_HEIGHT {
            for x in 0..PLACEHOLDER_WIDTH {
                let edge = x == 0
                    || y == 0
                    || x + 1 == PLACEHOLDER_WIDTH
                    || y + 1 == PLACEHOLDER_HEIGHT;
                sprite.put(x, y, if edge { PLACEHOLDER_EDGE } else { PLACEHOLDER_FILL });
            }
        }
        sprite
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = self.offset(x, y);
        [
            self.rgba[offset],
            self.rgba[offset + 1],
            self.rgba[offset + 2],
            self.rgba[offset + 3],
        ]
    }

    fn put(&mut self, x: u32, y: u32, color: [u8; 4]) {
        let offset = self.offset(x, y);
        self.rgba[offset..offset + 4].copy_from_slice(&color);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Smallest rectangle holding every non-transparent pixel, as
    /// `(left, top, width, height)`.
    pub fn alpha_bounds(&self) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.pixel(x, y)[3] == 0 {
                    continue;
                }
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((left, top, right, bottom)) => {
                        (left.min(x), top.min(y), right.max(x), bottom.max(y))
                    }
                });
            }
        }
        bounds.map(|(left, top, right, bottom)| (left, top, right - left + 1, bottom - top + 1))
    }

    pub fn cropped(&self, left: u32, top: u32, width: u32, height: u32) -> Self {
        let mut out = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                out.put(x, y, self.pixel(left + x, top + y));
            }
        }
        out
    }

    /// Cropped to the alpha bounding box. Fully transparent images collapse to
    /// a single transparent pixel.
    pub fn trimmed(&self) -> Self {
        match self.alpha_bounds() {
            Some((left, top, width, height)) => self.cropped(left, top, width, height),
            None => Self::new(1, 1),
        }
    }

    /// Placed on a larger transparent canvas, centered horizontally and
    /// resting on the bottom edge.
    pub fn padded_bottom_center(&self, width: u32, height: u32) -> Self {
        let width = width.max(self.width);
        let height = height.max(self.height);
        let left = (width - self.width) / 2;
        let top = height - self.height;
        let mut out = Self::new(width, height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.put(left + x, top + y, self.pixel(x, y));
            }
        }
        out
    }

    pub fn mirrored(&self) -> Self {
        let mut out = Self::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                out.put(self.width - 1 - x, y, self.pixel(x, y));
            }
        }
        out
    }

    /// Nearest-neighbour resample.
    pub fn scaled(&self, scale: f32) -> Self {
        if !scale.is_finite() || scale <= 0.0 || scale == 1.0 {
            return self.clone();
        }
        let width = (self.width as f32 * scale).round().max(1.0) as u32;
        let height = (self.height as f32 * scale).round().max(1.0) as u32;
        let mut out = Self::new(width, height);
        for y in 0..height {
            let src_y = ((y as f32 / scale) as u32).min(self.height - 1);
            for x in 0..width {
                let src_x = ((x as f32 / scale) as u32).min(self.width - 1);
                out.put(x, y, self.pixel(src_x, src_y));
            }
        }
        out
    }
}

/// Every state's frame sequence, decoded and normalized once at startup.
#[derive(Debug, Clone)]
pub struct FrameLibrary {
    sequences: Vec<Vec<Sprite>>,
}

impl FrameLibrary {
    pub fn placeholders() -> Self {
        Self {
            sequences: State::ALL
                .iter()
                .map(|_| vec![Sprite::placeholder()])
                .collect(),
        }
    }

    /// Reads `<dir>/<state>/*.png` in file-name order. A left-facing state
    /// without its own directory mirrors its right-facing counterpart. States
    /// with nothing readable get a single placeholder frame.
    pub fn load(dir: &Path, scale: f32) -> Self {
        let mut warned = HashSet::new();
        let mut sequences = Vec::with_capacity(STATE_COUNT);
        let mut loaded_states = 0usize;

        for state in State::ALL {
            let frames = load_state_frames(dir, state, &mut warned).map(|(frames, mirror)| {
                let frames = normalize_sequence(&frames, scale);
                if mirror {
                    frames.iter().map(Sprite::mirrored).collect()
                } else {
                    frames
                }
            });
            match frames {
                Some(frames) => {
                    loaded_states += 1;
                    sequences.push(frames);
                }
                None => {
                    warn_frames_once(
                        &mut warned,
                        state,
                        &dir.join(state.as_token()),
                        "no readable frames",
                    );
                    sequences.push(vec![Sprite::placeholder().scaled(scale)]);
                }
            }
        }

        info!(
            dir = %dir.display(),
            loaded_states,
            placeholder_states = STATE_COUNT - loaded_states,
            "frames_loaded"
        );
        Self { sequences }
    }

    pub fn sequence(&self, state: State) -> &[Sprite] {
        &self.sequences[state.index()]
    }

    pub fn frame(&self, frame: FrameRef) -> Option<&Sprite> {
        self.sequence(frame.state).get(frame.index)
    }
}

impl FrameSource for FrameLibrary {
    fn frame_count(&self, state: State) -> usize {
        self.sequence(state).len()
    }
}

/// Raw frames for `state`, plus whether they still need mirroring.
fn load_state_frames(
    dir: &Path,
    state: State,
    warned: &mut HashSet<State>,
) -> Option<(Vec<Sprite>, bool)> {
    let own_dir = dir.join(state.as_token());
    if own_dir.is_dir() {
        return read_sequence(&own_dir, state, warned).map(|frames| (frames, false));
    }
    if state.facing() != Some(Facing::Left) {
        return None;
    }
    read_sequence(&dir.join(state.mirrored().as_token()), state, warned)
        .map(|frames| (frames, true))
}

fn read_sequence(dir: &Path, state: State, warned: &mut HashSet<State>) -> Option<Vec<Sprite>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
        })
        .collect();
    paths.sort();

    if paths.is_empty() {
        return None;
    }

    let frames = paths
        .iter()
        .map(|path| {
            decode_rgba(path).unwrap_or_else(|reason| {
                warn_frames_once(warned, state, path, &reason);
                Sprite::placeholder()
            })
        })
        .collect();
    Some(frames)
}

fn decode_rgba(path: &Path) -> Result<Sprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(Sprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

/// Trims every frame, pads them to the sequence's largest trimmed size and
/// applies the display scale.
fn normalize_sequence(frames: &[Sprite], scale: f32) -> Vec<Sprite> {
    let trimmed: Vec<Sprite> = frames.iter().map(Sprite::trimmed).collect();
    let width = trimmed.iter().map(|sprite| sprite.width).max().unwrap_or(1);
    let height = trimmed.iter().map(|sprite| sprite.height).max().unwrap_or(1);
    trimmed
        .iter()
        .map(|sprite| sprite.padded_bottom_center(width, height).scaled(scale))
        .collect()
}

fn warn_frames_once(warned: &mut HashSet<State>, state: State, path: &Path, reason: &str) {
    if !warned.insert(state) {
        return;
    }
    warn!(
        state = state.as_token(),
        path = %path.display(),
        reason,
        "frames_load_failed_using_placeholder"
    );
}
