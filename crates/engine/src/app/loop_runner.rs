use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::character::{
    ConfigError, Controller, ControllerConfig, ControllerError, Effect, FrameCountError,
    FrameCounts, KeySet, SystemClock, TickOutput,
};
use crate::{resolve_app_paths, StartupError};

use super::assets::FrameLibrary;
use super::audio::{AudioSink, LoggingAudio};
use super::input::HeldKeys;
use super::metrics::MetricsAccumulator;
use super::overlay::OverlayData;
use super::rendering::{BackgroundMode, Renderer, SceneLayout, Viewport};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    pub max_render_fps: Option<u32>,
    pub sprite_scale: f32,
    /// Overrides the project's `assets/character.json`.
    pub character_config_path: Option<PathBuf>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Actor Demo".to_string(),
            window_width: 800,
            window_height: 600,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_render_fps: None,
            sprite_scale: 1.0,
            character_config_path: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("character frames are unusable: {0}")]
    Frames(#[from] FrameCountError),
    #[error("failed to build character controller: {0}")]
    Controller(#[from] ControllerError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig) -> Result<(), AppError> {
    let app_paths = resolve_app_paths()?;
    let config_path = config
        .character_config_path
        .clone()
        .unwrap_or_else(|| app_paths.default_character_config.clone());
    info!(
        root = %app_paths.root.display(),
        frames_dir = %app_paths.frames_dir.display(),
        character_config = %config_path.display(),
        "startup"
    );

    let controller_config = load_controller_config(&config_path)?;
    let frames = FrameLibrary::load(&app_paths.frames_dir, config.sprite_scale);
    let frame_counts = FrameCounts::from_source(&frames)?;
    let mut controller = Controller::new(controller_config, frame_counts)?;
    let layout = SceneLayout {
        logical: Viewport {
            width: controller.config().screen_width.round().max(1.0) as u32,
            height: config.window_height.max(1),
        },
        ground_y: controller.config().ground_y,
    };

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window)).map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let effective_render_cap = normalize_render_fps_cap(config.max_render_fps);
    let render_frame_target = target_frame_duration(effective_render_cap);

    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        render_fps_cap = %format_render_cap(effective_render_cap),
        "loop_config"
    );

    let clock = SystemClock::new();
    let mut audio = LoggingAudio::default();
    let mut background = BackgroundMode::Default;
    let mut input_collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut metrics_accumulator = MetricsAccumulator::new(metrics_log_interval);
    let mut overlay_visible = false;
    let mut last_output: Option<TickOutput> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::Focused(false) => input_collector.release_all(),
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    if input_collector.take_overlay_toggle_pressed() {
                        overlay_visible = !overlay_visible;
                        info!(overlay_visible, "overlay_toggled");
                    }

                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    let clamped_frame_dt = clamp_frame_delta(raw_frame_dt, max_frame_delta);
                    accumulator = accumulator.saturating_add(clamped_frame_dt);

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    let mut exit_grace = None;
                    for _ in 0..step_plan.ticks_to_run {
                        if input_collector.quit_requested {
                            break;
                        }
                        let output = controller.tick(&input_collector.key_set(), &clock);
                        exit_grace = apply_effects(&output.effects, &mut audio, &mut background)
                            .or(exit_grace);
                        last_output = Some(output);
                        metrics_accumulator.record_tick();
                        if exit_grace.is_some() {
                            break;
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                        return;
                    }

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep =
                        compute_cap_sleep(elapsed_since_last_present, render_frame_target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    if let Some(output) = last_output.as_ref() {
                        let overlay = overlay_visible.then(|| OverlayData {
                            metrics: metrics_accumulator.latest(),
                            render_fps_cap: effective_render_cap,
                            state: controller.state(),
                            symbol: output.symbol,
                            frame_index: controller.animation().frame_index,
                            frame_count: controller.frame_counts().get(controller.state()),
                            x: controller.motion().x,
                            y_offset: controller.motion().y_offset,
                            background,
                        });
                        if let Err(error) = renderer.render_frame(
                            layout,
                            &output.render,
                            &frames,
                            background,
                            overlay.as_ref(),
                        ) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                    }
                    last_present_instant = Instant::now();
                    metrics_accumulator.record_frame(raw_frame_dt);

                    if let Some(snapshot) = metrics_accumulator.maybe_snapshot(now) {
                        info!(
                            fps = snapshot.fps,
                            tps = snapshot.tps,
                            frame_time_ms = snapshot.frame_time_ms,
                            state = controller.state().as_token(),
                            "loop_metrics"
                        );
                    }

                    if let Some(grace_ms) = exit_grace {
                        thread::sleep(Duration::from_millis(grace_ms));
                        info!(reason = "finished", "shutdown_requested");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!(
                    ticks = controller.ticks(),
                    cues_played = audio.played(),
                    "shutdown"
                );
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn load_controller_config(path: &Path) -> Result<ControllerConfig, ConfigError> {
    if !path.exists() {
        info!(path = %path.display(), "character_config_missing_using_defaults");
        return Ok(ControllerConfig::default());
    }
    let config = ControllerConfig::load(path)?;
    info!(path = %path.display(), "character_config_loaded");
    Ok(config)
}

/// Routes one tick's effects to their collaborators. Returns the exit grace
/// delay when the controller asked the process to terminate.
fn apply_effects(
    effects: &[Effect],
    audio: &mut dyn AudioSink,
    background: &mut BackgroundMode,
) -> Option<u64> {
    let mut exit_grace = None;
    for effect in effects {
        match effect {
            Effect::AudioCue(cue) => audio.play(cue),
            Effect::BackgroundActivate { duration_ms } => {
                *background = BackgroundMode::Alternate;
                info!(mode = background.as_token(), duration_ms, "background_swap");
            }
            Effect::BackgroundRevert => {
                *background = BackgroundMode::Default;
                info!(mode = background.as_token(), "background_swap");
            }
            Effect::Exit { grace_ms } => exit_grace = Some(*grace_ms),
        }
    }
    exit_grace
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    held: HeldKeys,
    overlay_toggle_is_down: bool,
    overlay_toggle_pressed_edge: bool,
}

impl InputCollector {
    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        self.handle_key(key_event.physical_key, key_event.state);
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        match key {
            PhysicalKey::Code(KeyCode::Escape) if is_pressed => self.quit_requested = true,
            PhysicalKey::Code(KeyCode::F3) => {
                if is_pressed && !self.overlay_toggle_is_down {
                    self.overlay_toggle_pressed_edge = true;
                }
                self.overlay_toggle_is_down = is_pressed;
            }
            _ => {
                self.held.set(key, is_pressed);
            }
        }
    }

    fn release_all(&mut self) {
        self.held.release_all();
        self.overlay_toggle_is_down = false;
    }

    fn key_set(&self) -> KeySet {
        self.held.key_set()
    }

    fn take_overlay_toggle_pressed(&mut self) -> bool {
        let was_pressed = self.overlay_toggle_pressed_edge;
        self.overlay_toggle_pressed_edge = false;
        was_pressed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_render_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(max_render_fps: Option<u32>) -> Option<Duration> {
    max_render_fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_render_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CueId, Key};

    #[derive(Default)]
    struct RecordingAudio {
        cues: Vec<String>,
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, cue: &CueId) {
            self.cues.push(cue.as_str().to_string());
        }
    }

    #[test]
    fn clamp_frame_delta_caps_large_frame() {
        let max_frame_delta = Duration::from_millis(250);
        assert_eq!(
            clamp_frame_delta(Duration::from_secs(2), max_frame_delta),
            max_frame_delta
        );
        assert_eq!(
            clamp_frame_delta(Duration::from_millis(16), max_frame_delta),
            Duration::from_millis(16)
        );
    }

    #[test]
    fn plan_sim_steps_runs_expected_ticks_without_drop() {
        let plan = plan_sim_steps(Duration::from_millis(35), Duration::from_millis(10), 5);
        assert_eq!(plan.ticks_to_run, 3);
        assert_eq!(plan.remaining_accumulator, Duration::from_millis(5));
        assert_eq!(plan.dropped_backlog, Duration::ZERO);
    }

    #[test]
    fn plan_sim_steps_drops_backlog_when_tick_cap_hit() {
        let plan = plan_sim_steps(Duration::from_millis(95), Duration::from_millis(10), 5);
        assert_eq!(plan.ticks_to_run, 5);
        assert_eq!(plan.remaining_accumulator, Duration::ZERO);
        assert_eq!(plan.dropped_backlog, Duration::from_millis(45));
    }

    #[test]
    fn apply_effects_routes_cues_and_background() {
        let mut audio = RecordingAudio::default();
        let mut background = BackgroundMode::Default;
        let exit = apply_effects(
            &[
                Effect::AudioCue(CueId::new("special_impact")),
                Effect::BackgroundActivate { duration_ms: 500 },
            ],
            &mut audio,
            &mut background,
        );
        assert_eq!(exit, None);
        assert_eq!(audio.cues, vec!["special_impact".to_string()]);
        assert_eq!(background, BackgroundMode::Alternate);

        apply_effects(&[Effect::BackgroundRevert], &mut audio, &mut background);
        assert_eq!(background, BackgroundMode::Default);
    }

    #[test]
    fn apply_effects_reports_exit_grace() {
        let mut audio = RecordingAudio::default();
        let mut background = BackgroundMode::Default;
        let exit = apply_effects(
            &[
                Effect::AudioCue(CueId::new("victory_fanfare")),
                Effect::Exit { grace_ms: 1500 },
            ],
            &mut audio,
            &mut background,
        );
        assert_eq!(exit, Some(1500));
        assert_eq!(audio.cues.len(), 1);
    }

    #[test]
    fn f3_toggle_is_edge_triggered() {
        let mut input = InputCollector::default();
        let f3 = PhysicalKey::Code(KeyCode::F3);
        input.handle_key(f3, ElementState::Pressed);
        input.handle_key(f3, ElementState::Pressed);
        assert!(input.take_overlay_toggle_pressed());
        assert!(!input.take_overlay_toggle_pressed());
        input.handle_key(f3, ElementState::Released);
        input.handle_key(f3, ElementState::Pressed);
        assert!(input.take_overlay_toggle_pressed());
    }

    #[test]
    fn escape_requests_quit_and_bound_keys_are_held() {
        let mut input = InputCollector::default();
        input.handle_key(PhysicalKey::Code(KeyCode::KeyD), ElementState::Pressed);
        input.handle_key(PhysicalKey::Code(KeyCode::ShiftLeft), ElementState::Pressed);
        assert!(input
            .key_set()
            .contains_all(&KeySet::of(&[Key::Right, Key::Modifier])));
        assert!(!input.quit_requested);

        input.handle_key(PhysicalKey::Code(KeyCode::Escape), ElementState::Pressed);
        assert!(input.quit_requested);
    }

    #[test]
    fn focus_loss_releases_held_keys() {
        let mut input = InputCollector::default();
        input.handle_key(PhysicalKey::Code(KeyCode::KeyA), ElementState::Pressed);
        input.release_all();
        assert!(input.key_set().is_empty());
    }

    #[test]
    fn target_frame_duration_none_when_cap_off() {
        assert_eq!(target_frame_duration(None), None);
    }

    #[test]
    fn compute_cap_sleep_only_when_under_budget() {
        let target = target_frame_duration(Some(60));
        assert_eq!(compute_cap_sleep(Duration::from_millis(20), target), Duration::ZERO);
        assert!(compute_cap_sleep(Duration::from_millis(5), target) > Duration::ZERO);
    }

    #[test]
    fn normalize_render_fps_cap_disables_zero() {
        assert_eq!(normalize_render_fps_cap(Some(0)), None);
        assert_eq!(normalize_render_fps_cap(Some(60)), Some(60));
        assert_eq!(format_render_cap(None), "off");
    }
}
