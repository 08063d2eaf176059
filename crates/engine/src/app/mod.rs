mod assets;
mod audio;
mod input;
mod loop_runner;
mod metrics;
mod overlay;
mod rendering;

pub use assets::{FrameLibrary, Sprite};
pub use audio::{AudioSink, LoggingAudio};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    fit_logical_screen, logical_to_viewport, BackgroundMode, Renderer, Viewport, ViewportFit,
};
