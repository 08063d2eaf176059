mod renderer;
mod transform;

pub(crate) use renderer::SceneLayout;
pub use renderer::{BackgroundMode, Renderer};
pub use transform::{fit_logical_screen, logical_to_viewport, Viewport, ViewportFit};
