use std::env;
use std::path::PathBuf;

use actor_engine::LoopConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const CHARACTER_CONFIG_ENV_VAR: &str = "ACTOR_CHARACTER_CONFIG";
const RENDER_FPS_ENV_VAR: &str = "ACTOR_MAX_RENDER_FPS";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Actor Demo Startup ===");

    let config = LoopConfig {
        character_config_path: character_config_path(env::var(CHARACTER_CONFIG_ENV_VAR).ok()),
        max_render_fps: render_fps_cap(env::var(RENDER_FPS_ENV_VAR).ok()),
        ..LoopConfig::default()
    };

    AppWiring { config }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn character_config_path(raw: Option<String>) -> Option<PathBuf> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn render_fps_cap(raw: Option<String>) -> Option<u32> {
    let raw = raw?;
    match raw.trim().parse::<u32>() {
        Ok(0) => None,
        Ok(fps) => Some(fps),
        Err(_) => {
            warn!(
                env_var = RENDER_FPS_ENV_VAR,
                value = raw.as_str(),
                "invalid render fps env var value; rendering uncapped"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_config_path_is_ignored() {
        assert_eq!(character_config_path(None), None);
        assert_eq!(character_config_path(Some("   ".to_string())), None);
        assert_eq!(
            character_config_path(Some(" configs/hero.json ".to_string())),
            Some(PathBuf::from("configs/hero.json"))
        );
    }

    #[test]
    fn render_fps_cap_parses_positive_values_only() {
        assert_eq!(render_fps_cap(Some("144".to_string())), Some(144));
        assert_eq!(render_fps_cap(Some("0".to_string())), None);
        assert_eq!(render_fps_cap(Some("fast".to_string())), None);
        assert_eq!(render_fps_cap(None), None);
    }
}
