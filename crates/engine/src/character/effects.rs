use std::fmt;

use tracing::debug;

use super::{ControllerConfig, State, TickTime};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CueId(String);

impl CueId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side-effect signals handed to the outer loop. The core never plays audio
/// or touches the display itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    AudioCue(CueId),
    BackgroundActivate { duration_ms: u64 },
    BackgroundRevert,
    Exit { grace_ms: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectTrigger {
    pub states: Vec<State>,
    pub frame: usize,
    pub cue: Option<CueId>,
    pub background_ms: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BackgroundWindow {
    started_ms: u64,
    duration_ms: u64,
}

#[derive(Debug, Clone)]
pub struct EffectScheduler {
    triggers: Vec<EffectTrigger>,
    armed: Vec<bool>,
    window: Option<BackgroundWindow>,
}

impl EffectScheduler {
    pub fn new(triggers: Vec<EffectTrigger>) -> Self {
        let armed = vec![true; triggers.len()];
        Self {
            triggers,
            armed,
            window: None,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(vec![
            EffectTrigger {
                states: vec![State::SpecialRight, State::SpecialLeft],
                frame: config.special.trigger_frame,
                cue: Some(CueId::new(config.special.cue.clone())),
                background_ms: Some(config.special.background_ms),
            },
            EffectTrigger {
                states: vec![State::Victory],
                frame: 0,
                cue: Some(CueId::new(config.victory.cue.clone())),
                background_ms: None,
            },
        ])
    }

    pub fn triggers(&self) -> &[EffectTrigger] {
        &self.triggers
    }

    pub fn background_active(&self) -> bool {
        self.window.is_some()
    }

    /// Re-arms every trigger bound to `state`.
    pub fn on_enter(&mut self, state: State) {
        for (trigger, armed) in self.triggers.iter().zip(self.armed.iter_mut()) {
            if trigger.states.contains(&state) {
                *armed = true;
            }
        }
    }

    pub fn evaluate(&mut self, state: State, frame_index: usize, time: TickTime) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(window) = self.window {
            if time.elapsed_since(window.started_ms) >= window.duration_ms {
                self.window = None;
                debug!(
                    elapsed_ms = time.elapsed_since(window.started_ms),
                    "background_window_closed"
                );
                effects.push(Effect::BackgroundRevert);
            }
        }

        for (trigger, armed) in self.triggers.iter().zip(self.armed.iter_mut()) {
            if !*armed || !trigger.states.contains(&state) || frame_index < trigger.frame {
                continue;
            }
            *armed = false;
            if let Some(cue) = &trigger.cue {
                effects.push(Effect::AudioCue(cue.clone()));
            }
            if let Some(duration_ms) = trigger.background_ms {
                let restarted = self.window.is_some();
                self.window = Some(BackgroundWindow {
                    started_ms: time.now_ms,
                    duration_ms,
                });
                debug!(duration_ms, restarted, "background_window_opened");
                effects.push(Effect::BackgroundActivate { duration_ms });
            }
        }

        effects
    }
}
