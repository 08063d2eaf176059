use thiserror::Error;
use tracing::{debug, info, warn};

use super::animation::{AnimationClock, AnimationState, FrameCounts, FramePolicy, FrameStep};
use super::completion::{resolve_successor, CompletionTrigger, ResumeFrame};
use super::effects::{CueId, Effect, EffectScheduler};
use super::motion::{MotionModel, MotionState};
use super::render::{fade_in_alpha, FrameRef, RenderDescriptor, Vec2};
use super::{
    Clock, CompletionPolicy, ConfigError, ControllerConfig, InputClassifier, KeySet, State,
    Symbol, TableError, TickTime, TransitionTable,
};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid transition table: {0}")]
    Table(#[from] TableError),
}

/// A configured frame index that the loaded sequence never reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMismatch {
    pub field: &'static str,
    pub state: State,
    pub frame: usize,
    pub frame_count: usize,
}

/// Lists every configured frame index that lies outside the frame count of
/// the state it applies to.
pub fn frame_index_mismatches(
    config: &ControllerConfig,
    frames: &FrameCounts,
) -> Vec<FrameMismatch> {
    let special = &config.special;
    let mut checks: Vec<(&'static str, usize)> =
        vec![("special.trigger_frame", special.trigger_frame)];
    checks.extend(
        special
            .slow_frames
            .iter()
            .map(|frame| ("special.slow_frames", *frame)),
    );
    checks.extend(
        special
            .fullscreen_frames
            .iter()
            .map(|frame| ("special.fullscreen_frames", *frame)),
    );

    let mut mismatches = Vec::new();
    for state in [State::SpecialRight, State::SpecialLeft] {
        push_out_of_range(&mut mismatches, frames, state, &checks);
    }
    for state in [State::DashRight, State::DashLeft] {
        push_out_of_range(
            &mut mismatches,
            frames,
            state,
            &[("dash.windup_frames", config.dash.windup_frames)],
        );
    }
    mismatches
}

fn push_out_of_range(
    mismatches: &mut Vec<FrameMismatch>,
    frames: &FrameCounts,
    state: State,
    checks: &[(&'static str, usize)],
) {
    let frame_count = frames.get(state);
    for &(field, frame) in checks {
        if frame >= frame_count {
            mismatches.push(FrameMismatch {
                field,
                state,
                frame,
                frame_count,
            });
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionCause {
    Input,
    Completion,
    /// Mid-air direction flip; frame progress is kept.
    Steer,
}

impl TransitionCause {
    fn as_token(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Completion => "completion",
            Self::Steer => "steer",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: State,
    pub to: State,
    pub cause: TransitionCause,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickOutput {
    pub render: RenderDescriptor,
    pub symbol: Symbol,
    pub transitions: Vec<Transition>,
    pub effects: Vec<Effect>,
}

/// Owns the actor's state and runs one deterministic step per tick.
pub struct Controller {
    config: ControllerConfig,
    classifier: InputClassifier,
    table: TransitionTable,
    completions: CompletionPolicy,
    frames: FrameCounts,
    policy: FramePolicy,
    animation: AnimationState,
    motion: MotionState,
    effects: EffectScheduler,
    dash_cue: CueId,
    frame_mismatches: Vec<FrameMismatch>,
    /// Last uncommitted state, recorded when a commitment begins.
    previous: Option<State>,
    tick: u64,
    finished: bool,
}

impl Controller {
    pub fn new(config: ControllerConfig, frames: FrameCounts) -> Result<Self, ControllerError> {
        Self::with_parts(
            config,
            frames,
            InputClassifier::default(),
            TransitionTable::default(),
            CompletionPolicy::default(),
        )
    }

    pub fn with_parts(
        config: ControllerConfig,
        frames: FrameCounts,
        classifier: InputClassifier,
        table: TransitionTable,
        completions: CompletionPolicy,
    ) -> Result<Self, ControllerError> {
        config.validate()?;
        table.validate(&completions)?;

        let frame_mismatches = frame_index_mismatches(&config, &frames);
        for mismatch in &frame_mismatches {
            warn!(
                field = mismatch.field,
                state = mismatch.state.as_token(),
                frame = mismatch.frame,
                frame_count = mismatch.frame_count,
                "configured_frame_out_of_range"
            );
        }

        let initial = State::Idle;
        Ok(Self {
            policy: FramePolicy::for_state(initial, &config),
            animation: AnimationState::new(initial, 0),
            motion: MotionState::new(config.start_x.clamp(0.0, config.screen_width)),
            effects: EffectScheduler::from_config(&config),
            dash_cue: CueId::new(config.dash.cue.clone()),
            frame_mismatches,
            config,
            classifier,
            table,
            completions,
            frames,
            previous: None,
            tick: 0,
            finished: false,
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.animation.state
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn frame_counts(&self) -> &FrameCounts {
        &self.frames
    }

    /// Configured frame indices the loaded sequences never reach. The
    /// controller still runs, but the affected effects and motion phases
    /// cannot trigger.
    pub fn frame_mismatches(&self) -> &[FrameMismatch] {
        &self.frame_mismatches
    }

    pub fn background_active(&self) -> bool {
        self.effects.background_active()
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    /// True once the terminal state has completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn tick(&mut self, pressed: &KeySet, clock: &dyn Clock) -> TickOutput {
        let time = TickTime::capture(self.tick, clock);
        self.tick = self.tick.saturating_add(1);

        if self.finished {
            return TickOutput {
                render: self.render_descriptor(time),
                symbol: Symbol::None,
                transitions: Vec::new(),
                effects: Vec::new(),
            };
        }

        let mut transitions = Vec::new();
        let mut effects = Vec::new();

        let current = self.animation.state;
        let symbol = self.classifier.classify(pressed, current);

        let mut entered = false;
        if !current.is_committed() {
            let next = self.table.resolve(current, symbol);
            if next != current {
                self.enter(next, 0, time);
                transitions.push(Transition {
                    from: current,
                    to: next,
                    cause: TransitionCause::Input,
                });
                entered = true;
            }
        }

        if !entered {
            let frame_count = self.frames.get(self.animation.state);
            let step =
                AnimationClock::advance(&mut self.animation, &self.policy, frame_count, time);
            if step == FrameStep::Completed
                && self.completions.trigger(self.animation.state)
                    == Some(CompletionTrigger::AnimationEnd)
            {
                entered = self.complete(time, &mut transitions, &mut effects);
            }
        }

        let outcome = MotionModel::step(
            &mut self.motion,
            self.animation.state,
            self.animation.frame_index,
            pressed,
            entered,
            time,
            &self.config,
        );
        if outcome.dash_started {
            effects.push(Effect::AudioCue(self.dash_cue.clone()));
        }
        if let Some(steered) = outcome.steer {
            let from = self.animation.state;
            self.animation.retarget(steered);
            debug!(
                from = from.as_token(),
                to = steered.as_token(),
                cause = TransitionCause::Steer.as_token(),
                "state_changed"
            );
            transitions.push(Transition {
                from,
                to: steered,
                cause: TransitionCause::Steer,
            });
        }
        if outcome.landed
            && self.completions.trigger(self.animation.state) == Some(CompletionTrigger::Landing)
        {
            self.complete(time, &mut transitions, &mut effects);
        }

        effects.extend(self.effects.evaluate(
            self.animation.state,
            self.animation.frame_index,
            time,
        ));

        let frame_count = self.frames.get(self.animation.state);
        if let Some(original) = self.animation.clamp_frame(frame_count) {
            warn!(
                state = self.animation.state.as_token(),
                frame_index = original,
                frame_count,
                "frame_index_clamped"
            );
        }

        TickOutput {
            render: self.render_descriptor(time),
            symbol,
            transitions,
            effects,
        }
    }

    fn enter(&mut self, next: State, frame_index: usize, time: TickTime) {
        let current = self.animation.state;
        if !current.is_committed() && next.is_committed() {
            self.previous = Some(current);
        }
        self.animation.enter(next, frame_index, time.now_ms);
        self.policy = FramePolicy::for_state(next, &self.config);
        MotionModel::on_enter(&mut self.motion, next, &self.config);
        self.effects.on_enter(next);
        debug!(
            from = current.as_token(),
            to = next.as_token(),
            frame_index,
            tick = time.tick,
            "state_changed"
        );
    }

    /// Applies the current state's completion rule. Returns whether a new
    /// state was entered.
    fn complete(
        &mut self,
        time: TickTime,
        transitions: &mut Vec<Transition>,
        effects: &mut Vec<Effect>,
    ) -> bool {
        let current = self.animation.state;
        let Some(rule) = self.completions.rule(current).copied() else {
            return false;
        };

        match resolve_successor(rule.successor, self.previous) {
            Some(next) => {
                let frame_index = match rule.resume {
                    ResumeFrame::First => 0,
                    ResumeFrame::Last => self.frames.get(next).saturating_sub(1),
                };
                debug!(
                    state = current.as_token(),
                    successor = next.as_token(),
                    "completion_fired"
                );
                self.enter(next, frame_index, time);
                transitions.push(Transition {
                    from: current,
                    to: next,
                    cause: TransitionCause::Completion,
                });
                true
            }
            None => {
                self.finished = true;
                let grace_ms = self.config.victory.exit_grace_ms;
                info!(
                    state = current.as_token(),
                    grace_ms,
                    ticks = self.tick,
                    "controller_finished"
                );
                effects.push(Effect::Exit { grace_ms });
                false
            }
        }
    }

    fn render_descriptor(&self, time: TickTime) -> RenderDescriptor {
        let state = self.animation.state;
        let frame_index = self.animation.frame_index;
        let fullscreen = matches!(state, State::SpecialRight | State::SpecialLeft)
            && self.config.special.fullscreen_frames.contains(&frame_index);
        let alpha = (state == State::Script).then(|| {
            fade_in_alpha(
                self.animation.elapsed_ms(time),
                self.config.script.fade_in_ms,
            )
        });

        RenderDescriptor {
            frame: FrameRef {
                state,
                index: frame_index,
            },
            anchor: Vec2::new(self.motion.x, self.config.ground_y + self.motion.y_offset),
            fullscreen,
            alpha,
        }
    }
}
