mod animation;
mod clock;
mod completion;
mod config;
mod controller;
mod effects;
mod input;
mod motion;
mod render;
mod state;
mod transitions;

pub use animation::{
    AnimationClock, AnimationState, FrameCountError, FrameCounts, FramePolicy, FrameSource,
    FrameStep,
};
pub use clock::{Clock, ManualClock, SystemClock, TickTime};
pub use completion::{
    resolve_successor, CompletionPolicy, CompletionRule, CompletionTrigger, ResumeFrame,
    Successor,
};
pub use config::{
    ConfigError, ControllerConfig, DashConfig, FrameTickConfig, JumpConfig, ScriptConfig,
    SpecialConfig, SpeedConfig, VictoryConfig,
};
pub use controller::{
    frame_index_mismatches, Controller, ControllerError, FrameMismatch, TickOutput, Transition,
    TransitionCause,
};
pub use effects::{CueId, Effect, EffectScheduler, EffectTrigger};
pub use input::{default_rules, ClassifierRule, InputClassifier, Key, KeySet, Symbol};
pub use motion::{jump_offset, MotionModel, MotionOutcome, MotionState};
pub use render::{fade_in_alpha, FrameRef, RenderDescriptor, Vec2};
pub use state::{Facing, State, STATE_COUNT};
pub use transitions::{TableError, TransitionTable, TransitionTableBuilder, GLOBAL_DEFAULT_STATE};
