use thiserror::Error;

use super::state::STATE_COUNT;
use super::{ControllerConfig, State, TickTime};

/// Asset-side view the clock needs: how many frames each state owns.
pub trait FrameSource {
    fn frame_count(&self, state: State) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameCountError {
    #[error("state {state:?} has no frames")]
    Empty { state: State },
}

/// Frame counts snapshotted from the asset collaborator at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCounts {
    counts: [usize; STATE_COUNT],
}

impl FrameCounts {
    pub fn uniform(count: usize) -> Result<Self, FrameCountError> {
        Self::from_fn(|_| count)
    }

    pub fn from_source(source: &dyn FrameSource) -> Result<Self, FrameCountError> {
        Self::from_fn(|state| source.frame_count(state))
    }

    pub fn from_fn(mut count_for: impl FnMut(State) -> usize) -> Result<Self, FrameCountError> {
        let mut counts = [0; STATE_COUNT];
        for state in State::ALL {
            let count = count_for(state);
            if count == 0 {
                return Err(FrameCountError::Empty { state });
            }
            counts[state.index()] = count;
        }
        Ok(Self { counts })
    }

    pub fn with(mut self, state: State, count: usize) -> Result<Self, FrameCountError> {
        if count == 0 {
            return Err(FrameCountError::Empty { state });
        }
        self.counts[state.index()] = count;
        Ok(self)
    }

    pub fn get(&self, state: State) -> usize {
        self.counts[state.index()]
    }
}

impl FrameSource for FrameCounts {
    fn frame_count(&self, state: State) -> usize {
        self.get(state)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FramePolicy {
    Cyclic {
        ticks_per_frame: u32,
    },
    ClampLast {
        ticks_per_frame: u32,
    },
    /// Plays once; the last frame is held for a full `ticks_per_frame`
    /// before the sequence reports completion.
    OneShot {
        ticks_per_frame: u32,
    },
    /// One-shot whose per-frame duration depends on the frame index.
    VariableRate {
        ticks_per_frame: u32,
        holds: Vec<(usize, u32)>,
    },
    /// Windup paced by wall-clock time, then a constant tick rate.
    TimeDriven {
        windup_ms: u64,
        windup_frames: usize,
        active_ticks_per_frame: u32,
    },
}

impl FramePolicy {
    pub fn for_state(state: State, config: &ControllerConfig) -> FramePolicy {
        let ticks = &config.frame_ticks;
        match state {
            State::Idle
            | State::IdleLeft
            | State::WalkRight
            | State::WalkLeft
            | State::RunRight
            | State::RunLeft
            | State::CrouchWalkRight
            | State::CrouchWalkLeft => FramePolicy::Cyclic {
                ticks_per_frame: ticks.locomotion,
            },
            State::CrouchRight | State::CrouchLeft => FramePolicy::ClampLast {
                ticks_per_frame: ticks.crouch,
            },
            State::JumpRight | State::JumpLeft => FramePolicy::ClampLast {
                ticks_per_frame: ticks.jump,
            },
            State::AttackRight
            | State::AttackLeft
            | State::RunAttackRight
            | State::RunAttackLeft
            | State::CrouchAttackRight
            | State::CrouchAttackLeft => FramePolicy::OneShot {
                ticks_per_frame: ticks.attack,
            },
            State::Victory => FramePolicy::OneShot {
                ticks_per_frame: ticks.victory,
            },
            State::Script => FramePolicy::OneShot {
                ticks_per_frame: ticks.script,
            },
            State::SpecialRight | State::SpecialLeft => FramePolicy::VariableRate {
                ticks_per_frame: config.special.ticks_per_frame,
                holds: config
                    .special
                    .slow_frames
                    .iter()
                    .map(|frame| (*frame, config.special.slow_ticks_per_frame))
                    .collect(),
            },
            State::DashRight | State::DashLeft => FramePolicy::TimeDriven {
                windup_ms: config.dash.windup_ms,
                windup_frames: config.dash.windup_frames,
                active_ticks_per_frame: config.dash.active_ticks_per_frame,
            },
        }
    }

    fn ticks_for_frame(ticks_per_frame: u32, holds: &[(usize, u32)], frame: usize) -> u32 {
        holds
            .iter()
            .find(|(held, _)| *held == frame)
            .map(|(_, ticks)| *ticks)
            .unwrap_or(ticks_per_frame)
            .max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    Held,
    Advanced,
    /// A one-shot reached its end; the caller applies the completion rule.
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    pub state: State,
    pub frame_index: usize,
    /// Ticks since the state was entered.
    pub tick: u64,
    /// Ticks spent on the current frame (variable-rate only).
    pub frame_tick: u32,
    pub entered_at_ms: u64,
    /// Tick at which a time-driven state entered its constant-rate phase.
    pub phase_tick: Option<u64>,
}

impl AnimationState {
    pub fn new(state: State, now_ms: u64) -> Self {
        Self {
            state,
            frame_index: 0,
            tick: 0,
            frame_tick: 0,
            entered_at_ms: now_ms,
            phase_tick: None,
        }
    }

    pub fn enter(&mut self, state: State, frame_index: usize, now_ms: u64) {
        *self = Self {
            frame_index,
            ..Self::new(state, now_ms)
        };
    }

    /// Swap to a mirrored variant without touching frame progress.
    pub fn retarget(&mut self, state: State) {
        self.state = state;
    }

    pub fn elapsed_ms(&self, time: TickTime) -> u64 {
        time.elapsed_since(self.entered_at_ms)
    }

    /// Forces the index into `[0, frame_count - 1]`. Returns the original
    /// index when it had to be corrected.
    pub fn clamp_frame(&mut self, frame_count: usize) -> Option<usize> {
        let last = frame_count.saturating_sub(1);
        if self.frame_index > last {
            let original = self.frame_index;
            self.frame_index = last;
            return Some(original);
        }
        None
    }
}

pub struct AnimationClock;

impl AnimationClock {
    /// Runs one tick of `policy` on `animation`. Not called on the tick a
    /// state is entered.
    pub fn advance(
        animation: &mut AnimationState,
        policy: &FramePolicy,
        frame_count: usize,
        time: TickTime,
    ) -> FrameStep {
        let frame_count = frame_count.max(1);
        animation.tick = animation.tick.saturating_add(1);

        match policy {
            FramePolicy::Cyclic { ticks_per_frame } => {
                if !on_boundary(animation.tick, *ticks_per_frame) {
                    return FrameStep::Held;
                }
                animation.frame_index = (animation.frame_index + 1) % frame_count;
                FrameStep::Advanced
            }
            FramePolicy::ClampLast { ticks_per_frame } => {
                if !on_boundary(animation.tick, *ticks_per_frame) {
                    return FrameStep::Held;
                }
                let next = (animation.frame_index + 1).min(frame_count - 1);
                if next == animation.frame_index {
                    return FrameStep::Held;
                }
                animation.frame_index = next;
                FrameStep::Advanced
            }
            FramePolicy::OneShot { ticks_per_frame } => {
                if !on_boundary(animation.tick, *ticks_per_frame) {
                    return FrameStep::Held;
                }
                step_one_shot(animation, frame_count)
            }
            FramePolicy::VariableRate {
                ticks_per_frame,
                holds,
            } => {
                animation.frame_tick = animation.frame_tick.saturating_add(1);
                let needed =
                    FramePolicy::ticks_for_frame(*ticks_per_frame, holds, animation.frame_index);
                if animation.frame_tick < needed {
                    return FrameStep::Held;
                }
                animation.frame_tick = 0;
                step_one_shot(animation, frame_count)
            }
            FramePolicy::TimeDriven {
                windup_ms,
                windup_frames,
                active_ticks_per_frame,
            } => advance_time_driven(
                animation,
                *windup_ms,
                *windup_frames,
                *active_ticks_per_frame,
                frame_count,
                time,
            ),
        }
    }
}

fn on_boundary(tick: u64, ticks_per_frame: u32) -> bool {
    tick % u64::from(ticks_per_frame.max(1)) == 0
}

fn step_one_shot(animation: &mut AnimationState, frame_count: usize) -> FrameStep {
    if animation.frame_index + 1 < frame_count {
        animation.frame_index += 1;
        FrameStep::Advanced
    } else {
        FrameStep::Completed
    }
}

fn advance_time_driven(
    animation: &mut AnimationState,
    windup_ms: u64,
    windup_frames: usize,
    active_ticks_per_frame: u32,
    frame_count: usize,
    time: TickTime,
) -> FrameStep {
    let previous = animation.frame_index;
    let elapsed_ms = animation.elapsed_ms(time);

    if elapsed_ms < windup_ms && animation.phase_tick.is_none() {
        let progress = elapsed_ms as f64 / windup_ms.max(1) as f64;
        let frame = (progress * windup_frames as f64).floor() as usize;
        animation.frame_index = frame
            .min(windup_frames.saturating_sub(1))
            .min(frame_count - 1);
    } else {
        let phase_start = *animation.phase_tick.get_or_insert(animation.tick);
        let active_ticks = animation.tick.saturating_sub(phase_start);
        let frame = windup_frames as u64
            + active_ticks / u64::from(active_ticks_per_frame.max(1));
        if frame >= frame_count as u64 {
            return FrameStep::Completed;
        }
        animation.frame_index = frame as usize;
    }

    if animation.frame_index == previous {
        FrameStep::Held
    } else {
        FrameStep::Advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(tick: u64, now_ms: u64) -> TickTime {
        TickTime { tick, now_ms }
    }

    fn run(
        animation: &mut AnimationState,
        policy: &FramePolicy,
        frame_count: usize,
        ticks: u32,
    ) -> Vec<FrameStep> {
        (0..ticks)
            .map(|_| AnimationClock::advance(animation, policy, frame_count, at(0, 0)))
            .collect()
    }

    #[test]
    fn cyclic_advances_after_exactly_ticks_per_frame() {
        let policy = FramePolicy::Cyclic { ticks_per_frame: 10 };
        let mut animation = AnimationState::new(State::WalkRight, 0);
        run(&mut animation, &policy, 6, 9);
        assert_eq!(animation.frame_index, 0);
        run(&mut animation, &policy, 6, 1);
        assert_eq!(animation.frame_index, 1);
    }

    #[test]
    fn cyclic_wraps_to_first_frame() {
        let policy = FramePolicy::Cyclic { ticks_per_frame: 1 };
        let mut animation = AnimationState::new(State::Idle, 0);
        run(&mut animation, &policy, 3, 3);
        assert_eq!(animation.frame_index, 0);
    }

    #[test]
    fn clamp_last_settles_on_final_frame() {
        let policy = FramePolicy::ClampLast { ticks_per_frame: 2 };
        let mut animation = AnimationState::new(State::CrouchRight, 0);
        let steps = run(&mut animation, &policy, 2, 10);
        assert_eq!(animation.frame_index, 1);
        assert!(!steps.contains(&FrameStep::Completed));
        assert_eq!(
            steps.iter().filter(|step| **step == FrameStep::Advanced).count(),
            1
        );
    }

    #[test]
    fn one_shot_completes_on_advancing_tick_after_last_frame() {
        let policy = FramePolicy::OneShot { ticks_per_frame: 1 };
        let mut animation = AnimationState::new(State::AttackRight, 0);
        animation.frame_index = 3;
        assert_eq!(
            AnimationClock::advance(&mut animation, &policy, 5, at(0, 0)),
            FrameStep::Advanced
        );
        assert_eq!(animation.frame_index, 4);
        assert_eq!(
            AnimationClock::advance(&mut animation, &policy, 5, at(0, 0)),
            FrameStep::Completed
        );
        assert_eq!(animation.frame_index, 4);
    }

    #[test]
    fn variable_rate_holds_slow_frames_longer() {
        let policy = FramePolicy::VariableRate {
            ticks_per_frame: 2,
            holds: vec![(1, 5)],
        };
        let mut animation = AnimationState::new(State::SpecialRight, 0);
        run(&mut animation, &policy, 4, 2);
        assert_eq!(animation.frame_index, 1);
        run(&mut animation, &policy, 4, 4);
        assert_eq!(animation.frame_index, 1);
        run(&mut animation, &policy, 4, 1);
        assert_eq!(animation.frame_index, 2);
        run(&mut animation, &policy, 4, 2);
        assert_eq!(animation.frame_index, 3);
        let steps = run(&mut animation, &policy, 4, 2);
        assert_eq!(steps.last(), Some(&FrameStep::Completed));
    }

    #[test]
    fn time_driven_windup_follows_wall_clock() {
        let policy = FramePolicy::TimeDriven {
            windup_ms: 300,
            windup_frames: 3,
            active_ticks_per_frame: 2,
        };
        let mut animation = AnimationState::new(State::DashRight, 1_000);
        AnimationClock::advance(&mut animation, &policy, 6, at(1, 1_050));
        assert_eq!(animation.frame_index, 0);
        AnimationClock::advance(&mut animation, &policy, 6, at(2, 1_100));
        assert_eq!(animation.frame_index, 1);
        AnimationClock::advance(&mut animation, &policy, 6, at(3, 1_299));
        assert_eq!(animation.frame_index, 2);
        assert!(animation.phase_tick.is_none());
    }

    #[test]
    fn time_driven_active_phase_runs_on_ticks_then_completes() {
        let policy = FramePolicy::TimeDriven {
            windup_ms: 100,
            windup_frames: 2,
            active_ticks_per_frame: 2,
        };
        let mut animation = AnimationState::new(State::DashLeft, 0);
        AnimationClock::advance(&mut animation, &policy, 4, at(1, 100));
        assert_eq!(animation.frame_index, 2);
        assert_eq!(animation.phase_tick, Some(1));
        AnimationClock::advance(&mut animation, &policy, 4, at(2, 100));
        assert_eq!(animation.frame_index, 2);
        AnimationClock::advance(&mut animation, &policy, 4, at(3, 100));
        assert_eq!(animation.frame_index, 3);
        AnimationClock::advance(&mut animation, &policy, 4, at(4, 100));
        assert_eq!(
            AnimationClock::advance(&mut animation, &policy, 4, at(5, 100)),
            FrameStep::Completed
        );
    }

    #[test]
    fn clamp_frame_reports_correction() {
        let mut animation = AnimationState::new(State::JumpLeft, 0);
        animation.frame_index = 7;
        assert_eq!(animation.clamp_frame(4), Some(7));
        assert_eq!(animation.frame_index, 3);
        assert_eq!(animation.clamp_frame(4), None);
    }

    #[test]
    fn frame_counts_reject_empty_states() {
        assert_eq!(
            FrameCounts::uniform(0),
            Err(FrameCountError::Empty { state: State::Idle })
        );
        let counts = FrameCounts::uniform(4).expect("counts");
        assert_eq!(
            counts.with(State::Script, 0),
            Err(FrameCountError::Empty {
                state: State::Script
            })
        );
    }

    #[test]
    fn policies_follow_state_families() {
        let config = ControllerConfig::default();
        assert!(matches!(
            FramePolicy::for_state(State::CrouchLeft, &config),
            FramePolicy::ClampLast { .. }
        ));
        assert!(matches!(
            FramePolicy::for_state(State::RunAttackLeft, &config),
            FramePolicy::OneShot { .. }
        ));
        assert!(matches!(
            FramePolicy::for_state(State::SpecialLeft, &config),
            FramePolicy::VariableRate { .. }
        ));
        assert!(matches!(
            FramePolicy::for_state(State::DashRight, &config),
            FramePolicy::TimeDriven { .. }
        ));
    }
}
