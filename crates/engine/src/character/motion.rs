use std::f32::consts::PI;

use super::{ControllerConfig, Facing, KeySet, State, TickTime};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionState {
    pub x: f32,
    /// Vertical offset from the ground line; negative is up.
    pub y_offset: f32,
    pub jump_remaining: u32,
    pub dash_started_ms: Option<u64>,
}

impl MotionState {
    pub fn new(x: f32) -> Self {
        Self {
            x,
            y_offset: 0.0,
            jump_remaining: 0,
            dash_started_ms: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MotionOutcome {
    /// The jump arc ran out this tick.
    pub landed: bool,
    /// Mirrored jump state requested by live air steering.
    pub steer: Option<State>,
    /// First tick of a dash activation.
    pub dash_started: bool,
}

/// `-height * sin(pi * progress)`, exactly zero at both ends of the arc.
pub fn jump_offset(remaining: u32, duration: u32, height: f32) -> f32 {
    if duration == 0 || remaining == 0 || remaining >= duration {
        return 0.0;
    }
    let progress = 1.0 - remaining as f32 / duration as f32;
    -height * (PI * progress).sin()
}

pub struct MotionModel;

impl MotionModel {
    pub fn on_enter(motion: &mut MotionState, state: State, config: &ControllerConfig) {
        motion.y_offset = 0.0;
        motion.jump_remaining = if state.is_jump() {
            config.jump.duration_ticks
        } else {
            0
        };
        if !state.is_dash() {
            motion.dash_started_ms = None;
        }
    }

    /// Base per-tick horizontal velocity for `state`, ignoring the jump and
    /// dash overlays.
    pub fn base_velocity(state: State, config: &ControllerConfig) -> f32 {
        let speeds = &config.speeds;
        match state {
            State::WalkRight => speeds.walk,
            State::WalkLeft => -speeds.walk,
            State::RunRight => speeds.run,
            State::RunLeft => -speeds.run,
            State::CrouchWalkRight => speeds.crouch_walk,
            State::CrouchWalkLeft => -speeds.crouch_walk,
            _ => 0.0,
        }
    }

    /// Moves the actor for one tick. `entered` is true on the tick the state
    /// began, which keeps the arc at rest for that tick.
    pub fn step(
        motion: &mut MotionState,
        state: State,
        frame_index: usize,
        pressed: &KeySet,
        entered: bool,
        time: TickTime,
        config: &ControllerConfig,
    ) -> MotionOutcome {
        let mut outcome = MotionOutcome::default();

        let velocity = if state.is_jump() {
            if !entered {
                motion.jump_remaining = motion.jump_remaining.saturating_sub(1);
                outcome.landed = motion.jump_remaining == 0;
            }
            motion.y_offset = jump_offset(
                motion.jump_remaining,
                config.jump.duration_ticks,
                config.jump.height,
            );

            let axis = pressed.horizontal_axis();
            let wanted = match axis {
                1 => Some(Facing::Right),
                -1 => Some(Facing::Left),
                _ => None,
            };
            if wanted.is_some() && wanted != state.facing() {
                outcome.steer = Some(state.mirrored());
            }
            f32::from(axis) * config.jump.air_speed
        } else if state.is_dash() {
            if motion.dash_started_ms.is_none() {
                motion.dash_started_ms = Some(time.now_ms);
                outcome.dash_started = true;
            }
            if frame_index >= config.dash.windup_frames {
                state.facing().map_or(0.0, Facing::sign) * config.dash.speed
            } else {
                0.0
            }
        } else {
            Self::base_velocity(state, config)
        };

        motion.x = (motion.x + velocity).clamp(0.0, config.screen_width);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::super::Key;
    use super::*;

    fn time(now_ms: u64) -> TickTime {
        TickTime { tick: 0, now_ms }
    }

    #[test]
    fn jump_offset_is_zero_at_both_ends_and_negative_between() {
        let duration = 42;
        assert_eq!(jump_offset(duration, duration, 120.0), 0.0);
        assert_eq!(jump_offset(0, duration, 120.0), 0.0);
        for remaining in 1..duration {
            assert!(
                jump_offset(remaining, duration, 120.0) < 0.0,
                "remaining={remaining}"
            );
        }
    }

    #[test]
    fn jump_peaks_at_half_duration() {
        let offset = jump_offset(20, 40, 100.0);
        assert!((offset + 100.0).abs() < 1e-3, "offset={offset}");
    }

    #[test]
    fn walk_moves_by_configured_speed() {
        let config = ControllerConfig::default();
        let mut motion = MotionState::new(100.0);
        MotionModel::step(
            &mut motion,
            State::WalkLeft,
            0,
            &KeySet::empty(),
            false,
            time(0),
            &config,
        );
        assert_eq!(motion.x, 100.0 - config.speeds.walk);
    }

    #[test]
    fn position_is_clamped_to_screen() {
        let config = ControllerConfig::default();
        let mut motion = MotionState::new(config.screen_width - 1.0);
        for _ in 0..10 {
            MotionModel::step(
                &mut motion,
                State::RunRight,
                0,
                &KeySet::empty(),
                false,
                time(0),
                &config,
            );
        }
        assert_eq!(motion.x, config.screen_width);

        let mut motion = MotionState::new(1.0);
        MotionModel::step(
            &mut motion,
            State::RunLeft,
            0,
            &KeySet::empty(),
            false,
            time(0),
            &config,
        );
        assert_eq!(motion.x, 0.0);
    }

    #[test]
    fn jump_lands_after_duration_ticks() {
        let config = ControllerConfig::default();
        let mut motion = MotionState::new(400.0);
        MotionModel::on_enter(&mut motion, State::JumpRight, &config);
        let entry = MotionModel::step(
            &mut motion,
            State::JumpRight,
            0,
            &KeySet::empty(),
            true,
            time(0),
            &config,
        );
        assert!(!entry.landed);
        assert_eq!(motion.y_offset, 0.0);

        let mut landed_at = None;
        for tick in 1..=config.jump.duration_ticks {
            let outcome = MotionModel::step(
                &mut motion,
                State::JumpRight,
                0,
                &KeySet::empty(),
                false,
                time(0),
                &config,
            );
            if outcome.landed {
                landed_at = Some(tick);
                break;
            }
            assert!(motion.y_offset < 0.0, "tick={tick}");
        }
        assert_eq!(landed_at, Some(config.jump.duration_ticks));
        assert_eq!(motion.y_offset, 0.0);
    }

    #[test]
    fn holding_opposite_direction_steers_jump() {
        let config = ControllerConfig::default();
        let mut motion = MotionState::new(400.0);
        MotionModel::on_enter(&mut motion, State::JumpRight, &config);
        let outcome = MotionModel::step(
            &mut motion,
            State::JumpRight,
            2,
            &KeySet::of(&[Key::Left]),
            false,
            time(0),
            &config,
        );
        assert_eq!(outcome.steer, Some(State::JumpLeft));
        assert_eq!(motion.x, 400.0 - config.jump.air_speed);
        assert_eq!(motion.jump_remaining, config.jump.duration_ticks - 1);
    }

    #[test]
    fn dash_signals_start_once_and_moves_after_windup() {
        let config = ControllerConfig::default();
        let mut motion = MotionState::new(100.0);
        MotionModel::on_enter(&mut motion, State::DashRight, &config);

        let first = MotionModel::step(
            &mut motion,
            State::DashRight,
            0,
            &KeySet::empty(),
            true,
            time(50),
            &config,
        );
        assert!(first.dash_started);
        assert_eq!(motion.dash_started_ms, Some(50));
        assert_eq!(motion.x, 100.0);

        let second = MotionModel::step(
            &mut motion,
            State::DashRight,
            config.dash.windup_frames,
            &KeySet::empty(),
            false,
            time(400),
            &config,
        );
        assert!(!second.dash_started);
        assert_eq!(motion.x, 100.0 + config.dash.speed);

        MotionModel::on_enter(&mut motion, State::Idle, &config);
        assert_eq!(motion.dash_started_ms, None);
    }
}
