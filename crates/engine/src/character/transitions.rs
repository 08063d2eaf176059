use thiserror::Error;

use super::input::SYMBOL_COUNT;
use super::state::STATE_COUNT;
use super::{CompletionPolicy, State, Symbol};

/// Target of the last-resort fallback when neither the exact pair nor the
/// state's `None` entry exist.
pub const GLOBAL_DEFAULT_STATE: State = State::Idle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("state {state:?} has no entry for the none symbol")]
    MissingNoneEntry { state: State },
    #[error("committed state {state:?} has no completion rule")]
    MissingCompletion { state: State },
    #[error("state {state:?} is not committed but has a completion rule")]
    UnexpectedCompletion { state: State },
    #[error("state {state:?} terminates but is not the terminal state")]
    UnexpectedTerminate { state: State },
}

/// Dense δ(State, Symbol) table built once at startup.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    entries: [[Option<State>; SYMBOL_COUNT]; STATE_COUNT],
}

impl Default for TransitionTable {
    fn default() -> Self {
        default_table()
    }
}

impl TransitionTable {
    pub fn builder() -> TransitionTableBuilder {
        TransitionTableBuilder {
            entries: [[None; SYMBOL_COUNT]; STATE_COUNT],
        }
    }

    pub fn entry(&self, state: State, symbol: Symbol) -> Option<State> {
        self.entries[state.index()][symbol.index()]
    }

    /// Exact match, then the state's `None` entry, then the global default.
    pub fn resolve(&self, state: State, symbol: Symbol) -> State {
        self.entry(state, symbol)
            .or_else(|| self.entry(state, Symbol::None))
            .unwrap_or(GLOBAL_DEFAULT_STATE)
    }

    pub fn validate(&self, completions: &CompletionPolicy) -> Result<(), TableError> {
        for state in State::ALL {
            if self.entry(state, Symbol::None).is_none() {
                return Err(TableError::MissingNoneEntry { state });
            }
            match (state.is_committed(), completions.rule(state)) {
                (true, None) => return Err(TableError::MissingCompletion { state }),
                (false, Some(_)) => return Err(TableError::UnexpectedCompletion { state }),
                (true, Some(rule)) if rule.successor.is_terminal() && state != State::Victory => {
                    return Err(TableError::UnexpectedTerminate { state });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TransitionTableBuilder {
    entries: [[Option<State>; SYMBOL_COUNT]; STATE_COUNT],
}

impl TransitionTableBuilder {
    pub fn on(mut self, from: State, symbol: Symbol, to: State) -> Self {
        self.entries[from.index()][symbol.index()] = Some(to);
        self
    }

    pub fn on_all(mut self, from: State, pairs: &[(Symbol, State)]) -> Self {
        for (symbol, to) in pairs {
            self = self.on(from, *symbol, *to);
        }
        self
    }

    /// Committed states only loop on `None`; input never reaches them.
    pub fn self_loop(self, state: State) -> Self {
        self.on(state, Symbol::None, state)
    }

    pub fn build(self) -> TransitionTable {
        TransitionTable {
            entries: self.entries,
        }
    }
}

fn default_table() -> TransitionTable {
    use State as S;
    use Symbol as Y;

    let mut builder = TransitionTable::builder()
        .on_all(
            S::Idle,
            &[
                (Y::Left, S::WalkLeft),
                (Y::Right, S::WalkRight),
                (Y::RunLeft, S::RunLeft),
                (Y::RunRight, S::RunRight),
                (Y::Crouch, S::CrouchRight),
                (Y::CrouchLeft, S::CrouchWalkLeft),
                (Y::CrouchRight, S::CrouchWalkRight),
                (Y::Jump, S::JumpRight),
                (Y::JumpLeft, S::JumpLeft),
                (Y::JumpRight, S::JumpRight),
                (Y::Attack, S::AttackRight),
                (Y::Dash, S::DashRight),
                (Y::Special, S::SpecialRight),
                (Y::Celebrate, S::Victory),
                (Y::Script, S::Script),
                (Y::None, S::Idle),
            ],
        )
        .on_all(
            S::IdleLeft,
            &[
                (Y::Left, S::WalkLeft),
                (Y::Right, S::WalkRight),
                (Y::RunLeft, S::RunLeft),
                (Y::RunRight, S::RunRight),
                (Y::Crouch, S::CrouchLeft),
                (Y::CrouchLeft, S::CrouchWalkLeft),
                (Y::CrouchRight, S::CrouchWalkRight),
                (Y::Jump, S::JumpLeft),
                (Y::JumpLeft, S::JumpLeft),
                (Y::JumpRight, S::JumpRight),
                (Y::Attack, S::AttackLeft),
                (Y::Dash, S::DashLeft),
                (Y::Special, S::SpecialLeft),
                (Y::Celebrate, S::Victory),
                (Y::Script, S::Script),
                (Y::None, S::IdleLeft),
            ],
        )
        .on_all(
            S::WalkRight,
            &[
                (Y::Right, S::WalkRight),
                (Y::Left, S::WalkLeft),
                (Y::RunRight, S::RunRight),
                (Y::Crouch, S::CrouchRight),
                (Y::Jump, S::JumpRight),
                (Y::JumpRight, S::JumpRight),
                (Y::JumpLeft, S::JumpLeft),
                (Y::Attack, S::AttackRight),
                (Y::Dash, S::DashRight),
                (Y::Special, S::SpecialRight),
                (Y::None, S::Idle),
            ],
        )
        .on_all(
            S::WalkLeft,
            &[
                (Y::Left, S::WalkLeft),
                (Y::Right, S::WalkRight),
                (Y::RunLeft, S::RunLeft),
                (Y::Crouch, S::CrouchLeft),
                (Y::Jump, S::JumpLeft),
                (Y::JumpLeft, S::JumpLeft),
                (Y::JumpRight, S::JumpRight),
                (Y::Attack, S::AttackLeft),
                (Y::Dash, S::DashLeft),
                (Y::Special, S::SpecialLeft),
                (Y::None, S::IdleLeft),
            ],
        )
        .on_all(
            S::RunRight,
            &[
                (Y::RunRight, S::RunRight),
                (Y::Right, S::WalkRight),
                (Y::Left, S::WalkLeft),
                (Y::Crouch, S::CrouchRight),
                (Y::Jump, S::JumpRight),
                (Y::JumpRight, S::JumpRight),
                (Y::JumpLeft, S::JumpLeft),
                (Y::Attack, S::RunAttackRight),
                (Y::Dash, S::DashRight),
                (Y::None, S::Idle),
            ],
        )
        .on_all(
            S::RunLeft,
            &[
                (Y::RunLeft, S::RunLeft),
                (Y::Left, S::WalkLeft),
                (Y::Right, S::WalkRight),
                (Y::Crouch, S::CrouchLeft),
                (Y::Jump, S::JumpLeft),
                (Y::JumpLeft, S::JumpLeft),
                (Y::JumpRight, S::JumpRight),
                (Y::Attack, S::RunAttackLeft),
                (Y::Dash, S::DashLeft),
                (Y::None, S::IdleLeft),
            ],
        )
        .on_all(
            S::CrouchRight,
            &[
                (Y::Crouch, S::CrouchRight),
                (Y::CrouchLeft, S::CrouchWalkLeft),
                (Y::CrouchRight, S::CrouchWalkRight),
                (Y::Attack, S::CrouchAttackRight),
                (Y::None, S::Idle),
            ],
        )
        .on_all(
            S::CrouchLeft,
            &[
                (Y::Crouch, S::CrouchLeft),
                (Y::CrouchLeft, S::CrouchWalkLeft),
                (Y::CrouchRight, S::CrouchWalkRight),
                (Y::Attack, S::CrouchAttackLeft),
                (Y::None, S::IdleLeft),
            ],
        )
        .on_all(
            S::CrouchWalkRight,
            &[
                (Y::CrouchRight, S::CrouchWalkRight),
                (Y::CrouchLeft, S::CrouchWalkLeft),
                (Y::Crouch, S::CrouchRight),
                (Y::Attack, S::CrouchAttackRight),
                (Y::None, S::CrouchRight),
            ],
        )
        .on_all(
            S::CrouchWalkLeft,
            &[
                (Y::CrouchLeft, S::CrouchWalkLeft),
                (Y::CrouchRight, S::CrouchWalkRight),
                (Y::Crouch, S::CrouchLeft),
                (Y::Attack, S::CrouchAttackLeft),
                (Y::None, S::CrouchLeft),
            ],
        );

    for state in State::ALL.into_iter().filter(|state| state.is_committed()) {
        builder = builder.self_loop(state);
    }
    builder.build()
}
