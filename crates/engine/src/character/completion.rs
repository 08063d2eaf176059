use std::collections::HashMap;

use super::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    Fixed(State),
    /// Return to the uncommitted state the actor was cycling through before
    /// the commitment began, or `fallback` when there was none.
    Previous { fallback: State },
    /// End of the run; no further state changes.
    Terminate,
}

impl Successor {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Terminate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeFrame {
    First,
    Last,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionTrigger {
    AnimationEnd,
    Landing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionRule {
    pub successor: Successor,
    pub resume: ResumeFrame,
    pub trigger: CompletionTrigger,
}

impl CompletionRule {
    pub fn on_end(successor: Successor) -> Self {
        Self {
            successor,
            resume: ResumeFrame::First,
            trigger: CompletionTrigger::AnimationEnd,
        }
    }

    pub fn resume_last(mut self) -> Self {
        self.resume = ResumeFrame::Last;
        self
    }

    pub fn on_landing(mut self) -> Self {
        self.trigger = CompletionTrigger::Landing;
        self
    }
}

/// Where each committed state goes once its action is over. Entries are
/// enumerated per state on purpose: an attack started from a run returns to
/// the run, the same attack from a standstill returns to idle.
#[derive(Debug, Clone)]
pub struct CompletionPolicy {
    rules: HashMap<State, CompletionRule>,
}

impl Default for CompletionPolicy {
    fn default() -> Self {
        use CompletionRule as R;
        use State as S;
        use Successor::{Fixed, Previous, Terminate};

        Self::from_rules([
            (S::AttackRight, R::on_end(Fixed(S::Idle))),
            (S::AttackLeft, R::on_end(Fixed(S::IdleLeft))),
            (S::RunAttackRight, R::on_end(Fixed(S::RunRight))),
            (S::RunAttackLeft, R::on_end(Fixed(S::RunLeft))),
            (S::CrouchAttackRight, R::on_end(Fixed(S::CrouchRight)).resume_last()),
            (S::CrouchAttackLeft, R::on_end(Fixed(S::CrouchLeft)).resume_last()),
            (S::JumpRight, R::on_end(Fixed(S::Idle)).on_landing()),
            (S::JumpLeft, R::on_end(Fixed(S::IdleLeft)).on_landing()),
            (S::DashRight, R::on_end(Previous { fallback: S::Idle })),
            (S::DashLeft, R::on_end(Previous { fallback: S::IdleLeft })),
            (S::SpecialRight, R::on_end(Fixed(S::Idle))),
            (S::SpecialLeft, R::on_end(Fixed(S::IdleLeft))),
            (S::Script, R::on_end(Previous { fallback: S::Idle })),
            (S::Victory, R::on_end(Terminate)),
        ])
    }
}

impl CompletionPolicy {
    pub fn from_rules(rules: impl IntoIterator<Item = (State, CompletionRule)>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn rule(&self, state: State) -> Option<&CompletionRule> {
        self.rules.get(&state)
    }

    pub fn trigger(&self, state: State) -> Option<CompletionTrigger> {
        self.rule(state).map(|rule| rule.trigger)
    }

    #[cfg(test)]
    pub(crate) fn without(mut self, state: State) -> Self {
        self.rules.remove(&state);
        self
    }

    #[cfg(test)]
    pub(crate) fn with(mut self, state: State, rule: CompletionRule) -> Self {
        self.rules.insert(state, rule);
        self
    }
}

/// Picks the concrete successor for a fired completion. `previous` is the
/// uncommitted state recorded when the commitment began.
pub fn resolve_successor(successor: Successor, previous: Option<State>) -> Option<State> {
    match successor {
        Successor::Fixed(state) => Some(state),
        Successor::Previous { fallback } => Some(
            previous
                .filter(|state| !state.is_committed())
                .unwrap_or(fallback),
        ),
        Successor::Terminate => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_committed_state_has_a_rule() {
        let policy = CompletionPolicy::default();
        for state in State::ALL {
            assert_eq!(
                policy.rule(state).is_some(),
                state.is_committed(),
                "state={state:?}"
            );
        }
    }

    #[test]
    fn attack_context_is_preserved() {
        let policy = CompletionPolicy::default();
        let standing = policy.rule(State::AttackRight).expect("rule");
        let running = policy.rule(State::RunAttackRight).expect("rule");
        assert_eq!(standing.successor, Successor::Fixed(State::Idle));
        assert_eq!(running.successor, Successor::Fixed(State::RunRight));
    }

    #[test]
    fn crouch_attack_resumes_on_last_crouch_frame() {
        let policy = CompletionPolicy::default();
        let rule = policy.rule(State::CrouchAttackLeft).expect("rule");
        assert_eq!(rule.successor, Successor::Fixed(State::CrouchLeft));
        assert_eq!(rule.resume, ResumeFrame::Last);
    }

    #[test]
    fn jump_completes_on_landing() {
        let policy = CompletionPolicy::default();
        assert_eq!(
            policy.trigger(State::JumpLeft),
            Some(CompletionTrigger::Landing)
        );
        assert_eq!(
            policy.trigger(State::AttackLeft),
            Some(CompletionTrigger::AnimationEnd)
        );
    }

    #[test]
    fn previous_successor_uses_recorded_state() {
        let successor = Successor::Previous {
            fallback: State::Idle,
        };
        assert_eq!(
            resolve_successor(successor, Some(State::RunRight)),
            Some(State::RunRight)
        );
        assert_eq!(resolve_successor(successor, None), Some(State::Idle));
        assert_eq!(
            resolve_successor(successor, Some(State::DashLeft)),
            Some(State::Idle)
        );
    }

    #[test]
    fn terminate_has_no_successor() {
        assert_eq!(resolve_successor(Successor::Terminate, Some(State::Idle)), None);
    }
}
