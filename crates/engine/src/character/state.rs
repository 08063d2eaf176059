#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facing {
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Self::Right => 1.0,
            Self::Left => -1.0,
        }
    }
}

/// Every pose the character can be in. Most states come in right/left pairs;
/// `Victory` and `Script` carry no facing of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Idle,
    IdleLeft,
    WalkRight,
    WalkLeft,
    RunRight,
    RunLeft,
    CrouchRight,
    CrouchLeft,
    CrouchWalkRight,
    CrouchWalkLeft,
    JumpRight,
    JumpLeft,
    AttackRight,
    AttackLeft,
    RunAttackRight,
    RunAttackLeft,
    CrouchAttackRight,
    CrouchAttackLeft,
    DashRight,
    DashLeft,
    SpecialRight,
    SpecialLeft,
    Victory,
    Script,
}

pub const STATE_COUNT: usize = 24;

impl State {
    pub const ALL: [State; STATE_COUNT] = [
        State::Idle,
        State::IdleLeft,
        State::WalkRight,
        State::WalkLeft,
        State::RunRight,
        State::RunLeft,
        State::CrouchRight,
        State::CrouchLeft,
        State::CrouchWalkRight,
        State::CrouchWalkLeft,
        State::JumpRight,
        State::JumpLeft,
        State::AttackRight,
        State::AttackLeft,
        State::RunAttackRight,
        State::RunAttackLeft,
        State::CrouchAttackRight,
        State::CrouchAttackLeft,
        State::DashRight,
        State::DashLeft,
        State::SpecialRight,
        State::SpecialLeft,
        State::Victory,
        State::Script,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Committed states ignore input until their own completion fires.
    pub fn is_committed(self) -> bool {
        !matches!(
            self,
            Self::Idle
                | Self::IdleLeft
                | Self::WalkRight
                | Self::WalkLeft
                | Self::RunRight
                | Self::RunLeft
                | Self::CrouchRight
                | Self::CrouchLeft
                | Self::CrouchWalkRight
                | Self::CrouchWalkLeft
        )
    }

    pub fn is_jump(self) -> bool {
        matches!(self, Self::JumpRight | Self::JumpLeft)
    }

    pub fn is_dash(self) -> bool {
        matches!(self, Self::DashRight | Self::DashLeft)
    }

    pub fn facing(self) -> Option<Facing> {
        match self {
            Self::Victory | Self::Script => None,
            Self::IdleLeft
            | Self::WalkLeft
            | Self::RunLeft
            | Self::CrouchLeft
            | Self::CrouchWalkLeft
            | Self::JumpLeft
            | Self::AttackLeft
            | Self::RunAttackLeft
            | Self::CrouchAttackLeft
            | Self::DashLeft
            | Self::SpecialLeft => Some(Facing::Left),
            _ => Some(Facing::Right),
        }
    }

    /// The same pose facing the other way. Neutral states mirror to themselves.
    pub fn mirrored(self) -> State {
        match self {
            Self::Idle => Self::IdleLeft,
            Self::IdleLeft => Self::Idle,
            Self::WalkRight => Self::WalkLeft,
            Self::WalkLeft => Self::WalkRight,
            Self::RunRight => Self::RunLeft,
            Self::RunLeft => Self::RunRight,
            Self::CrouchRight => Self::CrouchLeft,
            Self::CrouchLeft => Self::CrouchRight,
            Self::CrouchWalkRight => Self::CrouchWalkLeft,
            Self::CrouchWalkLeft => Self::CrouchWalkRight,
            Self::JumpRight => Self::JumpLeft,
            Self::JumpLeft => Self::JumpRight,
            Self::AttackRight => Self::AttackLeft,
            Self::AttackLeft => Self::AttackRight,
            Self::RunAttackRight => Self::RunAttackLeft,
            Self::RunAttackLeft => Self::RunAttackRight,
            Self::CrouchAttackRight => Self::CrouchAttackLeft,
            Self::CrouchAttackLeft => Self::CrouchAttackRight,
            Self::DashRight => Self::DashLeft,
            Self::DashLeft => Self::DashRight,
            Self::SpecialRight => Self::SpecialLeft,
            Self::SpecialLeft => Self::SpecialRight,
            Self::Victory => Self::Victory,
            Self::Script => Self::Script,
        }
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::IdleLeft => "idle_left",
            Self::WalkRight => "walk_right",
            Self::WalkLeft => "walk_left",
            Self::RunRight => "run_right",
            Self::RunLeft => "run_left",
            Self::CrouchRight => "crouch_right",
            Self::CrouchLeft => "crouch_left",
            Self::CrouchWalkRight => "crouch_walk_right",
            Self::CrouchWalkLeft => "crouch_walk_left",
            Self::JumpRight => "jump_right",
            Self::JumpLeft => "jump_left",
            Self::AttackRight => "attack_right",
            Self::AttackLeft => "attack_left",
            Self::RunAttackRight => "run_attack_right",
            Self::RunAttackLeft => "run_attack_left",
            Self::CrouchAttackRight => "crouch_attack_right",
            Self::CrouchAttackLeft => "crouch_attack_left",
            Self::DashRight => "dash_right",
            Self::DashLeft => "dash_left",
            Self::SpecialRight => "special_right",
            Self::SpecialLeft => "special_left",
            Self::Victory => "victory",
            Self::Script => "script",
        }
    }
}
