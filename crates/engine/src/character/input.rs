use super::State;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Crouch,
    Modifier,
    Jump,
    Attack,
    Dash,
    Special,
    Celebrate,
    Script,
}

const KEY_COUNT: usize = 10;

impl Key {
    pub const ALL: [Key; KEY_COUNT] = [
        Key::Left,
        Key::Right,
        Key::Crouch,
        Key::Modifier,
        Key::Jump,
        Key::Attack,
        Key::Dash,
        Key::Special,
        Key::Celebrate,
        Key::Script,
    ];

    const fn index(self) -> usize {
        match self {
            Key::Left => 0,
            Key::Right => 1,
            Key::Crouch => 2,
            Key::Modifier => 3,
            Key::Jump => 4,
            Key::Attack => 5,
            Key::Dash => 6,
            Key::Special => 7,
            Key::Celebrate => 8,
            Key::Script => 9,
        }
    }
}

/// Pressed/released flag for every [`Key`], sampled once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeySet {
    down: [bool; KEY_COUNT],
}

impl KeySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn of(keys: &[Key]) -> Self {
        let mut set = Self::default();
        for key in keys {
            set.set(*key, true);
        }
        set
    }

    pub fn set(&mut self, key: Key, is_down: bool) {
        self.down[key.index()] = is_down;
    }

    pub fn with(mut self, key: Key) -> Self {
        self.set(key, true);
        self
    }

    pub fn is_down(&self, key: Key) -> bool {
        self.down[key.index()]
    }

    pub fn contains_all(&self, other: &KeySet) -> bool {
        self.down
            .iter()
            .zip(other.down.iter())
            .all(|(have, need)| *have || !*need)
    }

    pub fn is_empty(&self) -> bool {
        !self.down.iter().any(|down| *down)
    }

    /// Signed horizontal intent: +1 right, -1 left, 0 for neither or both.
    pub fn horizontal_axis(&self) -> i8 {
        match (self.is_down(Key::Left), self.is_down(Key::Right)) {
            (true, false) => -1,
            (false, true) => 1,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    None,
    Left,
    Right,
    RunLeft,
    RunRight,
    Crouch,
    CrouchLeft,
    CrouchRight,
    Jump,
    JumpLeft,
    JumpRight,
    Attack,
    Dash,
    Special,
    Celebrate,
    Script,
}

pub const SYMBOL_COUNT: usize = 16;

impl Symbol {
    pub const ALL: [Symbol; SYMBOL_COUNT] = [
        Symbol::None,
        Symbol::Left,
        Symbol::Right,
        Symbol::RunLeft,
        Symbol::RunRight,
        Symbol::Crouch,
        Symbol::CrouchLeft,
        Symbol::CrouchRight,
        Symbol::Jump,
        Symbol::JumpLeft,
        Symbol::JumpRight,
        Symbol::Attack,
        Symbol::Dash,
        Symbol::Special,
        Symbol::Celebrate,
        Symbol::Script,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn as_token(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Left => "left",
            Self::Right => "right",
            Self::RunLeft => "run_left",
            Self::RunRight => "run_right",
            Self::Crouch => "crouch",
            Self::CrouchLeft => "crouch_left",
            Self::CrouchRight => "crouch_right",
            Self::Jump => "jump",
            Self::JumpLeft => "jump_left",
            Self::JumpRight => "jump_right",
            Self::Attack => "attack",
            Self::Dash => "dash",
            Self::Special => "special",
            Self::Celebrate => "celebrate",
            Self::Script => "script",
        }
    }
}

/// One classification rule: the symbol is produced when every key of the
/// chord is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierRule {
    pub chord: KeySet,
    pub symbol: Symbol,
}

impl ClassifierRule {
    pub fn new(keys: &[Key], symbol: Symbol) -> Self {
        Self {
            chord: KeySet::of(keys),
            symbol,
        }
    }

    pub fn matches(&self, pressed: &KeySet) -> bool {
        !self.chord.is_empty() && pressed.contains_all(&self.chord)
    }
}

/// First-match classifier over an ordered rule list. Combos must precede the
/// single keys they contain.
#[derive(Debug, Clone)]
pub struct InputClassifier {
    rules: Vec<ClassifierRule>,
}

impl Default for InputClassifier {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl InputClassifier {
    pub fn new(rules: Vec<ClassifierRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ClassifierRule] {
        &self.rules
    }

    pub fn classify(&self, pressed: &KeySet, current: State) -> Symbol {
        if current.is_committed() {
            return Symbol::None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(pressed))
            .map(|rule| rule.symbol)
            .unwrap_or(Symbol::None)
    }
}

pub fn default_rules() -> Vec<ClassifierRule> {
    vec![
        ClassifierRule::new(&[Key::Celebrate], Symbol::Celebrate),
        ClassifierRule::new(&[Key::Script], Symbol::Script),
        ClassifierRule::new(&[Key::Special], Symbol::Special),
        ClassifierRule::new(&[Key::Dash], Symbol::Dash),
        ClassifierRule::new(&[Key::Attack], Symbol::Attack),
        ClassifierRule::new(&[Key::Jump, Key::Left], Symbol::JumpLeft),
        ClassifierRule::new(&[Key::Jump, Key::Right], Symbol::JumpRight),
        ClassifierRule::new(&[Key::Jump], Symbol::Jump),
        ClassifierRule::new(&[Key::Crouch, Key::Left], Symbol::CrouchLeft),
        ClassifierRule::new(&[Key::Crouch, Key::Right], Symbol::CrouchRight),
        ClassifierRule::new(&[Key::Modifier, Key::Left], Symbol::RunLeft),
        ClassifierRule::new(&[Key::Modifier, Key::Right], Symbol::RunRight),
        ClassifierRule::new(&[Key::Crouch], Symbol::Crouch),
        ClassifierRule::new(&[Key::Left], Symbol::Left),
        ClassifierRule::new(&[Key::Right], Symbol::Right),
    ]
}
