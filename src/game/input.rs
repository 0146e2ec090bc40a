//! Input Commands
//!
//! Per-frame, already debounced command sets for one character.
//! The input collaborator owns key decoding; the core only sees which
//! commands were pressed, held or released this frame.

use serde::{Serialize, Deserialize};

// =============================================================================
// COMMANDS
// =============================================================================

/// A discrete fighting-game command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Command {
    /// Walk / run left
    MoveLeft = 0,
    /// Walk / run right
    MoveRight = 1,
    /// Held with a direction to run instead of walk
    RunModifier = 2,
    /// Crouch (held)
    Crouch = 3,
    /// Jump (on press)
    Jump = 4,
    /// Light attack (on press)
    Light = 5,
    /// Heavy attack (on press)
    Heavy = 6,
    /// Special attack (on press, costs meter)
    Special = 7,
    /// Ultimate attack (on press, needs a full meter)
    Ultimate = 8,
    /// Block (held)
    Block = 9,
}

impl Command {
    /// Every command, in bit order.
    pub const ALL: [Command; 10] = [
        Command::MoveLeft,
        Command::MoveRight,
        Command::RunModifier,
        Command::Crouch,
        Command::Jump,
        Command::Light,
        Command::Heavy,
        Command::Special,
        Command::Ultimate,
        Command::Block,
    ];

    /// Bit for this command inside a [`CommandSet`].
    #[inline]
    pub const fn bit(self) -> u16 {
        1 << (self as u8)
    }
}

/// Bit set of commands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandSet(pub u16);

impl CommandSet {
    /// No commands.
    pub const EMPTY: Self = Self(0);

    /// Mask of all defined command bits.
    pub const MASK: u16 = (1 << Command::ALL.len()) - 1;

    /// Build from a list of commands.
    pub fn of(commands: &[Command]) -> Self {
        let mut set = Self::EMPTY;
        for c in commands {
            set.insert(*c);
        }
        set
    }

    /// Build from raw bits, dropping undefined bits.
    #[inline]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & Self::MASK)
    }

    /// Check membership.
    #[inline]
    pub fn contains(self, command: Command) -> bool {
        self.0 & command.bit() != 0
    }

    /// Add a command.
    #[inline]
    pub fn insert(&mut self, command: Command) {
        self.0 |= command.bit();
    }

    /// Remove a command.
    #[inline]
    pub fn remove(&mut self, command: Command) {
        self.0 &= !command.bit();
    }

    /// True when no command is present.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// INPUT FRAME
// =============================================================================

/// One character's input for one frame.
///
/// A command that is `pressed` this frame is also `held` this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputFrame {
    /// Commands that went down this frame
    pub pressed: CommandSet,
    /// Commands currently down
    pub held: CommandSet,
    /// Commands that went up this frame
    pub released: CommandSet,
}

impl InputFrame {
    /// Create an empty input frame.
    pub const fn new() -> Self {
        Self {
            pressed: CommandSet::EMPTY,
            held: CommandSet::EMPTY,
            released: CommandSet::EMPTY,
        }
    }

    /// Derive edges from the previous and current held sets.
    pub fn from_transition(previous: CommandSet, current: CommandSet) -> Self {
        Self {
            pressed: CommandSet(current.0 & !previous.0),
            held: current,
            released: CommandSet(previous.0 & !current.0),
        }
    }

    /// Input with the given commands held (no edges).
    pub fn holding(commands: &[Command]) -> Self {
        Self {
            held: CommandSet::of(commands),
            ..Self::new()
        }
    }

    /// Add a press of `command` (also marks it held).
    pub fn press(mut self, command: Command) -> Self {
        self.pressed.insert(command);
        self.held.insert(command);
        self
    }

    /// Was `command` pressed this frame?
    #[inline]
    pub fn is_pressed(&self, command: Command) -> bool {
        self.pressed.contains(command)
    }

    /// Is `command` down this frame?
    #[inline]
    pub fn is_held(&self, command: Command) -> bool {
        self.held.contains(command)
    }

    /// Was `command` released this frame?
    #[inline]
    pub fn is_released(&self, command: Command) -> bool {
        self.released.contains(command)
    }

    /// Horizontal direction: -1 left, +1 right, 0 for none or both.
    #[inline]
    pub fn horizontal(&self) -> i32 {
        let left = self.is_held(Command::MoveLeft) as i32;
        let right = self.is_held(Command::MoveRight) as i32;
        right - left
    }

    /// Is the run modifier down?
    #[inline]
    pub fn running(&self) -> bool {
        self.is_held(Command::RunModifier)
    }

    /// Check if this is an idle frame (no input at all).
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.pressed.is_empty() && self.held.is_empty() && self.released.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_bits_unique() {
        let mut seen = 0u16;
        for c in Command::ALL {
            assert_eq!(seen & c.bit(), 0, "{:?} overlaps", c);
            seen |= c.bit();
        }
        assert_eq!(seen, CommandSet::MASK);
    }

    #[test]
    fn test_from_bits_drops_unknown() {
        let set = CommandSet::from_bits(0xFFFF);
        assert_eq!(set.0, CommandSet::MASK);
    }

    #[test]
    fn test_transition_edges() {
        let prev = CommandSet::of(&[Command::MoveLeft, Command::Block]);
        let now = CommandSet::of(&[Command::MoveLeft, Command::Jump]);
        let frame = InputFrame::from_transition(prev, now);

        assert!(frame.is_pressed(Command::Jump));
        assert!(!frame.is_pressed(Command::MoveLeft));
        assert!(frame.is_held(Command::MoveLeft));
        assert!(frame.is_released(Command::Block));
        assert!(!frame.is_held(Command::Block));
    }

    #[test]
    fn test_press_implies_held() {
        let frame = InputFrame::new().press(Command::Light);
        assert!(frame.is_pressed(Command::Light));
        assert!(frame.is_held(Command::Light));
        assert!(!frame.is_idle());
    }

    #[test]
    fn test_horizontal() {
        assert_eq!(InputFrame::new().horizontal(), 0);
        assert_eq!(InputFrame::holding(&[Command::MoveLeft]).horizontal(), -1);
        assert_eq!(InputFrame::holding(&[Command::MoveRight]).horizontal(), 1);
        assert_eq!(
            InputFrame::holding(&[Command::MoveLeft, Command::MoveRight]).horizontal(),
            0
        );
    }

    #[test]
    fn test_set_insert_remove() {
        let mut set = CommandSet::EMPTY;
        set.insert(Command::Crouch);
        assert!(set.contains(Command::Crouch));
        set.remove(Command::Crouch);
        assert!(set.is_empty());
    }
}
