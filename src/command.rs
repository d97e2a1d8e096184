//! Command alphabet shared with the car firmware.
//!
//! Two firmware variants are in the field. The WeMos build takes `F B L R`
//! as fixed steps (about 15 cm, or a 90° turn) that stop on their own; the
//! continuous build drives with `W S A D` until it gets an `X`. Both take
//! `U J O C` for the arm and gripper and a single digit for speed. The
//! table makes the variant a configuration value instead of a second
//! controller.

use serde::Deserialize;

/// Logical actions the car understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Stop,
    ArmUp,
    ArmDown,
    GripperOpen,
    GripperClose,
}

/// Firmware command-table variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandVariant {
    /// WeMos firmware: F/B/L/R move a fixed step and stop on their own.
    #[default]
    Wemos,
    /// Continuous firmware: W/S/A/D keep the motors running until X.
    Wasd,
}

/// Mapping from logical action to wire character, plus the alphabet the
/// firmware accepts.
#[derive(Debug, Clone)]
pub struct CommandTable {
    variant: CommandVariant,
    alphabet: &'static str,
}

impl CommandTable {
    pub fn for_variant(variant: CommandVariant) -> Self {
        match variant {
            CommandVariant::Wemos => Self::wemos(),
            CommandVariant::Wasd => Self::wasd(),
        }
    }

    pub fn wemos() -> Self {
        Self {
            variant: CommandVariant::Wemos,
            alphabet: "FBLRXUJOC0123456789",
        }
    }

    pub fn wasd() -> Self {
        Self {
            variant: CommandVariant::Wasd,
            alphabet: "WSADXFLRUJOC0123456789",
        }
    }

    pub fn variant(&self) -> CommandVariant {
        self.variant
    }

    /// Wire character for a logical action.
    pub fn char_for(&self, action: Action) -> char {
        match (self.variant, action) {
            (CommandVariant::Wemos, Action::Forward) => 'F',
            (CommandVariant::Wemos, Action::Backward) => 'B',
            (CommandVariant::Wemos, Action::TurnLeft) => 'L',
            (CommandVariant::Wemos, Action::TurnRight) => 'R',
            (CommandVariant::Wasd, Action::Forward) => 'W',
            (CommandVariant::Wasd, Action::Backward) => 'S',
            (CommandVariant::Wasd, Action::TurnLeft) => 'A',
            (CommandVariant::Wasd, Action::TurnRight) => 'D',
            (_, Action::Stop) => 'X',
            (_, Action::ArmUp) => 'U',
            (_, Action::ArmDown) => 'J',
            (_, Action::GripperOpen) => 'O',
            (_, Action::GripperClose) => 'C',
        }
    }

    /// Whether the firmware accepts this character (uppercase expected).
    pub fn accepts(&self, command: char) -> bool {
        self.alphabet.contains(command)
    }

    /// Printable help for the operator prompt.
    pub fn legend(&self) -> &'static str {
        match self.variant {
            CommandVariant::Wemos => {
                "Commands: F B L R X | U J O C | 0-9 | Q quit\n\
                 \x20 F=forward 15cm  B=backward 15cm  L=turn 90 left  R=turn 90 right  X=stop\n\
                 \x20 U=arm up  J=arm down  O=gripper open  C=gripper close\n\
                 \x20 0-9 = speed level"
            }
            CommandVariant::Wasd => {
                "Commands: W S A D X | F L R | U J O C | 0-9 | Q quit\n\
                 \x20 W/S/A/D=drive (continuous)  X=stop  F=step forward  L/R=turn 90\n\
                 \x20 U=arm up  J=arm down  O=gripper open  C=gripper close\n\
                 \x20 0-9 = speed level"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wemos_mapping() {
        let table = CommandTable::wemos();
        assert_eq!(table.char_for(Action::Forward), 'F');
        assert_eq!(table.char_for(Action::Backward), 'B');
        assert_eq!(table.char_for(Action::TurnLeft), 'L');
        assert_eq!(table.char_for(Action::TurnRight), 'R');
        assert_eq!(table.char_for(Action::Stop), 'X');
        assert_eq!(table.char_for(Action::GripperClose), 'C');
    }

    #[test]
    fn wasd_mapping() {
        let table = CommandTable::wasd();
        assert_eq!(table.char_for(Action::Forward), 'W');
        assert_eq!(table.char_for(Action::Backward), 'S');
        assert_eq!(table.char_for(Action::TurnLeft), 'A');
        assert_eq!(table.char_for(Action::TurnRight), 'D');
        // Arm and gripper are shared between variants.
        assert_eq!(table.char_for(Action::ArmUp), 'U');
        assert_eq!(table.char_for(Action::Stop), 'X');
    }

    #[test]
    fn alphabet_membership() {
        let table = CommandTable::wemos();
        for c in "FBLRXUJOC0123456789".chars() {
            assert!(table.accepts(c), "expected '{}' to be accepted", c);
        }
        assert!(!table.accepts('W'));
        assert!(!table.accepts('Z'));
        assert!(!table.accepts('f'));

        let table = CommandTable::wasd();
        assert!(table.accepts('W'));
        assert!(table.accepts('F'));
        assert!(!table.accepts('B'));
    }
}
