//! Command vocabulary.
//!
//! Charts bind microgestures to abstract commands. The commands are neutral
//! fruit names so that no mapping carries a prior meaning.

use std::{fmt, str::FromStr};

use thiserror::Error;

/// The command names, in reference order.
pub const COMMANDS: [&str; 7] = [
    "banana",
    "pineapple",
    "cherry",
    "kiwi",
    "blackberry",
    "plum",
    "watermelon",
];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command `{0}`")]
pub struct UnknownCommand(pub String);

/// A command name from [`COMMANDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Command(&'static str);

impl Command {
    pub const BANANA: Self = Self("banana");
    pub const PINEAPPLE: Self = Self("pineapple");
    pub const CHERRY: Self = Self("cherry");
    pub const KIWI: Self = Self("kiwi");
    pub const BLACKBERRY: Self = Self("blackberry");
    pub const PLUM: Self = Self("plum");
    pub const WATERMELON: Self = Self("watermelon");

    /// Every command, in reference order.
    pub fn all() -> impl Iterator<Item = Self> {
        COMMANDS.into_iter().map(Self)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }
}

impl FromStr for Command {
    type Err = UnknownCommand;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        COMMANDS
            .into_iter()
            .find(|name| *name == s.trim())
            .map(Self)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_command() {
        let kiwi: Command = "kiwi".parse().unwrap();
        assert_eq!(kiwi.as_str(), "kiwi");
        assert_eq!(kiwi.to_string(), "kiwi");
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            "mango".parse::<Command>(),
            Err(UnknownCommand("mango".to_string()))
        );
    }

    #[test]
    fn test_named_commands_are_known() {
        assert_eq!("plum".parse::<Command>(), Ok(Command::PLUM));
        assert_eq!(Command::WATERMELON.as_str(), COMMANDS[6]);
    }

    #[test]
    fn test_all_in_reference_order() {
        let names: Vec<&str> = Command::all().map(Command::as_str).collect();
        assert_eq!(names, COMMANDS);
    }
}
