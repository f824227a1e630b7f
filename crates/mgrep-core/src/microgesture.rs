//! Microgesture vocabulary.
//!
//! A layer of a chart is classified by the microgesture it illustrates and a
//! characteristic of that gesture. The valid pairs form a fixed table:
//!
//! | microgesture | characteristics      |
//! |--------------|----------------------|
//! | `tap`        | `tip`, `middle`, `base` |
//! | `swipe`      | `up`, `down`         |
//! | `flex`       | `up`, `down`         |

use std::{fmt, str::FromStr};

use thiserror::Error;

/// Errors raised while reading a classification.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassificationError {
    #[error("expected a value of the form `<microgesture>,<characteristic>`, got `{0}`")]
    Format(String),

    #[error("unknown microgesture `{0}`, expected one of tap, swipe, flex")]
    UnknownMicrogesture(String),

    #[error("unknown characteristic `{0}`")]
    UnknownCharacteristic(String),

    #[error("characteristic `{characteristic}` does not apply to `{microgesture}`, expected one of {expected}")]
    Mismatch {
        microgesture: Microgesture,
        characteristic: Characteristic,
        expected: String,
    },
}

/// A hand microgesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Microgesture {
    Tap,
    Swipe,
    Flex,
}

impl Microgesture {
    pub const ALL: [Self; 3] = [Self::Tap, Self::Swipe, Self::Flex];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Swipe => "swipe",
            Self::Flex => "flex",
        }
    }

    /// Characteristics valid for this microgesture, in table order.
    pub fn characteristics(self) -> &'static [Characteristic] {
        match self {
            Self::Tap => &[
                Characteristic::Tip,
                Characteristic::Middle,
                Characteristic::Base,
            ],
            Self::Swipe | Self::Flex => &[Characteristic::Up, Characteristic::Down],
        }
    }
}

impl FromStr for Microgesture {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mg| mg.as_str() == s)
            .ok_or_else(|| ClassificationError::UnknownMicrogesture(s.to_string()))
    }
}

impl fmt::Display for Microgesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A characteristic refining a microgesture: where a tap lands, or which way a
/// swipe or flex goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Characteristic {
    Tip,
    Middle,
    Base,
    Up,
    Down,
}

impl Characteristic {
    pub const ALL: [Self; 5] = [Self::Tip, Self::Middle, Self::Base, Self::Up, Self::Down];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tip => "tip",
            Self::Middle => "middle",
            Self::Base => "base",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl FromStr for Characteristic {
    type Err = ClassificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|charac| charac.as_str() == s)
            .ok_or_else(|| ClassificationError::UnknownCharacteristic(s.to_string()))
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated `(microgesture, characteristic)` pair.
///
/// # Examples
///
/// ```
/// # use mgrep_core::microgesture::{Characteristic, Classification, Microgesture};
/// let class = Classification::parse_attribute(" swipe , up ").unwrap();
/// assert_eq!(class.microgesture(), Microgesture::Swipe);
/// assert_eq!(class.characteristic(), Characteristic::Up);
/// assert_eq!(class.to_string(), "swipe_up");
///
/// assert!(Classification::parse_attribute("tap,up").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Classification {
    microgesture: Microgesture,
    characteristic: Characteristic,
}

impl Classification {
    /// Builds a classification, checking the pair against the table.
    pub fn new(
        microgesture: Microgesture,
        characteristic: Characteristic,
    ) -> Result<Self, ClassificationError> {
        if !microgesture.characteristics().contains(&characteristic) {
            let expected = microgesture
                .characteristics()
                .iter()
                .map(|c| c.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ClassificationError::Mismatch {
                microgesture,
                characteristic,
                expected,
            });
        }
        Ok(Self {
            microgesture,
            characteristic,
        })
    }

    pub fn microgesture(self) -> Microgesture {
        self.microgesture
    }

    pub fn characteristic(self) -> Characteristic {
        self.characteristic
    }

    /// Parses a layer attribute value of the form `tap,tip`.
    ///
    /// Spaces anywhere in the value are ignored.
    pub fn parse_attribute(value: &str) -> Result<Self, ClassificationError> {
        Self::split_pair(value, ',')
    }

    /// Parses a mapping-file key of the form `tap_tip`.
    pub fn from_token(token: &str) -> Result<Self, ClassificationError> {
        Self::split_pair(token, '_')
    }

    /// Every valid classification in table order.
    pub fn all() -> impl Iterator<Item = Self> {
        Microgesture::ALL.into_iter().flat_map(|microgesture| {
            microgesture
                .characteristics()
                .iter()
                .map(move |&characteristic| Self {
                    microgesture,
                    characteristic,
                })
        })
    }

    fn split_pair(value: &str, separator: char) -> Result<Self, ClassificationError> {
        let compact: String = value.chars().filter(|c| *c != ' ').collect();
        let parts: Vec<&str> = compact.split(separator).collect();
        let [microgesture, characteristic] = parts.as_slice() else {
            return Err(ClassificationError::Format(value.to_string()));
        };
        Self::new(microgesture.parse()?, characteristic.parse()?)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.microgesture, self.characteristic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_attribute_valid() {
        let class = Classification::parse_attribute("tap,tip").unwrap();
        assert_eq!(class.microgesture(), Microgesture::Tap);
        assert_eq!(class.characteristic(), Characteristic::Tip);
    }

    #[test]
    fn test_parse_attribute_unknown_microgesture() {
        assert_eq!(
            Classification::parse_attribute("bogus,tip"),
            Err(ClassificationError::UnknownMicrogesture("bogus".to_string()))
        );
    }

    #[test]
    fn test_parse_attribute_missing_characteristic() {
        assert_eq!(
            Classification::parse_attribute("tap"),
            Err(ClassificationError::Format("tap".to_string()))
        );
        assert!(Classification::parse_attribute("tap,tip,up").is_err());
    }

    #[test]
    fn test_attribute_and_token_forms_differ() {
        assert!(Classification::parse_attribute("tap_tip").is_err());
        assert!(Classification::from_token("tap,tip").is_err());
        assert_eq!(
            Classification::parse_attribute("tap,tip"),
            Classification::from_token("tap_tip")
        );
    }

    #[test]
    fn test_parse_attribute_mismatch() {
        let err = Classification::parse_attribute("flex,tip").unwrap_err();
        assert!(matches!(
            err,
            ClassificationError::Mismatch {
                microgesture: Microgesture::Flex,
                characteristic: Characteristic::Tip,
                ..
            }
        ));
        assert!(err.to_string().contains("up, down"));
    }

    #[test]
    fn test_from_token() {
        let class = Classification::from_token("swipe_down").unwrap();
        assert_eq!(class.to_string(), "swipe_down");
        assert!(Classification::from_token("swipe-down").is_err());
    }

    #[test]
    fn test_all_in_table_order() {
        let all: Vec<String> = Classification::all().map(|c| c.to_string()).collect();
        assert_eq!(
            all,
            [
                "tap_tip",
                "tap_middle",
                "tap_base",
                "swipe_up",
                "swipe_down",
                "flex_up",
                "flex_down",
            ]
        );
    }
}
