//! Dispute identifiers and rulings.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a dispute, assigned monotonically starting at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DisputeId(u64);

impl DisputeId {
    pub const FIRST: Self = Self(1);

    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The identifier assigned to the next dispute.
    pub fn next(self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }

    pub fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for DisputeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The ruling of a dispute.
///
/// Jurors can only vote for one of the two options; `Undecided` is the
/// result of a tie (including nobody revealing) and the value before
/// finalization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Ruling {
    #[default]
    Undecided,
    OptionA,
    OptionB,
}

impl Ruling {
    /// Wire value of [`Ruling::OptionA`].
    pub const CHOICE_A: u8 = 1;
    /// Wire value of [`Ruling::OptionB`].
    pub const CHOICE_B: u8 = 2;

    /// Decode a submitted vote value. Only the two options are valid votes.
    pub fn from_choice(choice: u8) -> Option<Self> {
        match choice {
            Self::CHOICE_A => Some(Self::OptionA),
            Self::CHOICE_B => Some(Self::OptionB),
            _ => None,
        }
    }

    /// The wire value of this ruling (`0` for `Undecided`).
    pub fn as_choice(&self) -> u8 {
        match self {
            Self::Undecided => 0,
            Self::OptionA => Self::CHOICE_A,
            Self::OptionB => Self::CHOICE_B,
        }
    }

    pub fn is_decided(&self) -> bool {
        !matches!(self, Self::Undecided)
    }
}

impl fmt::Display for Ruling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Undecided => "undecided",
            Self::OptionA => "option-a",
            Self::OptionB => "option-b",
        };
        f.write_str(s)
    }
}
