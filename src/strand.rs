// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Data types for strand information on regions.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Strand information.
///
/// `Unknown` marks pure coordinate regions that are never
/// reverse-complemented; they are treated like `Forward` for ordering and
/// coordinate arithmetic.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strand {
    Forward,
    Reverse,
    #[default]
    Unknown,
}

impl Strand {
    /// Returns a `Strand` enum representing the given char.
    ///
    /// The mapping is as follows:
    ///     * '+', 'f', or 'F' becomes `Strand::Forward`
    ///     * '-', 'r', or 'R' becomes `Strand::Reverse`
    ///     * '.', '?' becomes `Strand::Unknown`
    ///     * Any other inputs will return an `Err(StrandError::InvalidChar)`
    pub fn from_char(strand_char: &char) -> Result<Strand, StrandError> {
        match *strand_char {
            '+' | 'f' | 'F' => Ok(Strand::Forward),
            '-' | 'r' | 'R' => Ok(Strand::Reverse),
            '.' | '?' => Ok(Strand::Unknown),
            invalid => Err(StrandError::InvalidChar(invalid)),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Strand::Unknown)
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self, Strand::Reverse)
    }

    /// Two strands are compatible when they are equal or either is unknown.
    ///
    /// ```
    /// use seq_region::strand::Strand;
    /// assert!(Strand::Forward.is_compatible(&Strand::Unknown));
    /// assert!(!Strand::Forward.is_compatible(&Strand::Reverse));
    /// ```
    pub fn is_compatible(&self, other: &Strand) -> bool {
        self.is_unknown() || other.is_unknown() || self == other
    }

    /// Symbol denoting the strand. By convention, in BED and GFF
    /// files, the forward strand is `+`, the reverse strand is `-`,
    /// and unknown or unspecified strands are `.`.
    pub fn strand_symbol(&self) -> &str {
        match *self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
            Strand::Unknown => ".",
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Strand::Unknown => Ok(()),
            _ => write!(f, "({})", self.strand_symbol()),
        }
    }
}

impl FromStr for Strand {
    type Err = StrandError;

    /// Parses `+`, `-`, `.`, or the parenthesised display form `(+)`.
    /// An empty string is an unknown strand.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or(s);
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Ok(Strand::Unknown),
            (Some(c), None) => Strand::from_char(&c),
            _ => Err(StrandError::InvalidString(s.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrandError {
    #[error("character {0:?} can not be converted to a Strand")]
    InvalidChar(char),
    #[error("string {0:?} can not be converted to a Strand")]
    InvalidString(String),
}
