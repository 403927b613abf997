// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Error types shared by all regions, codecs and providers.

use thiserror::Error;

use crate::genome::Position;
use crate::strand::StrandError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors raised while building regions, embedding variants or translating.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid positions {seq_id}:{start}-{end}")]
    InvalidPositions {
        seq_id: String,
        start: Position,
        end: Position,
    },
    #[error("invalid variant {id}: {reason}")]
    InvalidVariant { id: String, reason: String },
    #[error("invalid frame {0}, expected 0, 1 or 2")]
    InvalidFrame(u8),
    #[error("inconsistent region parts: {0}")]
    InconsistentParts(String),
    #[error("part {part} with frame {frame} does not continue the reading frame")]
    FrameNotTriplet { part: usize, frame: u8 },
    #[error("position {pos} outside of {start}-{end}")]
    OutOfRange {
        pos: i64,
        start: Position,
        end: Position,
    },
    #[error("position {0} is located between region parts")]
    InIntron(Position),
    #[error("variants {0} and {1} overlap")]
    OverlappingVariants(String, String),
    #[error("variant {variant} does not overlap {region}")]
    VariantOutOfRegion { variant: String, region: String },
    #[error("variant {0} changes length and only partially overlaps the region")]
    PartialIndelNotSupported(String),
    #[error("reference of variant {variant} is {expected}, region has {found}")]
    ReferenceMismatch {
        variant: String,
        expected: String,
        found: String,
    },
    #[error("cached sequence has length {found}, region spans {expected}")]
    SequenceLength { expected: u64, found: u64 },
    #[error("no open reading frame found")]
    OrfNotFound,
    #[error("forced start codon {0} is not a start codon")]
    InvalidForcedStart(String),
    #[error("open reading frame invalidated: {0}")]
    InvalidatedOrf(String),
    #[error("translation invalidated")]
    InvalidatedTranslation(#[source] Box<Error>),
    #[error("invalid codon {0}")]
    InvalidCodon(String),
    #[error("reference {seq_id} unavailable: {msg}")]
    ReferenceUnavailable { seq_id: String, msg: String },
    #[error("{0} not found")]
    NotFound(String),
    #[error("{0} unreachable")]
    Unreachable(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Errors that arise in parsing textual intervals and variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed interval {0:?}")]
    BadInterval(String),
    #[error("malformed variant {0:?}")]
    BadVariant(String),
    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),
    #[error(transparent)]
    ParseStrand(#[from] StrandError),
    #[error("ending position < starting position")]
    EndBeforeStart,
}

impl Error {
    /// Whether this error, or the error it wraps, reports an invalidated ORF.
    pub fn is_invalidated_orf(&self) -> bool {
        match self {
            Error::InvalidatedOrf(_) => true,
            Error::InvalidatedTranslation(inner) => inner.is_invalidated_orf(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn invalidated_translation_wraps_orf() {
        let err = Error::InvalidatedTranslation(Box::new(Error::InvalidatedOrf(
            "stop codon lost".to_owned(),
        )));
        assert!(err.is_invalidated_orf());
        let source = err.source().expect("wrapped error");
        assert_eq!(
            source.to_string(),
            "open reading frame invalidated: stop codon lost"
        );
    }

    #[test]
    fn parse_error_converts() {
        let err: Error = ParseError::EndBeforeStart.into();
        assert!(matches!(err, Error::Parse(ParseError::EndBeforeStart)));
    }
}
