// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Lightweight genomic intervals. All coordinates are 1-based and inclusive.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use derive_new::new;
use lazy_static::lazy_static;
use regex::Regex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::strand::Strand;

pub type Position = u64;
pub type Length = u64;

/// The `(seq_id, start, end, strand?)` view shared by variants and regions.
pub trait AbstractInterval {
    /// Identifier for a genomic contig, e.g., a chromosome
    fn contig(&self) -> &str;
    /// First position on the contig (1-based, inclusive)
    fn start(&self) -> Position;
    /// Last position on the contig (1-based, inclusive)
    fn end(&self) -> Position;
    /// Strand of the interval, `Unknown` unless overridden
    fn strand(&self) -> Strand {
        Strand::Unknown
    }

    /// Number of positions covered.
    fn length(&self) -> Length {
        self.end() - self.start() + 1
    }

    /// Whether `pos` lies on the closed interval.
    fn contains(&self, pos: Position) -> bool {
        self.start() <= pos && pos <= self.end()
    }

    /// Same contig and intersecting closed intervals. Strand is ignored.
    fn intersects<I: AbstractInterval + ?Sized>(&self, other: &I) -> bool
    where
        Self: Sized,
    {
        self.contig() == other.contig()
            && self.start() <= other.end()
            && other.start() <= self.end()
    }
}

/// Owned interval on a named contig.
///
/// The display format is _chr:start-end(+/-)_, both boundaries 1-based
/// and inclusive; unknown strands print no suffix.
///
/// ```
/// # use seq_region::error::ParseError;
/// # fn try_main() -> Result<(), ParseError> {
/// use seq_region::genome::{AbstractInterval, Interval};
/// use seq_region::strand::Strand;
/// let exon = "chrX:6227974-6228097(-)".parse::<Interval>()?;
/// assert_eq!(exon.strand(), Strand::Reverse);
/// assert_eq!(exon.length(), 124);
/// assert_eq!(exon.to_string(), "chrX:6227974-6228097(-)");
/// # Ok(())
/// # }
/// # fn main() { try_main().unwrap(); }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(new, Debug, PartialEq, Eq, Clone, Hash)]
pub struct Interval {
    contig: String,
    start: Position,
    end: Position,
    strand: Strand,
}

impl AbstractInterval for Interval {
    fn contig(&self) -> &str {
        &self.contig
    }

    fn start(&self) -> Position {
        self.start
    }

    fn end(&self) -> Position {
        self.end
    }

    fn strand(&self) -> Strand {
        self.strand
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}{}", self.contig, self.start, self.end, self.strand)
    }
}

impl FromStr for Interval {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref INTERVAL_RE: Regex =
                Regex::new(r"^(.+):(\d+)-(\d+)(\([+\-.]\))?$").unwrap();
        }

        let cap = INTERVAL_RE
            .captures(s)
            .ok_or_else(|| ParseError::BadInterval(s.to_owned()))?;

        let start = cap[2].parse::<Position>()?;
        let end = cap[3].parse::<Position>()?;
        let strand = cap.get(4).map_or("", |m| m.as_str()).parse::<Strand>()?;

        if start == 0 {
            Err(ParseError::BadInterval(s.to_owned()))
        } else if end < start {
            Err(ParseError::EndBeforeStart)
        } else {
            Ok(Interval::new(cap[1].to_owned(), start, end, strand))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_unstranded() {
        let iv: Interval = "chr1:10-20".parse().unwrap();
        assert_eq!(iv, Interval::new("chr1".to_owned(), 10, 20, Strand::Unknown));
        assert_eq!(iv.to_string(), "chr1:10-20");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "chr1:20-10(+)".parse::<Interval>(),
            Err(ParseError::EndBeforeStart)
        );
        assert!("chr1:0-10".parse::<Interval>().is_err());
        assert!("chr1-10-20".parse::<Interval>().is_err());
    }

    #[test]
    fn intersection() {
        let a = Interval::new("chr1".to_owned(), 10, 20, Strand::Forward);
        let b = Interval::new("chr1".to_owned(), 20, 30, Strand::Reverse);
        let c = Interval::new("chr2".to_owned(), 10, 20, Strand::Forward);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(a.contains(20));
        assert!(!a.contains(21));
    }
}
