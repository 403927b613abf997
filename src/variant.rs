// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Genomic variants: immutable edit records on the plus strand of a
//! reference sequence.
//!
//! Coordinates are 1-based and inclusive. An insertion is given by its two
//! flanking bases, so `end == start + 1` and `ref_seq` is empty.

use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::error::{Error, ParseError, Result};
use crate::genome::{AbstractInterval, Position};

/// Possible variant kinds, a pure function of the allele lengths.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum VariantKind {
    Substitution,
    Insertion,
    Deletion,
    Indel,
}

impl VariantKind {
    /// Classify a `ref_seq`/`alt_seq` pair. Both empty is not a variant.
    pub fn classify(ref_seq: &str, alt_seq: &str) -> Option<VariantKind> {
        match (ref_seq.len(), alt_seq.len()) {
            (0, 0) => None,
            (0, _) => Some(VariantKind::Insertion),
            (_, 0) => Some(VariantKind::Deletion),
            (r, a) if r == a => Some(VariantKind::Substitution),
            _ => Some(VariantKind::Indel),
        }
    }
}

/// A genomic edit.
///
/// ```
/// # use seq_region::error::Error;
/// # fn try_main() -> Result<(), Error> {
/// use seq_region::variant::{Variant, VariantKind};
/// let snv = Variant::new("rs1", "chrX", 5109543, 5109543, "G", "A")?;
/// assert_eq!(snv.kind(), VariantKind::Substitution);
/// let ins: Variant = "chrX:6228001_6228002insA".parse()?;
/// assert_eq!(ins.kind(), VariantKind::Insertion);
/// assert_eq!(ins.id(), "chrX:6228001_6228002insA");
/// # Ok(())
/// # }
/// # fn main() { try_main().unwrap(); }
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    id: String,
    seq_id: String,
    start: Position,
    end: Position,
    ref_seq: String,
    alt_seq: String,
    kind: VariantKind,
}

/// The part of a variant that falls on an interval, with the number of
/// variant bases hanging over each side (in genomic orientation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    pub start: Position,
    pub end: Position,
    pub start_overhang: u64,
    pub end_overhang: u64,
}

impl Clip {
    pub fn is_partial(&self) -> bool {
        self.start_overhang > 0 || self.end_overhang > 0
    }
}

impl Variant {
    /// Construct a validated variant.
    pub fn new(
        id: impl Into<String>,
        seq_id: impl Into<String>,
        start: Position,
        end: Position,
        ref_seq: impl Into<String>,
        alt_seq: impl Into<String>,
    ) -> Result<Self> {
        let id = id.into();
        let ref_seq = ref_seq.into();
        let alt_seq = alt_seq.into();
        let invalid = |reason: String| Error::InvalidVariant {
            id: id.clone(),
            reason,
        };

        let kind = VariantKind::classify(&ref_seq, &alt_seq)
            .ok_or_else(|| invalid("empty reference and alternative alleles".to_owned()))?;
        if !ref_seq
            .bytes()
            .chain(alt_seq.bytes())
            .all(|b| b.is_ascii_alphabetic())
        {
            return Err(invalid("alleles must be nucleotide letters".to_owned()));
        }
        if start == 0 || end < start {
            return Err(invalid(format!("bad coordinates {start}-{end}")));
        }
        match kind {
            VariantKind::Insertion if end != start + 1 => {
                return Err(invalid(format!(
                    "insertion flanks {start}_{end} are not adjacent"
                )));
            }
            VariantKind::Insertion => {}
            _ if end - start + 1 != ref_seq.len() as u64 => {
                return Err(invalid(format!(
                    "reference allele of length {} does not span {start}-{end}",
                    ref_seq.len()
                )));
            }
            _ => {}
        }

        Ok(Variant {
            id,
            seq_id: seq_id.into(),
            start,
            end,
            ref_seq,
            alt_seq,
            kind,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seq_id(&self) -> &str {
        &self.seq_id
    }

    pub fn ref_seq(&self) -> &str {
        &self.ref_seq
    }

    pub fn alt_seq(&self) -> &str {
        &self.alt_seq
    }

    pub fn kind(&self) -> VariantKind {
        self.kind
    }

    pub fn is_insertion(&self) -> bool {
        self.kind == VariantKind::Insertion
    }

    /// Change in sequence length caused by the variant.
    pub fn length_delta(&self) -> i64 {
        self.alt_seq.len() as i64 - self.ref_seq.len() as i64
    }

    /// Overlap between two variants.
    ///
    /// Closed intervals must intersect, except that an insertion only
    /// overlaps another variant when both of its flanking bases fall within
    /// the other's interval. Two insertions overlap only at the same site.
    pub fn overlaps(&self, other: &Variant) -> bool {
        if self.seq_id != other.seq_id {
            return false;
        }
        match (self.is_insertion(), other.is_insertion()) {
            (true, true) => self.start == other.start && self.end == other.end,
            (true, false) => other.start <= self.start && self.end <= other.end,
            (false, true) => self.start <= other.start && other.end <= self.end,
            (false, false) => self.start <= other.end && other.start <= self.end,
        }
    }

    /// Overlap with a region interval. Insertions need both flanks inside.
    pub fn overlaps_interval<I: AbstractInterval + ?Sized>(&self, interval: &I) -> bool {
        if self.seq_id != interval.contig() {
            return false;
        }
        if self.is_insertion() {
            interval.start() <= self.start && self.end <= interval.end()
        } else {
            self.start <= interval.end() && interval.start() <= self.end
        }
    }

    /// Clip the variant to an interval, or `None` if they do not overlap.
    pub fn clip_to<I: AbstractInterval + ?Sized>(&self, interval: &I) -> Option<Clip> {
        if !self.overlaps_interval(interval) {
            return None;
        }
        if self.is_insertion() {
            return Some(Clip {
                start: self.start,
                end: self.end,
                start_overhang: 0,
                end_overhang: 0,
            });
        }
        let start = self.start.max(interval.start());
        let end = self.end.min(interval.end());
        Some(Clip {
            start,
            end,
            start_overhang: start - self.start,
            end_overhang: self.end - end,
        })
    }
}

impl AbstractInterval for Variant {
    fn contig(&self) -> &str {
        &self.seq_id
    }

    fn start(&self) -> Position {
        self.start
    }

    fn end(&self) -> Position {
        self.end
    }
}

/// Fail with `OverlappingVariants` on the first overlapping pair.
pub fn ensure_disjoint<'a, I>(variants: I) -> Result<()>
where
    I: IntoIterator<Item = &'a Variant>,
{
    let variants: Vec<&Variant> = variants.into_iter().collect();
    for (i, a) in variants.iter().enumerate() {
        for b in &variants[i + 1..] {
            if a.overlaps(b) {
                return Err(Error::OverlappingVariants(a.id.clone(), b.id.clone()));
            }
        }
    }
    Ok(())
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.seq_id, self.start)?;
        if self.end != self.start {
            write!(f, "_{}", self.end)?;
        }
        match self.kind {
            VariantKind::Substitution => write!(f, "{}>{}", self.ref_seq, self.alt_seq),
            VariantKind::Insertion => write!(f, "ins{}", self.alt_seq),
            VariantKind::Deletion => write!(f, "del{}", self.ref_seq),
            VariantKind::Indel => write!(f, "del{}ins{}", self.ref_seq, self.alt_seq),
        }
    }
}

impl FromStr for Variant {
    type Err = Error;

    /// Parse the compact genomic notation, e.g. `chrX:5109543G>A`,
    /// `chrX:6228001_6228002insA`, `chr1:100_102delCTG` or
    /// `chr1:100_101delCTinsG`. The variant id is the input string.
    fn from_str(s: &str) -> Result<Self> {
        lazy_static! {
            static ref VARIANT_RE: Regex = Regex::new(
                r"^(.+?):(\d+)(?:_(\d+))?(?:([ACGTUNacgtun]+)>([ACGTUNacgtun]+)|del([ACGTUNacgtun]+)(?:ins([ACGTUNacgtun]+))?|ins([ACGTUNacgtun]+))$"
            )
            .unwrap();
        }

        let bad = || Error::Parse(ParseError::BadVariant(s.to_owned()));
        let cap = VARIANT_RE.captures(s).ok_or_else(bad)?;
        let start = cap[2]
            .parse::<Position>()
            .map_err(|e| Error::Parse(e.into()))?;
        let end = match cap.get(3) {
            Some(m) => Some(
                m.as_str()
                    .parse::<Position>()
                    .map_err(|e| Error::Parse(e.into()))?,
            ),
            None => None,
        };
        let group = |i: usize| cap.get(i).map_or("", |m| m.as_str());

        let (ref_seq, alt_seq) = if cap.get(4).is_some() {
            (group(4), group(5))
        } else if cap.get(6).is_some() {
            (group(6), group(7))
        } else {
            ("", group(8))
        };
        let end = match end {
            Some(end) => end,
            None if ref_seq.is_empty() => return Err(bad()),
            None => start + ref_seq.len() as u64 - 1,
        };

        Variant::new(s, &cap[1], start, end, ref_seq, alt_seq)
    }
}

/// Lookup of variants by identifier.
pub trait VariantProvider {
    /// Resolve a single identifier. Fails with `NotFound` or `Unreachable`.
    fn lookup(&self, variant_id: &str) -> Result<Variant>;

    /// Resolve several identifiers, failing on the first error.
    fn lookup_all(&self, variant_ids: &[&str]) -> Result<Vec<Variant>> {
        variant_ids.iter().map(|id| self.lookup(id)).collect()
    }
}

/// In-memory `VariantProvider` keyed by variant id.
#[derive(Debug, Clone, Default)]
pub struct VariantTable {
    variants: HashMap<String, Variant>,
}

impl VariantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, variant: Variant) -> Option<Variant> {
        self.variants.insert(variant.id.clone(), variant)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

impl FromIterator<Variant> for VariantTable {
    fn from_iter<T: IntoIterator<Item = Variant>>(iter: T) -> Self {
        let mut table = VariantTable::new();
        for variant in iter {
            table.insert(variant);
        }
        table
    }
}

impl VariantProvider for VariantTable {
    fn lookup(&self, variant_id: &str) -> Result<Variant> {
        self.variants
            .get(variant_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("variant {variant_id}")))
    }
}
