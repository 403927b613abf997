// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Contiguous stranded regions of a reference sequence.

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, OnceLock};

use super::embed::{inframe_bounds, trim_in_frame, EmbeddedVariant};
use crate::error::{Error, Result};
use crate::genome::{AbstractInterval, Length, Position};
use crate::reference::ReferenceProvider;
use crate::sequence::reverse_complement;
use crate::strand::Strand;
use crate::variant::{ensure_disjoint, Variant, VariantKind};

/// A contiguous region on one strand of a reference sequence.
///
/// Coordinates are genomic, 1-based and inclusive with `start <= end`.
/// Relative positions count from the 5' end of the region on its strand,
/// so on the reverse strand relative position 1 is genomic `end`.
///
/// The sequence is fetched from the provider on first use and cached; on
/// the reverse strand it is stored reverse-complemented.
///
/// ```
/// # use seq_region::error::Error;
/// # fn try_main() -> Result<(), Error> {
/// use std::sync::Arc;
/// use seq_region::genome::AbstractInterval;
/// use seq_region::reference::InMemoryReference;
/// use seq_region::region::SeqRegion;
/// use seq_region::strand::Strand;
///
/// let mut reference = InMemoryReference::new();
/// reference.add_sequence("chr1", "AACCGGTTac");
/// let reference = Arc::new(reference);
///
/// let region = SeqRegion::new("chr1", 10, 3, Strand::Reverse, reference)?;
/// assert_eq!((region.start(), region.end()), (3, 10));
/// assert_eq!(region.get_sequence(false, false)?, "gtAACCGG");
/// assert_eq!(region.to_rel_position(9)?, 2);
/// # Ok(())
/// # }
/// # fn main() { try_main().unwrap(); }
/// ```
#[derive(Clone)]
pub struct SeqRegion {
    seq_id: String,
    start: Position,
    end: Position,
    strand: Strand,
    frame: Option<u8>,
    provider: Arc<dyn ReferenceProvider>,
    sequence: OnceLock<String>,
}

/// A variant trimmed to a region and turned to the region's strand.
struct LocalEdit<'a> {
    variant: &'a Variant,
    rel_start: usize,
    rel_end: usize,
    ref_seq: String,
    alt_seq: String,
}

impl LocalEdit<'_> {
    fn is_insertion(&self) -> bool {
        self.variant.is_insertion()
    }

    fn delta(&self) -> i64 {
        self.alt_seq.len() as i64 - self.ref_seq.len() as i64
    }
}

impl SeqRegion {
    /// Create a region. On the reverse strand swapped coordinates are
    /// accepted and reordered, otherwise `end < start` is an error.
    pub fn new(
        seq_id: impl Into<String>,
        start: Position,
        end: Position,
        strand: Strand,
        provider: Arc<dyn ReferenceProvider>,
    ) -> Result<Self> {
        let seq_id = seq_id.into();
        let (start, end) = match strand {
            Strand::Reverse if end < start => (end, start),
            _ => (start, end),
        };
        if start == 0 || end < start {
            return Err(Error::InvalidPositions { seq_id, start, end });
        }
        Ok(SeqRegion {
            seq_id,
            start,
            end,
            strand,
            frame: None,
            provider,
            sequence: OnceLock::new(),
        })
    }

    /// Set the reading frame, the number of leading bases outside of a
    /// complete codon.
    pub fn with_frame(mut self, frame: u8) -> Result<Self> {
        if frame > 2 {
            return Err(Error::InvalidFrame(frame));
        }
        self.frame = Some(frame);
        Ok(self)
    }

    /// Seed the sequence cache, in region orientation.
    pub fn with_sequence(self, sequence: impl Into<String>) -> Result<Self> {
        let sequence = sequence.into();
        if sequence.len() as u64 != self.seq_length() {
            return Err(Error::SequenceLength {
                expected: self.seq_length(),
                found: sequence.len() as u64,
            });
        }
        if !sequence.is_ascii() {
            return Err(self.unavailable("sequence is not ASCII"));
        }
        Ok(SeqRegion {
            sequence: OnceLock::from(sequence),
            ..self
        })
    }

    pub fn seq_id(&self) -> &str {
        &self.seq_id
    }

    pub fn frame(&self) -> Option<u8> {
        self.frame
    }

    pub fn seq_length(&self) -> Length {
        self.end - self.start + 1
    }

    pub fn provider(&self) -> &Arc<dyn ReferenceProvider> {
        &self.provider
    }

    pub fn same_provider(&self, other: &SeqRegion) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.provider), Arc::as_ptr(&other.provider))
    }

    fn unavailable(&self, msg: &str) -> Error {
        Error::ReferenceUnavailable {
            seq_id: self.seq_id.clone(),
            msg: msg.to_owned(),
        }
    }

    /// The strand-corrected sequence, fetched once and cached.
    pub fn fetch_seq(&self) -> Result<&str> {
        if let Some(sequence) = self.sequence.get() {
            return Ok(sequence);
        }
        let bytes = self.provider.fetch(&self.seq_id, self.start, self.end)?;
        if bytes.len() as u64 != self.seq_length() {
            return Err(Error::SequenceLength {
                expected: self.seq_length(),
                found: bytes.len() as u64,
            });
        }
        let sequence = String::from_utf8(bytes)
            .ok()
            .filter(|s| s.is_ascii())
            .ok_or_else(|| self.unavailable("sequence is not ASCII"))?;
        let sequence = if self.strand.is_reverse() {
            reverse_complement(&sequence)
        } else {
            sequence
        };
        Ok(self.sequence.get_or_init(|| sequence))
    }

    /// The region sequence, optionally upper-cased and optionally trimmed
    /// to whole codons of the reading frame.
    pub fn get_sequence(&self, unmasked: bool, inframe_only: bool) -> Result<String> {
        let mut sequence = self.fetch_seq()?;
        if inframe_only {
            let (from, to) = inframe_bounds(sequence.len(), self.frame.unwrap_or(0));
            sequence = &sequence[from..to];
        }
        Ok(if unmasked {
            sequence.to_ascii_uppercase()
        } else {
            sequence.to_owned()
        })
    }

    fn check_rel(&self, rel: u64) -> Result<()> {
        if rel == 0 || rel > self.seq_length() {
            Err(Error::OutOfRange {
                pos: rel as i64,
                start: 1,
                end: self.seq_length(),
            })
        } else {
            Ok(())
        }
    }

    /// The window `rel_start..=rel_end` of this region, 1-based relative
    /// positions. The frame moves with the window start.
    pub fn sub_region(&self, rel_start: u64, rel_end: u64) -> Result<SeqRegion> {
        self.check_rel(rel_start)?;
        self.check_rel(rel_end)?;
        if rel_end < rel_start {
            return Err(Error::OutOfRange {
                pos: rel_end as i64,
                start: rel_start,
                end: self.seq_length(),
            });
        }

        let (start, end) = if self.strand.is_reverse() {
            (self.end - rel_end + 1, self.end - rel_start + 1)
        } else {
            (self.start + rel_start - 1, self.start + rel_end - 1)
        };
        let frame = self
            .frame
            .map(|f| (i64::from(f) - (rel_start as i64 - 1)).rem_euclid(3) as u8);
        let sequence = match self.sequence.get() {
            Some(s) => OnceLock::from(s[rel_start as usize - 1..rel_end as usize].to_owned()),
            None => OnceLock::new(),
        };

        Ok(SeqRegion {
            seq_id: self.seq_id.clone(),
            start,
            end,
            strand: self.strand,
            frame,
            provider: Arc::clone(&self.provider),
            sequence,
        })
    }

    /// Genomic position to 1-based relative position.
    pub fn to_rel_position(&self, abs_pos: Position) -> Result<u64> {
        if !self.contains(abs_pos) {
            return Err(Error::OutOfRange {
                pos: abs_pos as i64,
                start: self.start,
                end: self.end,
            });
        }
        Ok(if self.strand.is_reverse() {
            self.end - abs_pos + 1
        } else {
            abs_pos - self.start + 1
        })
    }

    /// 1-based relative position to genomic position.
    pub fn to_abs_position(&self, rel_pos: u64) -> Result<Position> {
        self.check_rel(rel_pos)?;
        Ok(if self.strand.is_reverse() {
            self.end - rel_pos + 1
        } else {
            self.start + rel_pos - 1
        })
    }

    /// Same sequence, same provider, compatible strands and intersecting
    /// intervals.
    pub fn overlaps(&self, other: &SeqRegion) -> bool {
        self.same_provider(other)
            && self.strand.is_compatible(&other.strand)
            && self.intersects(other)
    }

    /// Apply `variants` to the region sequence.
    ///
    /// Returns the alternative sequence and the variants embedded in it.
    /// Variants must be disjoint and must all overlap the region; only
    /// substitutions may hang over its boundaries.
    pub fn get_alt_sequence(
        &self,
        variants: &[Variant],
        unmasked: bool,
        inframe_only: bool,
    ) -> Result<(String, Vec<EmbeddedVariant>)> {
        ensure_disjoint(variants)?;
        let variants: Vec<&Variant> = variants.iter().collect();
        let (sequence, embedded) = self.embed(&variants, unmasked)?;
        if inframe_only {
            Ok(trim_in_frame(&sequence, embedded, self.frame.unwrap_or(0)))
        } else {
            Ok((sequence, embedded))
        }
    }

    fn local_edit<'a>(&self, variant: &'a Variant) -> Result<LocalEdit<'a>> {
        let clip = variant
            .clip_to(self)
            .ok_or_else(|| Error::VariantOutOfRegion {
                variant: variant.id().to_owned(),
                region: self.to_string(),
            })?;
        let substitution = variant.kind() == VariantKind::Substitution;
        if clip.is_partial() && !substitution {
            return Err(Error::PartialIndelNotSupported(variant.id().to_owned()));
        }

        let (head, tail) = (clip.start_overhang as usize, clip.end_overhang as usize);
        let ref_seq = &variant.ref_seq()[head..variant.ref_seq().len() - tail];
        let alt_seq = if substitution {
            &variant.alt_seq()[head..variant.alt_seq().len() - tail]
        } else {
            variant.alt_seq()
        };
        let (ref_seq, alt_seq) = if self.strand.is_reverse() {
            (reverse_complement(ref_seq), reverse_complement(alt_seq))
        } else {
            (ref_seq.to_owned(), alt_seq.to_owned())
        };

        let (rel_start, rel_end) = if variant.is_insertion() {
            // the 5' flank on the region strand, the gap follows it
            let flank = if self.strand.is_reverse() {
                clip.end
            } else {
                clip.start
            };
            let rel = self.to_rel_position(flank)?;
            (rel, rel + 1)
        } else {
            let a = self.to_rel_position(clip.start)?;
            let b = self.to_rel_position(clip.end)?;
            (a.min(b), a.max(b))
        };

        Ok(LocalEdit {
            variant,
            rel_start: rel_start as usize,
            rel_end: rel_end as usize,
            ref_seq,
            alt_seq,
        })
    }

    /// Embed disjoint variants that all overlap this region.
    pub(crate) fn embed(
        &self,
        variants: &[&Variant],
        unmasked: bool,
    ) -> Result<(String, Vec<EmbeddedVariant>)> {
        let mut edits = variants
            .iter()
            .map(|v| self.local_edit(v))
            .collect::<Result<Vec<_>>>()?;
        edits.sort_by_key(|e| (e.rel_start, e.is_insertion()));

        let mut sequence = self.fetch_seq()?.to_owned();
        for edit in edits.iter().rev() {
            if edit.is_insertion() {
                sequence.insert_str(edit.rel_start, &edit.alt_seq);
                continue;
            }
            let range = edit.rel_start - 1..edit.rel_end;
            let found = &sequence[range.clone()];
            if !found.eq_ignore_ascii_case(&edit.ref_seq) {
                return Err(Error::ReferenceMismatch {
                    variant: edit.variant.id().to_owned(),
                    expected: edit.ref_seq.clone(),
                    found: found.to_owned(),
                });
            }
            sequence.replace_range(range, &edit.alt_seq);
        }
        if unmasked {
            sequence.make_ascii_uppercase();
        }

        let mut offset = 0i64;
        let embedded = edits
            .iter()
            .map(|edit| {
                let delta = edit.delta();
                let rel_start = edit.rel_start as i64 + offset;
                let rel_end = edit.rel_end as i64 + offset;
                let (rel_start, rel_end) = match edit.variant.kind() {
                    VariantKind::Deletion => (rel_start - 1, rel_end + 1 + delta),
                    VariantKind::Insertion => (rel_start + 1, rel_end - 1 + delta),
                    _ => (rel_start, rel_end + delta),
                };
                offset += delta;
                EmbeddedVariant::new(edit.variant.clone(), rel_start, rel_end)
            })
            .collect();

        Ok((sequence, embedded))
    }
}

impl AbstractInterval for SeqRegion {
    fn contig(&self) -> &str {
        &self.seq_id
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

impl Display for SeqRegion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}{}", self.seq_id, self.start, self.end, self.strand)
    }
}

impl Debug for SeqRegion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_struct("SeqRegion")
            .field("seq_id", &self.seq_id)
            .field("start", &self.start)
            .field("end", &self.end)
            .field("strand", &self.strand)
            .field("frame", &self.frame)
            .field("cached", &self.sequence.get().is_some())
            .finish()
    }
}
