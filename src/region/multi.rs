// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Spliced regions made of several `SeqRegion` parts.

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

use super::embed::{inframe_bounds, stitch, trim_in_frame, EmbeddedVariant};
use super::seq::SeqRegion;
use crate::error::{Error, Result};
use crate::genome::{AbstractInterval, Interval, Length, Position};
use crate::reference::ReferenceProvider;
use crate::strand::Strand;
use crate::variant::{ensure_disjoint, Variant};

/// An ordered concatenation of regions, such as the exons of a transcript
/// or the coding parts of a CDS.
///
/// Parts share sequence, strand and provider and are kept in transcription
/// order: ascending by start on the forward (or unknown) strand, descending
/// on the reverse strand. Relative positions run over the concatenated
/// sequence. If the parts carry reading frames, every part has one and
/// together they continue a single reading frame across the junctions.
///
/// ```
/// # use seq_region::error::Error;
/// # fn try_main() -> Result<(), Error> {
/// use std::sync::Arc;
/// use seq_region::reference::{InMemoryReference, ReferenceProvider};
/// use seq_region::region::{MultiPartSeqRegion, SeqRegion};
/// use seq_region::strand::Strand;
///
/// let mut reference = InMemoryReference::new();
/// reference.add_sequence("chr1", "ATGAAAttttCCCTGA");
/// let reference: Arc<dyn ReferenceProvider> = Arc::new(reference);
///
/// let exons = MultiPartSeqRegion::new(vec![
///     SeqRegion::new("chr1", 11, 16, Strand::Forward, reference.clone())?,
///     SeqRegion::new("chr1", 1, 6, Strand::Forward, reference.clone())?,
/// ])?;
/// assert_eq!(exons.get_sequence(false, false)?, "ATGAAACCCTGA");
/// assert_eq!(exons.to_rel_position(12)?, 8);
/// assert!(exons.to_rel_position(8).is_err());
/// # Ok(())
/// # }
/// # fn main() { try_main().unwrap(); }
/// ```
#[derive(Debug, Clone)]
pub struct MultiPartSeqRegion {
    parts: Vec<SeqRegion>,
}

impl MultiPartSeqRegion {
    /// Validate and order the parts.
    pub fn new(mut parts: Vec<SeqRegion>) -> Result<Self> {
        let first = parts
            .first()
            .ok_or_else(|| Error::InconsistentParts("no parts given".to_owned()))?;
        for part in &parts[1..] {
            if part.seq_id() != first.seq_id() {
                return Err(Error::InconsistentParts(format!(
                    "parts on {} and {}",
                    first.seq_id(),
                    part.seq_id()
                )));
            }
            if part.strand() != first.strand() {
                return Err(Error::InconsistentParts(format!(
                    "parts {first} and {part} differ in strand"
                )));
            }
            if !part.same_provider(first) {
                return Err(Error::InconsistentParts(
                    "parts use different reference providers".to_owned(),
                ));
            }
            if part.frame().is_some() != first.frame().is_some() {
                return Err(Error::InconsistentParts(
                    "either every part or none has a reading frame".to_owned(),
                ));
            }
        }

        parts.sort_by_key(|p| p.start());
        if let Some(pair) = parts.windows(2).find(|pair| pair[0].end() >= pair[1].start()) {
            return Err(Error::InconsistentParts(format!(
                "parts {} and {} overlap",
                pair[0], pair[1]
            )));
        }
        if parts[0].strand().is_reverse() {
            parts.reverse();
        }

        let region = MultiPartSeqRegion { parts };
        region.check_frames()?;
        Ok(region)
    }

    /// Each part's frame must complete the codon left open by the parts
    /// before it.
    fn check_frames(&self) -> Result<()> {
        let Some(frame0) = self.frame() else {
            return Ok(());
        };
        let mut accumulated = -i64::from(frame0);
        for (i, pair) in self.parts.windows(2).enumerate() {
            accumulated += pair[0].seq_length() as i64;
            let frame = pair[1].frame().unwrap_or(0);
            if (accumulated + i64::from(frame)).rem_euclid(3) != 0 {
                return Err(Error::FrameNotTriplet { part: i + 1, frame });
            }
        }
        Ok(())
    }

    /// Re-derive every part's frame from the frame of the first part.
    pub fn with_reading_frame(self, frame: u8) -> Result<Self> {
        let mut accumulated = -i64::from(frame);
        let mut parts = Vec::with_capacity(self.parts.len());
        for (i, part) in self.parts.into_iter().enumerate() {
            let part_frame = if i == 0 {
                frame
            } else {
                (3 - accumulated.rem_euclid(3)).rem_euclid(3) as u8
            };
            accumulated += part.seq_length() as i64;
            parts.push(part.with_frame(part_frame)?);
        }
        Ok(MultiPartSeqRegion { parts })
    }

    pub fn parts(&self) -> &[SeqRegion] {
        &self.parts
    }

    pub fn seq_id(&self) -> &str {
        self.parts[0].seq_id()
    }

    pub fn strand(&self) -> Strand {
        self.parts[0].strand()
    }

    /// Frame of the first part.
    pub fn frame(&self) -> Option<u8> {
        self.parts[0].frame()
    }

    pub fn provider(&self) -> &Arc<dyn ReferenceProvider> {
        self.parts[0].provider()
    }

    /// Lowest genomic position covered.
    pub fn start(&self) -> Position {
        self.parts.iter().map(|p| p.start()).min().unwrap_or_default()
    }

    /// Highest genomic position covered.
    pub fn end(&self) -> Position {
        self.parts.iter().map(|p| p.end()).max().unwrap_or_default()
    }

    /// Enclosing interval, introns included.
    pub fn bounds(&self) -> Interval {
        Interval::new(
            self.seq_id().to_owned(),
            self.start(),
            self.end(),
            self.strand(),
        )
    }

    /// Sum of the part lengths.
    pub fn seq_length(&self) -> Length {
        self.parts.iter().map(|p| p.seq_length()).sum()
    }

    /// Concatenated part sequences, optionally upper-cased and trimmed to
    /// whole codons.
    pub fn get_sequence(&self, unmasked: bool, inframe_only: bool) -> Result<String> {
        let mut sequence = String::with_capacity(self.seq_length() as usize);
        for part in &self.parts {
            sequence.push_str(part.fetch_seq()?);
        }
        if inframe_only {
            let (from, to) = inframe_bounds(sequence.len(), self.frame().unwrap_or(0));
            sequence.truncate(to);
            sequence.drain(..from);
        }
        if unmasked {
            sequence.make_ascii_uppercase();
        }
        Ok(sequence)
    }

    /// Genomic position to position in the concatenated sequence.
    pub fn to_rel_position(&self, abs_pos: Position) -> Result<u64> {
        if abs_pos < self.start() || abs_pos > self.end() {
            return Err(Error::OutOfRange {
                pos: abs_pos as i64,
                start: self.start(),
                end: self.end(),
            });
        }
        let mut preceding = 0;
        for part in &self.parts {
            if part.contains(abs_pos) {
                return Ok(preceding + part.to_rel_position(abs_pos)?);
            }
            preceding += part.seq_length();
        }
        Err(Error::InIntron(abs_pos))
    }

    /// Position in the concatenated sequence to genomic position.
    pub fn to_abs_position(&self, rel_pos: u64) -> Result<Position> {
        let mut preceding = 0;
        for part in &self.parts {
            if rel_pos > preceding && rel_pos <= preceding + part.seq_length() {
                return part.to_abs_position(rel_pos - preceding);
            }
            preceding += part.seq_length();
        }
        Err(Error::OutOfRange {
            pos: rel_pos as i64,
            start: 1,
            end: self.seq_length(),
        })
    }

    /// The window `rel_start..=rel_end` of the concatenated sequence, as
    /// a region made of the touched parts.
    pub fn sub_region(&self, rel_start: u64, rel_end: u64) -> Result<MultiPartSeqRegion> {
        let length = self.seq_length();
        if rel_start == 0 || rel_end < rel_start || rel_end > length {
            return Err(Error::OutOfRange {
                pos: if rel_start == 0 { 0 } else { rel_end as i64 },
                start: 1,
                end: length,
            });
        }

        let mut parts = Vec::new();
        let mut preceding = 0;
        for part in &self.parts {
            let (first, last) = (preceding + 1, preceding + part.seq_length());
            preceding = last;
            if last < rel_start {
                continue;
            }
            if first > rel_end {
                break;
            }
            parts.push(part.sub_region(
                rel_start.max(first) - first + 1,
                rel_end.min(last) - first + 1,
            )?);
        }
        Ok(MultiPartSeqRegion { parts })
    }

    /// The codon-aligned window after the leading frame bases.
    pub fn inframe_region(&self) -> Result<MultiPartSeqRegion> {
        let (from, to) = inframe_bounds(self.seq_length() as usize, self.frame().unwrap_or(0));
        self.sub_region(from as u64 + 1, to as u64)
    }

    /// Apply variants part by part and join the results, without any
    /// reading-frame trimming.
    ///
    /// Variants outside the region are skipped with a warning. A variant
    /// cut by a junction is embedded once, spanning the junction.
    pub fn fetch_alt_seq(
        &self,
        variants: &[Variant],
        unmasked: bool,
    ) -> Result<(String, Vec<EmbeddedVariant>)> {
        ensure_disjoint(variants)?;
        let mut selected: Vec<&Variant> = variants
            .iter()
            .filter(|v| {
                let inside = self.parts.iter().any(|p| v.overlaps_interval(p));
                if !inside {
                    log::warn!("variant {} does not overlap {}, skipped", v.id(), self);
                }
                inside
            })
            .collect();
        selected.sort_by_key(|v| (v.start(), v.end()));
        if self.strand().is_reverse() {
            selected.reverse();
        }

        let mut sequence = String::with_capacity(self.seq_length() as usize);
        let mut embedded = Vec::new();
        for part in &self.parts {
            let local: Vec<&Variant> = selected
                .iter()
                .copied()
                .filter(|v| v.overlaps_interval(part))
                .collect();
            let (part_sequence, part_embedded) = part.embed(&local, unmasked)?;
            stitch(&mut embedded, part_embedded, sequence.len() as i64);
            sequence.push_str(&part_sequence);
        }
        Ok((sequence, embedded))
    }

    /// Alternative sequence of the joined parts, see `fetch_alt_seq`,
    /// optionally trimmed to whole codons.
    pub fn get_alt_sequence(
        &self,
        variants: &[Variant],
        unmasked: bool,
        inframe_only: bool,
    ) -> Result<(String, Vec<EmbeddedVariant>)> {
        if variants.is_empty() {
            return Ok((self.get_sequence(unmasked, inframe_only)?, Vec::new()));
        }
        let (sequence, embedded) = self.fetch_alt_seq(variants, unmasked)?;
        if inframe_only {
            Ok(trim_in_frame(&sequence, embedded, self.frame().unwrap_or(0)))
        } else {
            Ok((sequence, embedded))
        }
    }
}

impl Display for MultiPartSeqRegion {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let parts: Vec<String> = self
            .parts
            .iter()
            .map(|p| format!("{}-{}", p.start(), p.end()))
            .collect();
        write!(f, "{}:{}{}", self.seq_id(), parts.join(","), self.strand())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::fixtures::{chr1, var};

    fn part(provider: &Arc<dyn ReferenceProvider>, start: u64, end: u64, strand: Strand) -> SeqRegion {
        SeqRegion::new("chr1", start, end, strand, provider.clone()).unwrap()
    }

    fn framed(
        provider: &Arc<dyn ReferenceProvider>,
        start: u64,
        end: u64,
        strand: Strand,
        frame: u8,
    ) -> SeqRegion {
        part(provider, start, end, strand).with_frame(frame).unwrap()
    }

    // parts of chr1 at 1-10, 21-30 and 41-50
    fn three_exons(strand: Strand) -> MultiPartSeqRegion {
        let provider = chr1();
        MultiPartSeqRegion::new(vec![
            part(&provider, 21, 30, strand),
            part(&provider, 41, 50, strand),
            part(&provider, 1, 10, strand),
        ])
        .unwrap()
    }

    #[test]
    fn part_order_follows_strand() {
        let plus = three_exons(Strand::Forward);
        let starts: Vec<u64> = plus.parts().iter().map(|p| p.start()).collect();
        assert_eq!(starts, vec![1, 21, 41]);
        let minus = three_exons(Strand::Reverse);
        let starts: Vec<u64> = minus.parts().iter().map(|p| p.start()).collect();
        assert_eq!(starts, vec![41, 21, 1]);
        assert_eq!(minus.seq_length(), 30);
        assert_eq!((minus.start(), minus.end()), (1, 50));
        assert_eq!(minus.to_string(), "chr1:41-50,21-30,1-10(-)");
    }

    #[test]
    fn inconsistent_parts() {
        let provider = chr1();
        assert!(matches!(
            MultiPartSeqRegion::new(vec![]),
            Err(Error::InconsistentParts(_))
        ));
        assert!(MultiPartSeqRegion::new(vec![
            part(&provider, 1, 10, Strand::Forward),
            part(&provider, 21, 30, Strand::Reverse),
        ])
        .is_err());
        assert!(MultiPartSeqRegion::new(vec![
            part(&provider, 1, 10, Strand::Forward),
            part(&chr1(), 21, 30, Strand::Forward),
        ])
        .is_err());
        assert!(MultiPartSeqRegion::new(vec![
            framed(&provider, 1, 10, Strand::Forward, 0),
            part(&provider, 21, 30, Strand::Forward),
        ])
        .is_err());
        assert!(MultiPartSeqRegion::new(vec![
            part(&provider, 1, 10, Strand::Forward),
            part(&provider, 10, 30, Strand::Forward),
        ])
        .is_err());
    }

    #[test]
    fn frames_must_continue() {
        let provider = chr1();
        // 10 bases in frame 0 leave one base open, the next part needs frame 2
        assert!(MultiPartSeqRegion::new(vec![
            framed(&provider, 1, 10, Strand::Forward, 0),
            framed(&provider, 21, 30, Strand::Forward, 2),
            framed(&provider, 41, 50, Strand::Forward, 1),
        ])
        .is_ok());
        assert!(matches!(
            MultiPartSeqRegion::new(vec![
                framed(&provider, 1, 10, Strand::Forward, 1),
                framed(&provider, 21, 30, Strand::Forward, 2),
            ]),
            Err(Error::FrameNotTriplet { part: 1, frame: 2 })
        ));

        let derived = three_exons(Strand::Forward).with_reading_frame(1).unwrap();
        let frames: Vec<Option<u8>> = derived.parts().iter().map(|p| p.frame()).collect();
        assert_eq!(frames, vec![Some(1), Some(0), Some(2)]);
        assert!(derived.check_frames().is_ok());
    }

    #[test]
    fn concatenated_sequence() {
        let plus = three_exons(Strand::Forward);
        let joined: String = plus
            .parts()
            .iter()
            .map(|p| p.get_sequence(false, false).unwrap())
            .collect();
        assert_eq!(plus.get_sequence(false, false).unwrap(), joined);

        let minus = three_exons(Strand::Reverse);
        let joined: String = minus
            .parts()
            .iter()
            .map(|p| p.get_sequence(true, false).unwrap())
            .collect();
        assert_eq!(minus.get_sequence(true, false).unwrap(), joined);
    }

    #[test]
    fn position_mapping() {
        let minus = three_exons(Strand::Reverse);
        assert_eq!(minus.to_rel_position(50).unwrap(), 1);
        assert_eq!(minus.to_rel_position(30).unwrap(), 11);
        assert_eq!(minus.to_rel_position(1).unwrap(), 30);
        assert!(matches!(minus.to_rel_position(15), Err(Error::InIntron(15))));
        assert!(matches!(
            minus.to_rel_position(51),
            Err(Error::OutOfRange { pos: 51, .. })
        ));
        for rel in 1..=30 {
            let abs = minus.to_abs_position(rel).unwrap();
            assert_eq!(minus.to_rel_position(abs).unwrap(), rel);
        }
        assert!(minus.to_abs_position(31).is_err());
        assert!(minus.to_abs_position(0).is_err());
    }

    #[test]
    fn sub_region_across_parts() {
        let plus = three_exons(Strand::Forward).with_reading_frame(0).unwrap();
        let sub = plus.sub_region(9, 22).unwrap();
        let bounds: Vec<(u64, u64)> = sub.parts().iter().map(|p| (p.start(), p.end())).collect();
        assert_eq!(bounds, vec![(9, 10), (21, 30), (41, 42)]);
        assert_eq!(sub.frame(), Some(1));
        assert_eq!(sub.seq_length(), 14);
        assert_eq!(
            sub.get_sequence(false, false).unwrap(),
            plus.get_sequence(false, false).unwrap()[8..22]
        );

        let minus = three_exons(Strand::Reverse);
        let sub = minus.sub_region(12, 12).unwrap();
        assert_eq!((sub.start(), sub.end()), (29, 29));
        assert!(minus.sub_region(0, 3).is_err());
        assert!(minus.sub_region(5, 31).is_err());
    }

    #[test]
    fn inframe_region_window() {
        let plus = three_exons(Strand::Forward).with_reading_frame(2).unwrap();
        let inframe = plus.inframe_region().unwrap();
        assert_eq!(inframe.seq_length(), 27);
        assert_eq!(inframe.frame(), Some(0));
        assert_eq!(
            inframe.get_sequence(false, false).unwrap(),
            plus.get_sequence(false, true).unwrap()
        );
    }

    #[test]
    fn junction_substitution_is_merged() {
        let plus = three_exons(Strand::Forward);
        let reference = plus.get_sequence(false, false).unwrap();
        let joined = &reference[8..12];
        // genomic 9-10 and 21-22 are adjacent in the transcript but not on chr1
        let genomic = chr1().fetch("chr1", 9, 22).unwrap();
        let genomic = String::from_utf8(genomic).unwrap();
        let variant = Variant::new(
            "junction",
            "chr1",
            9,
            22,
            genomic.clone(),
            "A".repeat(genomic.len()),
        )
        .unwrap();
        let (alt, embedded) = plus.get_alt_sequence(&[variant], false, false).unwrap();
        assert_eq!(&alt[8..12], "AAAA");
        assert_ne!(joined, "AAAA");
        assert_eq!(embedded.len(), 1);
        assert_eq!((embedded[0].rel_start, embedded[0].rel_end), (9, 12));
    }

    #[test]
    fn reverse_junction_substitution_is_merged() {
        // transcript order is 50..41, 30..21, 10..1, so 42-41 and 30-29 meet
        let minus = three_exons(Strand::Reverse);
        let genomic = String::from_utf8(chr1().fetch("chr1", 29, 42).unwrap()).unwrap();
        let variant =
            Variant::new("junction", "chr1", 29, 42, genomic, "A".repeat(14)).unwrap();
        let (alt, embedded) = minus.get_alt_sequence(&[variant], false, false).unwrap();
        assert_eq!(alt, "AGTTTCGTTTTTTATGTAATgtCAGGGCAT");
        assert_eq!(embedded.len(), 1);
        assert_eq!((embedded[0].rel_start, embedded[0].rel_end), (9, 12));
    }

    #[test]
    fn substitution_over_three_parts() {
        let plus = three_exons(Strand::Forward);
        let genomic = String::from_utf8(chr1().fetch("chr1", 9, 42).unwrap()).unwrap();
        let variant = Variant::new("wide", "chr1", 9, 42, genomic, "G".repeat(34)).unwrap();
        let (alt, embedded) = plus.get_alt_sequence(&[variant], false, false).unwrap();
        assert_eq!(alt, "ATGCCCTGGGGGGGGGGGGGGGACGAAACT");
        assert_eq!(embedded.len(), 1);
        assert_eq!((embedded[0].rel_start, embedded[0].rel_end), (9, 22));
    }

    #[test]
    fn variants_outside_are_skipped() {
        let plus = three_exons(Strand::Forward);
        let reference = plus.get_sequence(false, false).unwrap();
        let (alt, embedded) = plus
            .get_alt_sequence(&[var("chr1:60T>C"), var("chr1:15_16insA")], false, false)
            .unwrap();
        assert_eq!(alt, reference);
        assert!(embedded.is_empty());
    }

    #[test]
    fn variants_in_several_parts() {
        // chr1 1-10 ATGCCCTGac, 21-30 and 41-50 from the fixture
        let minus = three_exons(Strand::Reverse);
        let reference = minus.get_sequence(false, false).unwrap();
        let (alt, embedded) = minus
            .get_alt_sequence(&[var("chr1:2T>A"), var("chr1:45_46insGG")], false, false)
            .unwrap();
        assert_eq!(alt.len(), reference.len() + 2);
        // insertion 5' flank is 46, relative 5 in the first part
        assert_eq!(&alt[5..7], "CC");
        assert_eq!(
            embedded.iter().map(|e| (e.rel_start, e.rel_end)).collect::<Vec<_>>(),
            vec![(6, 7), (31, 31)]
        );
        assert_eq!(&alt[30..31], "T");
    }

    #[test]
    fn partial_indel_at_junction() {
        let plus = three_exons(Strand::Forward);
        assert!(matches!(
            plus.get_alt_sequence(&[var("chr1:10_21delCTTTTTTTTTTA")], false, false),
            Err(Error::PartialIndelNotSupported(_))
        ));
    }
}
