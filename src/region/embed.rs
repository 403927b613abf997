// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Variants placed in the coordinates of an output sequence.
//!
//! Positions are 1-based and inclusive, with two conventions that depend
//! on the variant kind: a deletion is reported by the two bases flanking
//! the removed stretch, an insertion by the inserted bases only. The helpers
//! here keep those positions right when sequences are trimmed to a reading
//! frame or concatenated across region parts.

use crate::variant::{Variant, VariantKind};

/// A variant with its position in some output sequence.
///
/// `rel_start` is 0 for a deletion at the very start of the sequence,
/// where the 5' flank lies outside of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedVariant {
    pub variant: Variant,
    pub rel_start: i64,
    pub rel_end: i64,
}

impl EmbeddedVariant {
    pub fn new(variant: Variant, rel_start: i64, rel_end: i64) -> Self {
        EmbeddedVariant {
            variant,
            rel_start,
            rel_end,
        }
    }

    pub fn id(&self) -> &str {
        self.variant.id()
    }

    pub fn kind(&self) -> VariantKind {
        self.variant.kind()
    }

    pub fn is_deletion(&self) -> bool {
        self.kind() == VariantKind::Deletion
    }

    fn shifted(mut self, by: i64) -> Self {
        self.rel_start += by;
        self.rel_end += by;
        self
    }
}

/// Start and end byte offsets of the codon-aligned part of a sequence of
/// length `len` whose first `frame` bases are not coding.
pub(crate) fn inframe_bounds(len: usize, frame: u8) -> (usize, usize) {
    let frame = (frame as usize).min(len);
    let codons = (len - frame) / 3;
    (frame, frame + 3 * codons)
}

/// Restrict embedded variants to a sequence of `limit` bases.
///
/// Variants starting past the end are dropped, as is a deletion whose 5'
/// flank is the last base, since its 3' flank is gone. Ends are clamped.
pub(crate) fn retain_within(embedded: Vec<EmbeddedVariant>, limit: i64) -> Vec<EmbeddedVariant> {
    embedded
        .into_iter()
        .filter(|e| {
            e.rel_start <= limit && e.rel_end >= 1 && !(e.is_deletion() && e.rel_start == limit)
        })
        .map(|mut e| {
            e.rel_end = e.rel_end.min(limit);
            e.rel_start = e.rel_start.max(if e.is_deletion() { 0 } else { 1 });
            e
        })
        .collect()
}

/// Trim `seq` to whole codons after the first `frame` bases, moving the
/// embedded variants along.
pub(crate) fn trim_in_frame(
    seq: &str,
    embedded: Vec<EmbeddedVariant>,
    frame: u8,
) -> (String, Vec<EmbeddedVariant>) {
    let (from, to) = inframe_bounds(seq.len(), frame);
    let shift = -(from as i64);
    let embedded = embedded.into_iter().map(|e| e.shifted(shift)).collect();
    (seq[from..to].to_owned(), retain_within(embedded, (to - from) as i64))
}

/// Append the embedded variants of the next part, whose sequence starts
/// after `offset` bases of already joined sequence.
///
/// A variant that was cut at the junction appears as the last record so
/// far and the first record of the part; the two are merged.
pub(crate) fn stitch(acc: &mut Vec<EmbeddedVariant>, local: Vec<EmbeddedVariant>, offset: i64) {
    let mut local = local.into_iter().peekable();
    if let Some(last) = acc.last_mut() {
        if let Some(first) = local.next_if(|first| first.id() == last.id()) {
            last.rel_end += first.rel_end - i64::from(first.is_deletion());
        }
    }
    acc.extend(local.map(|e| e.shifted(offset)));
}
