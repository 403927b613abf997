// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Reference sequence held in memory.

use std::collections::HashMap;

use super::{check_window, ReferenceProvider};
use crate::error::{Error, Result};
use crate::genome::Position;

/// A stretch of sequence starting at a 1-based `offset` on its contig.
#[derive(Debug, Clone)]
struct Window {
    offset: Position,
    bases: Vec<u8>,
}

impl Window {
    fn slice(&self, start: Position, end: Position) -> Option<&[u8]> {
        let last = self.offset + self.bases.len() as u64 - 1;
        if self.bases.is_empty() || start < self.offset || end > last {
            return None;
        }
        let from = (start - self.offset) as usize;
        let to = (end - self.offset) as usize + 1;
        Some(&self.bases[from..to])
    }
}

/// In-memory `ReferenceProvider`.
///
/// Sequences are stored whole or as windows that begin at an arbitrary
/// contig position, so a few hundred bases around a locus can stand in for
/// a full chromosome.
///
/// ```
/// # use seq_region::error::Error;
/// # fn try_main() -> Result<(), Error> {
/// use seq_region::reference::{InMemoryReference, ReferenceProvider};
/// let mut reference = InMemoryReference::new();
/// reference.add_window("chrX", 5109510, "ACGTacgt");
/// assert_eq!(reference.fetch("chrX", 5109512, 5109514)?, b"GTa");
/// assert!(reference.fetch("chrX", 1, 3).is_err());
/// # Ok(())
/// # }
/// # fn main() { try_main().unwrap(); }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryReference {
    windows: HashMap<String, Vec<Window>>,
}

impl InMemoryReference {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a whole sequence, starting at position 1.
    pub fn add_sequence(&mut self, seq_id: impl Into<String>, bases: impl AsRef<[u8]>) {
        self.add_window(seq_id, 1, bases);
    }

    /// Add a window of bases whose first base sits at `offset`.
    pub fn add_window(
        &mut self,
        seq_id: impl Into<String>,
        offset: Position,
        bases: impl AsRef<[u8]>,
    ) {
        self.windows.entry(seq_id.into()).or_default().push(Window {
            offset: offset.max(1),
            bases: bases.as_ref().to_vec(),
        });
    }

    /// Parse FASTA text. Header names end at the first whitespace.
    pub fn from_fasta(text: &str) -> Result<Self> {
        let mut reference = Self::new();
        let mut current: Option<(String, Vec<u8>)> = None;

        for line in text.lines() {
            if let Some(header) = line.strip_prefix('>') {
                if let Some((name, bases)) = current.take() {
                    reference.add_sequence(name, bases);
                }
                let name = header.split_whitespace().next().unwrap_or_default();
                current = Some((name.to_owned(), Vec::new()));
            } else if let Some((_, bases)) = current.as_mut() {
                bases.extend(line.trim_end().bytes());
            } else if !line.trim().is_empty() {
                return Err(Error::ReferenceUnavailable {
                    seq_id: String::new(),
                    msg: "sequence data before the first FASTA header".to_owned(),
                });
            }
        }
        if let Some((name, bases)) = current {
            reference.add_sequence(name, bases);
        }

        Ok(reference)
    }

    pub fn has_sequence(&self, seq_id: &str) -> bool {
        self.windows.contains_key(seq_id)
    }
}

impl ReferenceProvider for InMemoryReference {
    fn fetch(&self, seq_id: &str, start: Position, end: Position) -> Result<Vec<u8>> {
        check_window(seq_id, start, end)?;
        let windows = self
            .windows
            .get(seq_id)
            .ok_or_else(|| Error::NotFound(format!("reference sequence {seq_id}")))?;
        windows
            .iter()
            .find_map(|w| w.slice(start, end))
            .map(<[u8]>::to_vec)
            .ok_or_else(|| Error::ReferenceUnavailable {
                seq_id: seq_id.to_owned(),
                msg: format!("no stored window covers {start}-{end}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_from_windows() {
        let mut reference = InMemoryReference::new();
        reference.add_window("chr2", 100, "AAAA");
        reference.add_window("chr2", 200, "ccGG");
        assert_eq!(reference.fetch("chr2", 101, 103).unwrap(), b"AAA");
        assert_eq!(reference.fetch("chr2", 201, 203).unwrap(), b"cGG");
        // spanning both windows is not served
        assert!(matches!(
            reference.fetch("chr2", 102, 201),
            Err(Error::ReferenceUnavailable { .. })
        ));
        assert!(matches!(
            reference.fetch("chr3", 1, 1),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn parse_fasta_text() {
        let reference =
            InMemoryReference::from_fasta(">chr1 first\nACGT\nacgt\n>chr2\nTTTT\n").unwrap();
        assert!(reference.has_sequence("chr1"));
        assert_eq!(reference.fetch("chr1", 3, 6).unwrap(), b"GTac");
        assert_eq!(reference.fetch("chr2", 1, 4).unwrap(), b"TTTT");
        assert!(InMemoryReference::from_fasta("ACGT\n>chr1\nA\n").is_err());
    }
}
