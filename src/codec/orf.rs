// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Open reading frame discovery and translation.
//!
//! An ORF runs from a start codon to the first in-frame stop codon, both
//! included. Only the three frames of the given strand are scanned; strand
//! correction is the caller's business.

use derive_new::new;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::codon::CodonTable;
use crate::error::{Error, Result};

/// An open reading frame. Positions are 1-based, inclusive and relative to
/// the searched sequence; `seq_end` is the last base of the stop codon.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct Orf {
    pub seq_start: usize,
    pub seq_end: usize,
    pub sequence: String,
    pub frame: u8,
}

impl Orf {
    pub fn len(&self) -> usize {
        self.seq_end - self.seq_start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// Which ORFs `find_orfs` reports.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ReturnType {
    All,
    #[default]
    Longest,
}

/// Scan codons from `offset` in steps of three and collect closed ORFs.
fn scan(dna: &[u8], table: &CodonTable, offset: usize, frame: u8, first_only: bool) -> Vec<Orf> {
    let mut orfs = Vec::new();
    let mut open: Option<usize> = None;
    let mut pos = offset;

    while pos + 3 <= dna.len() {
        let codon = &dna[pos..pos + 3];
        match open {
            None if table.is_start(codon) => open = Some(pos),
            Some(start) if table.is_stop(codon) => {
                let end = pos + 3;
                orfs.push(Orf::new(
                    start + 1,
                    end,
                    String::from_utf8_lossy(&dna[start..end]).into_owned(),
                    frame,
                ));
                if first_only {
                    break;
                }
                open = None;
            }
            _ => {}
        }
        pos += 3;
    }

    orfs
}

/// Find open reading frames in `dna`.
///
/// With `force_start`, only frame 0 from that 0-based offset is searched,
/// the codon at the offset must be a start codon and only the first closed
/// ORF is reported. Without it, frames 0, 1 and 2 are scanned. `Longest`
/// keeps the first of equally long ORFs in frame order.
///
/// ```
/// # use seq_region::error::Error;
/// # fn try_main() -> Result<(), Error> {
/// use seq_region::codec::{find_orfs, CodonTable, ReturnType};
/// let dna = "ATGATCTCGAAAAAGCACGTGGAATCGATGCACGCGTTGCCGGACCCtaaagaaactgaaatttga";
/// let orfs = find_orfs(dna, &CodonTable::standard(), None, ReturnType::Longest)?;
/// assert_eq!(orfs.len(), 1);
/// assert_eq!((orfs[0].seq_start, orfs[0].seq_end), (1, 66));
/// # Ok(())
/// # }
/// # fn main() { try_main().unwrap(); }
/// ```
pub fn find_orfs(
    dna: &str,
    table: &CodonTable,
    force_start: Option<usize>,
    return_type: ReturnType,
) -> Result<Vec<Orf>> {
    let dna = dna.to_ascii_uppercase();
    let bytes = dna.as_bytes();

    if let Some(offset) = force_start {
        let codon = bytes.get(offset..offset + 3);
        return match codon {
            Some(codon) if table.is_start(codon) => Ok(scan(bytes, table, offset, 0, true)),
            _ => Err(Error::InvalidForcedStart(
                dna.get(offset..).map_or("", |s| &s[..s.len().min(3)]).to_owned(),
            )),
        };
    }

    let orfs: Vec<Orf> = (0..3u8)
        .flat_map(|frame| scan(bytes, table, frame as usize, frame, false))
        .collect();

    match return_type {
        ReturnType::All => {
            if orfs.is_empty() {
                log::warn!("no open reading frame in sequence of length {}", bytes.len());
            }
            Ok(orfs)
        }
        ReturnType::Longest => {
            let longest = orfs.into_iter().fold(None, |best: Option<Orf>, orf| match best {
                Some(best) if best.len() >= orf.len() => Some(best),
                _ => Some(orf),
            });
            Ok(longest.into_iter().collect())
        }
    }
}

/// Translate coding DNA codon by codon.
///
/// Translation stops before the first stop codon, a trailing partial codon
/// is ignored and codons with ambiguous bases become `X`.
///
/// ```
/// use seq_region::codec::{translate, CodonTable};
/// assert_eq!(translate("atgGCCnnnTAAGGG", &CodonTable::standard()), "MAX");
/// ```
pub fn translate(dna: &str, table: &CodonTable) -> String {
    dna.as_bytes()
        .chunks_exact(3)
        .map_while(|codon| (!table.is_stop(codon)).then(|| table.translate_codon(codon) as char))
        .collect()
}
