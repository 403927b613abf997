// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Codon tables with configurable start and stop codon sets.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::{Error, Result};
use crate::sequence::AminoAcid;

/// Genetic codes shipped with the crate, by NCBI translation table.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum GeneticCode {
    #[default]
    Standard,
    VertebrateMitochondrial,
}

/// Codon to amino acid lookup plus the start and stop codons used by the
/// ORF finder and by translation.
///
/// Indexed by 6-bit codon encoding: A=0, C=1, G=2, T/U=3,
/// index = first*16 + second*4 + third.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodonTable {
    table: [AminoAcid; 64],
    starts: Vec<[u8; 3]>,
    stops: Vec<[u8; 3]>,
}

fn base_to_index(b: u8) -> Option<usize> {
    match b {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' | b'U' | b'u' => Some(3),
        _ => None,
    }
}

fn codon_index(codon: &[u8]) -> Option<usize> {
    match codon {
        [a, b, c] => Some(base_to_index(*a)? * 16 + base_to_index(*b)? * 4 + base_to_index(*c)?),
        _ => None,
    }
}

fn parse_codons(codons: &[&str]) -> Result<Vec<[u8; 3]>> {
    codons
        .iter()
        .map(|codon| {
            let upper = codon.to_ascii_uppercase().replace('U', "T");
            match upper.as_bytes() {
                [a, b, c] if codon_index(upper.as_bytes()).is_some() => Ok([*a, *b, *c]),
                _ => Err(Error::InvalidCodon((*codon).to_owned())),
            }
        })
        .collect()
}

fn normalize(codon: &[u8]) -> Option<[u8; 3]> {
    match codon {
        [a, b, c] => {
            let up = |x: &u8| match x.to_ascii_uppercase() {
                b'U' => b'T',
                other => other,
            };
            Some([up(a), up(b), up(c)])
        }
        _ => None,
    }
}

impl CodonTable {
    /// Standard genetic code (NCBI translation table 1), start codon ATG.
    pub fn standard() -> Self {
        #[rustfmt::skip]
        let table: [u8; 64] = [
            b'K', b'N', b'K', b'N',  // AA*
            b'T', b'T', b'T', b'T',  // AC*
            b'R', b'S', b'R', b'S',  // AG*
            b'I', b'I', b'M', b'I',  // AT*
            b'Q', b'H', b'Q', b'H',  // CA*
            b'P', b'P', b'P', b'P',  // CC*
            b'R', b'R', b'R', b'R',  // CG*
            b'L', b'L', b'L', b'L',  // CT*
            b'E', b'D', b'E', b'D',  // GA*
            b'A', b'A', b'A', b'A',  // GC*
            b'G', b'G', b'G', b'G',  // GG*
            b'V', b'V', b'V', b'V',  // GT*
            b'*', b'Y', b'*', b'Y',  // TA*
            b'S', b'S', b'S', b'S',  // TC*
            b'*', b'C', b'W', b'C',  // TG*
            b'L', b'F', b'L', b'F',  // TT*
        ];
        CodonTable {
            table,
            starts: vec![*b"ATG"],
            stops: vec![*b"TAA", *b"TAG", *b"TGA"],
        }
    }

    /// Vertebrate mitochondrial code (NCBI translation table 2).
    /// Differences from standard: TGA→W, AGA→*, AGG→*, ATA→M.
    pub fn vertebrate_mitochondrial() -> Self {
        let mut code = Self::standard();
        code.table[56] = b'W';
        code.table[8] = b'*';
        code.table[10] = b'*';
        code.table[12] = b'M';
        code.starts = vec![*b"ATT", *b"ATC", *b"ATA", *b"ATG", *b"GTG"];
        code.stops = vec![*b"TAA", *b"TAG", *b"AGA", *b"AGG"];
        code
    }

    pub fn for_code(code: GeneticCode) -> Self {
        match code {
            GeneticCode::Standard => Self::standard(),
            GeneticCode::VertebrateMitochondrial => Self::vertebrate_mitochondrial(),
        }
    }

    /// Replace the start codon set.
    ///
    /// ```
    /// # use seq_region::error::Error;
    /// # fn try_main() -> Result<(), Error> {
    /// use seq_region::codec::CodonTable;
    /// let table = CodonTable::standard().with_start_codons(&["ATG", "CTG"])?;
    /// assert!(table.is_start(b"ctg"));
    /// assert!(CodonTable::standard().with_start_codons(&["AT"]).is_err());
    /// # Ok(())
    /// # }
    /// # fn main() { try_main().unwrap(); }
    /// ```
    pub fn with_start_codons(mut self, codons: &[&str]) -> Result<Self> {
        self.starts = parse_codons(codons)?;
        Ok(self)
    }

    /// Replace the stop codon set. Translation terminates on these codons.
    pub fn with_stop_codons(mut self, codons: &[&str]) -> Result<Self> {
        self.stops = parse_codons(codons)?;
        Ok(self)
    }

    pub fn is_start(&self, codon: &[u8]) -> bool {
        normalize(codon).is_some_and(|c| self.starts.contains(&c))
    }

    pub fn is_stop(&self, codon: &[u8]) -> bool {
        normalize(codon).is_some_and(|c| self.stops.contains(&c))
    }

    /// Translate a single codon; ambiguous or short codons become `X`.
    pub fn translate_codon(&self, codon: &[u8]) -> AminoAcid {
        if self.is_stop(codon) {
            return b'*';
        }
        codon_index(codon).map_or(b'X', |i| match self.table[i] {
            b'*' => b'X',
            aa => aa,
        })
    }
}

impl Default for CodonTable {
    fn default() -> Self {
        Self::standard()
    }
}
