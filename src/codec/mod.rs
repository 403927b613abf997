// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Pure sequence codecs: codon tables, ORF discovery and translation.

pub mod codon;
pub mod orf;

pub use self::codon::{CodonTable, GeneticCode};
pub use self::orf::{find_orfs, translate, Orf, ReturnType};
