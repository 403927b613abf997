// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Strand-aware genomic regions and variant embedding.
//!
//! `SeqRegion` is a single contiguous stretch, `MultiPartSeqRegion` joins
//! several of them (exons, CDS parts) and `TranslatedSeqRegion` adds the
//! coding sequence and protein of a transcript. All coordinates are 1-based
//! and inclusive; relative positions count from the 5' end of the region in
//! its own orientation.

pub mod embed;
pub mod multi;
pub mod seq;
pub mod translated;

pub use self::embed::EmbeddedVariant;
pub use self::multi::MultiPartSeqRegion;
pub use self::seq::SeqRegion;
pub use self::translated::{CodingSource, SequenceType, TranslatedSeqRegion};
