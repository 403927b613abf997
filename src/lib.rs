//! Strand- and frame-aware sequence regions.
//!
//! Regions fetch their bases from a [`reference::ReferenceProvider`], apply
//! genomic variants and report where each variant lands in the resulting
//! sequence. Spliced regions, reading frames, ORF discovery and translation
//! build on top of that.
//!
//! ```
//! # use seq_region::error::Error;
//! # fn try_main() -> Result<(), Error> {
//! use std::sync::Arc;
//! use seq_region::reference::{InMemoryReference, ReferenceProvider};
//! use seq_region::region::SeqRegion;
//! use seq_region::strand::Strand;
//! use seq_region::variant::Variant;
//!
//! let mut reference = InMemoryReference::new();
//! reference.add_sequence("chr1", "ATGCCCTGacGCTAAA");
//! let reference: Arc<dyn ReferenceProvider> = Arc::new(reference);
//!
//! let region = SeqRegion::new("chr1", 1, 10, Strand::Reverse, reference)?;
//! assert_eq!(region.get_sequence(false, false)?, "gtCAGGGCAT");
//!
//! let variant: Variant = "chr1:7_8delTG".parse()?;
//! let (alt, embedded) = region.get_alt_sequence(&[variant], false, false)?;
//! assert_eq!(alt, "gtGGGCAT");
//! assert_eq!((embedded[0].rel_start, embedded[0].rel_end), (2, 3));
//! # Ok(())
//! # }
//! # fn main() { try_main().unwrap(); }
//! ```

pub mod codec;
pub mod error;
pub mod genome;
pub mod output;
pub mod reference;
pub mod region;
pub mod sequence;
pub mod strand;
pub mod variant;
