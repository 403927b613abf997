// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Random access to plus-strand reference sequence.
//!
//! Providers return raw bytes with soft-masking preserved. Strand
//! correction happens in the regions, never here.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::genome::Position;

pub mod fasta;
pub mod memory;

pub use self::fasta::IndexedFasta;
pub use self::memory::InMemoryReference;

/// Source of reference bases, keyed by `(seq_id, start, end)` with 1-based
/// inclusive coordinates.
///
/// A successful `fetch` returns exactly `end - start + 1` bytes. Failures
/// are `NotFound` for unknown sequences and `ReferenceUnavailable` for
/// anything else. Implementations must allow concurrent calls.
pub trait ReferenceProvider: Send + Sync {
    fn fetch(&self, seq_id: &str, start: Position, end: Position) -> Result<Vec<u8>>;
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for Arc<P> {
    fn fetch(&self, seq_id: &str, start: Position, end: Position) -> Result<Vec<u8>> {
        (**self).fetch(seq_id, start, end)
    }
}

impl<P: ReferenceProvider + ?Sized> ReferenceProvider for Box<P> {
    fn fetch(&self, seq_id: &str, start: Position, end: Position) -> Result<Vec<u8>> {
        (**self).fetch(seq_id, start, end)
    }
}

/// Reject windows that are empty or start before position 1.
pub(crate) fn check_window(seq_id: &str, start: Position, end: Position) -> Result<()> {
    if start == 0 || end < start {
        Err(Error::InvalidPositions {
            seq_id: seq_id.to_owned(),
            start,
            end,
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_providers_forward_fetch() {
        let mut mem = InMemoryReference::new();
        mem.add_sequence("chr1", "ACGTacgt");
        let shared: Arc<dyn ReferenceProvider> = Arc::new(mem);
        assert_eq!(shared.fetch("chr1", 4, 5).unwrap(), b"Ta");

        let boxed: Box<dyn ReferenceProvider> = Box::new(shared.clone());
        assert_eq!(boxed.fetch("chr1", 1, 2).unwrap(), b"AC");
    }

    #[test]
    fn window_checks() {
        assert!(check_window("chr1", 1, 1).is_ok());
        assert!(matches!(
            check_window("chr1", 0, 3),
            Err(Error::InvalidPositions { .. })
        ));
        assert!(check_window("chr1", 5, 4).is_err());
    }
}
