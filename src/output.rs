// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Serializable result records.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::region::EmbeddedVariant;
use crate::variant::VariantKind;

/// An embedded variant as reported to callers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedVariantRecord {
    pub variant_id: String,
    pub rel_start: i64,
    pub rel_end: i64,
    pub kind: VariantKind,
}

impl From<&EmbeddedVariant> for EmbeddedVariantRecord {
    fn from(embedded: &EmbeddedVariant) -> Self {
        EmbeddedVariantRecord {
            variant_id: embedded.id().to_owned(),
            rel_start: embedded.rel_start,
            rel_end: embedded.rel_end,
            kind: embedded.kind(),
        }
    }
}

/// Reference sequence of a request, plus the alternative sequence when
/// variants were given.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub ref_name: String,
    pub ref_sequence: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub alt_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub alt_sequence: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none", default))]
    pub alt_embedded_variants: Option<Vec<EmbeddedVariantRecord>>,
}

impl SequenceRecord {
    pub fn reference(ref_name: impl Into<String>, ref_sequence: impl Into<String>) -> Self {
        SequenceRecord {
            ref_name: ref_name.into(),
            ref_sequence: ref_sequence.into(),
            alt_name: None,
            alt_sequence: None,
            alt_embedded_variants: None,
        }
    }

    /// Attach an alternative sequence. Its name is the reference name
    /// followed by the comma-separated variant ids.
    pub fn with_alt(
        mut self,
        alt_sequence: String,
        embedded: &[EmbeddedVariant],
        variant_ids: &[&str],
    ) -> Self {
        self.alt_name = Some(format!("{}:{}", self.ref_name, variant_ids.join(",")));
        self.alt_sequence = Some(alt_sequence);
        self.alt_embedded_variants =
            Some(embedded.iter().map(EmbeddedVariantRecord::from).collect());
        self
    }

    pub fn has_alt(&self) -> bool {
        self.alt_sequence.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_only() {
        let record = SequenceRecord::reference("ENST01", "ATG");
        assert!(!record.has_alt());
        assert_eq!(record.alt_name, None);
    }

    #[test]
    fn with_alt_names_variants() {
        let variant = "chr1:5C>T".parse().unwrap();
        let embedded = vec![EmbeddedVariant::new(variant, 3, 3)];
        let record = SequenceRecord::reference("ENST01", "ATGCC").with_alt(
            "ATGTC".to_owned(),
            &embedded,
            &["chr1:5C>T", "rs2"],
        );
        assert_eq!(record.alt_name.as_deref(), Some("ENST01:chr1:5C>T,rs2"));
        assert_eq!(
            record.alt_embedded_variants.unwrap(),
            vec![EmbeddedVariantRecord {
                variant_id: "chr1:5C>T".to_owned(),
                rel_start: 3,
                rel_end: 3,
                kind: VariantKind::Substitution,
            }]
        );
    }
}
