// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Transcripts with their coding sequence and protein product.
//!
//! A `TranslatedSeqRegion` pairs the exons of a transcript with an optional
//! CDS. Without a CDS the longest ORF of the transcript is used. Alternative
//! coding sequences keep the reference start codon and end at the first
//! in-frame stop, which may lie past the reference stop when a variant
//! removes it.

use std::sync::OnceLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use super::embed::{retain_within, EmbeddedVariant};
use super::multi::MultiPartSeqRegion;
use crate::codec::{find_orfs, translate, CodonTable, Orf, ReturnType};
use crate::error::{Error, Result};
use crate::genome::Position;
use crate::output::SequenceRecord;
use crate::variant::Variant;

/// The three sequence spaces a transcript can be reported in.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum SequenceType {
    #[default]
    Transcript,
    Coding,
    Protein,
}

/// Where the coding sequence of a transcript came from.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display)]
pub enum CodingSource {
    /// Annotated coding regions.
    Cds,
    /// Longest open reading frame of the transcript.
    Orf,
}

#[derive(Debug, Clone)]
struct CodingSequence {
    region: MultiPartSeqRegion,
    dna: String,
    source: CodingSource,
}

/// A transcript, its coding sequence and its translation.
///
/// ```
/// # use seq_region::error::Error;
/// # fn try_main() -> Result<(), Error> {
/// use std::sync::Arc;
/// use seq_region::reference::{InMemoryReference, ReferenceProvider};
/// use seq_region::region::{CodingSource, MultiPartSeqRegion, SeqRegion, TranslatedSeqRegion};
/// use seq_region::strand::Strand;
///
/// let mut reference = InMemoryReference::new();
/// reference.add_sequence("chr1", "ccATGGCCtttttAAATAGgg");
/// let reference: Arc<dyn ReferenceProvider> = Arc::new(reference);
/// let exons = MultiPartSeqRegion::new(vec![
///     SeqRegion::new("chr1", 1, 8, Strand::Forward, reference.clone())?,
///     SeqRegion::new("chr1", 14, 21, Strand::Forward, reference.clone())?,
/// ])?;
///
/// let transcript = TranslatedSeqRegion::new(exons, None)?;
/// assert_eq!(transcript.coding_source()?, CodingSource::Orf);
/// assert_eq!(transcript.coding_dna()?, "ATGGCCAAATAG");
/// assert_eq!(transcript.protein()?, "MAK");
/// # Ok(())
/// # }
/// # fn main() { try_main().unwrap(); }
/// ```
#[derive(Debug, Clone)]
pub struct TranslatedSeqRegion {
    exon_region: MultiPartSeqRegion,
    cds_region: Option<MultiPartSeqRegion>,
    codon_table: CodonTable,
    coding: OnceLock<CodingSequence>,
    protein: OnceLock<String>,
}

impl TranslatedSeqRegion {
    /// Pair exons with an optional CDS, which must carry reading frames
    /// and lie on the same sequence and strand as the exons.
    pub fn new(
        exon_region: MultiPartSeqRegion,
        coding_region: Option<MultiPartSeqRegion>,
    ) -> Result<Self> {
        if let Some(cds) = &coding_region {
            if cds.frame().is_none() {
                return Err(Error::InconsistentParts(
                    "coding region has no reading frame".to_owned(),
                ));
            }
            if cds.seq_id() != exon_region.seq_id() || cds.strand() != exon_region.strand() {
                return Err(Error::InconsistentParts(format!(
                    "coding region {cds} does not match exons {exon_region}"
                )));
            }
        }
        Ok(TranslatedSeqRegion {
            exon_region,
            cds_region: coding_region,
            codon_table: CodonTable::standard(),
            coding: OnceLock::new(),
            protein: OnceLock::new(),
        })
    }

    /// Use another codon table. Cached coding data is discarded.
    pub fn with_codon_table(mut self, codon_table: CodonTable) -> Self {
        self.codon_table = codon_table;
        self.coding = OnceLock::new();
        self.protein = OnceLock::new();
        self
    }

    pub fn exon_region(&self) -> &MultiPartSeqRegion {
        &self.exon_region
    }

    pub fn codon_table(&self) -> &CodonTable {
        &self.codon_table
    }

    fn coding(&self) -> Result<&CodingSequence> {
        if let Some(coding) = self.coding.get() {
            return Ok(coding);
        }
        let coding = self.derive_coding()?;
        Ok(self.coding.get_or_init(|| coding))
    }

    fn derive_coding(&self) -> Result<CodingSequence> {
        if let Some(cds) = &self.cds_region {
            return Ok(CodingSequence {
                region: cds.clone(),
                dna: cds.get_sequence(false, true)?,
                source: CodingSource::Cds,
            });
        }

        let transcript = self.exon_region.get_sequence(true, false)?;
        let orf = find_orfs(&transcript, &self.codon_table, None, ReturnType::Longest)?
            .into_iter()
            .next()
            .ok_or(Error::OrfNotFound)?;
        log::debug!(
            "using ORF {}-{} of {} as coding sequence",
            orf.seq_start,
            orf.seq_end,
            self.exon_region
        );
        let region = self
            .exon_region
            .sub_region(orf.seq_start as u64, orf.seq_end as u64)?
            .with_reading_frame(0)?;
        // soft-masking of the exons carries over, like for a given CDS
        let dna = region.get_sequence(false, true)?;
        Ok(CodingSequence {
            region,
            dna,
            source: CodingSource::Orf,
        })
    }

    /// The coding region, derived from the longest ORF if no CDS was given.
    pub fn coding_region(&self) -> Result<&MultiPartSeqRegion> {
        Ok(&self.coding()?.region)
    }

    /// The reference coding sequence, whole codons only.
    pub fn coding_dna(&self) -> Result<&str> {
        Ok(&self.coding()?.dna)
    }

    pub fn coding_source(&self) -> Result<CodingSource> {
        Ok(self.coding()?.source)
    }

    /// The reference protein, without the stop.
    pub fn protein(&self) -> Result<&str> {
        if let Some(protein) = self.protein.get() {
            return Ok(protein);
        }
        let dna = self.coding_dna()?;
        if dna.len() < 3 {
            log::warn!("no coding sequence to translate for {}", self.exon_region);
        }
        let protein = translate(dna, &self.codon_table);
        Ok(self.protein.get_or_init(|| protein))
    }

    /// Reference sequence of the requested type.
    pub fn get_sequence(&self, seq_type: SequenceType, unmasked: bool) -> Result<String> {
        match seq_type {
            SequenceType::Transcript => self.exon_region.get_sequence(unmasked, false),
            SequenceType::Coding if unmasked => Ok(self.coding_dna()?.to_ascii_uppercase()),
            SequenceType::Coding => Ok(self.coding_dna()?.to_owned()),
            SequenceType::Protein => Ok(self.protein()?.to_owned()),
        }
    }

    /// Alternative sequence of the requested type with the variants
    /// embedded in its coordinates.
    pub fn get_alt_sequence(
        &self,
        seq_type: SequenceType,
        variants: &[Variant],
        unmasked: bool,
    ) -> Result<(String, Vec<EmbeddedVariant>)> {
        match seq_type {
            SequenceType::Transcript => self.exon_region.get_alt_sequence(variants, unmasked, false),
            SequenceType::Coding => self.alt_coding_sequence(variants, unmasked),
            SequenceType::Protein => self.alt_protein_sequence(variants),
        }
    }

    /// The ORF at the start of `dna`, if it closes.
    fn forced_orf(&self, dna: &str) -> Result<Option<Orf>> {
        match find_orfs(dna, &self.codon_table, Some(0), ReturnType::Longest) {
            Ok(orfs) => Ok(orfs.into_iter().next()),
            Err(Error::InvalidForcedStart(codon)) => Err(Error::InvalidatedOrf(format!(
                "alternative sequence starts with {codon}"
            ))),
            Err(e) => Err(e),
        }
    }

    fn alt_coding_sequence(
        &self,
        variants: &[Variant],
        unmasked: bool,
    ) -> Result<(String, Vec<EmbeddedVariant>)> {
        let coding = self.coding()?;
        if variants.is_empty() {
            return Ok((self.get_sequence(SequenceType::Coding, unmasked)?, Vec::new()));
        }

        let (alt, embedded) = coding.region.get_alt_sequence(variants, unmasked, true)?;
        let same_start = match (coding.dna.get(..3), alt.get(..3)) {
            (Some(reference), Some(alternative)) => reference.eq_ignore_ascii_case(alternative),
            _ => false,
        };
        if !same_start {
            return Err(Error::InvalidatedOrf("start codon changed".to_owned()));
        }

        if let Some(orf) = self.forced_orf(&alt)? {
            let end = orf.seq_end;
            return Ok((alt[..end].to_owned(), retain_within(embedded, end as i64)));
        }

        // stop codon lost, read on into the 3' UTR
        let extension = self.extension_region(&coding.region)?;
        log::debug!("stop codon lost, extending coding sequence over {extension}");
        let (alt, embedded) = extension.get_alt_sequence(variants, unmasked, true)?;
        match self.forced_orf(&alt)? {
            Some(orf) => {
                let end = orf.seq_end;
                Ok((alt[..end].to_owned(), retain_within(embedded, end as i64)))
            }
            None => Err(Error::InvalidatedOrf(
                "no in-frame stop codon downstream of the lost stop".to_owned(),
            )),
        }
    }

    /// From the first complete codon of the coding region to the 3' end of
    /// the transcript.
    fn extension_region(&self, coding: &MultiPartSeqRegion) -> Result<MultiPartSeqRegion> {
        let five_prime = if coding.strand().is_reverse() {
            coding.end()
        } else {
            coding.start()
        };
        let first_codon =
            self.exon_region.to_rel_position(five_prime)? + u64::from(coding.frame().unwrap_or(0));
        self.exon_region
            .sub_region(first_codon, self.exon_region.seq_length())?
            .with_reading_frame(0)
    }

    fn alt_protein_sequence(&self, variants: &[Variant]) -> Result<(String, Vec<EmbeddedVariant>)> {
        if variants.is_empty() {
            return Ok((self.protein()?.to_owned(), Vec::new()));
        }
        let (alt, embedded) = self
            .alt_coding_sequence(variants, false)
            .map_err(|e| match e {
                Error::InvalidatedOrf(_) => Error::InvalidatedTranslation(Box::new(e)),
                e => e,
            })?;
        let protein = translate(&alt, &self.codon_table);
        let embedded = embedded
            .into_iter()
            .map(|mut e| {
                e.rel_start = codon_number(e.rel_start);
                e.rel_end = codon_number(e.rel_end);
                e
            })
            .collect();
        Ok((protein, embedded))
    }

    /// Genomic position to transcript position.
    pub fn to_transcript_position(&self, abs_pos: Position) -> Result<u64> {
        self.exon_region.to_rel_position(abs_pos)
    }

    /// Genomic position to position in the coding sequence.
    pub fn to_coding_position(&self, abs_pos: Position) -> Result<u64> {
        let coding = self.coding()?;
        let rel = coding.region.to_rel_position(abs_pos)?;
        let frame = u64::from(coding.region.frame().unwrap_or(0));
        if rel <= frame || rel - frame > coding.dna.len() as u64 {
            return Err(Error::OutOfRange {
                pos: abs_pos as i64,
                start: coding.region.start(),
                end: coding.region.end(),
            });
        }
        Ok(rel - frame)
    }

    /// Genomic position to amino acid position.
    pub fn to_protein_position(&self, abs_pos: Position) -> Result<u64> {
        Ok(Self::coding_to_protein_position(self.to_coding_position(abs_pos)?))
    }

    /// Coding position to the number of the codon it falls in.
    pub fn coding_to_protein_position(rel_pos: u64) -> u64 {
        rel_pos.div_ceil(3)
    }

    /// Reference sequence of the requested type and, with variants, the
    /// alternative sequence.
    pub fn retrieve(
        &self,
        name: &str,
        seq_type: SequenceType,
        variants: &[Variant],
        unmasked: bool,
    ) -> Result<SequenceRecord> {
        let record = SequenceRecord::reference(name, self.get_sequence(seq_type, unmasked)?);
        if variants.is_empty() {
            return Ok(record);
        }
        let (alt, embedded) = self.get_alt_sequence(seq_type, variants, unmasked)?;
        let ids: Vec<&str> = variants.iter().map(Variant::id).collect();
        Ok(record.with_alt(alt, &embedded, &ids))
    }
}

/// Codon number of a 1-based coding position; 0 stays 0.
fn codon_number(pos: i64) -> i64 {
    (pos + 2).div_euclid(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::genome::AbstractInterval;
    use crate::reference::{InMemoryReference, ReferenceProvider};
    use crate::region::fixtures::{minus_transcript, var};
    use crate::region::SeqRegion;
    use crate::strand::Strand;
    use crate::variant::VariantKind;

    const CDS: &str = "ATGGCTTACAGCAAGCCATGA";

    fn positions(embedded: &[EmbeddedVariant]) -> Vec<(i64, i64)> {
        embedded.iter().map(|e| (e.rel_start, e.rel_end)).collect()
    }

    #[test]
    fn coding_from_cds() {
        let transcript = minus_transcript(true);
        assert_eq!(transcript.coding_source().unwrap(), CodingSource::Cds);
        assert_eq!(transcript.coding_dna().unwrap(), CDS);
        assert_eq!(transcript.protein().unwrap(), "MAYSKP");
        assert_eq!(
            transcript.get_sequence(SequenceType::Transcript, false).unwrap(),
            "GCCACATGGCTTACAGCAAGCCATGAGTCAAATAGCC"
        );
    }

    #[test]
    fn coding_from_longest_orf() {
        let transcript = minus_transcript(false);
        assert_eq!(transcript.coding_source().unwrap(), CodingSource::Orf);
        assert_eq!(transcript.coding_dna().unwrap(), CDS);
        let bounds: Vec<(u64, u64)> = transcript
            .coding_region()
            .unwrap()
            .parts()
            .iter()
            .map(|p| (p.start(), p.end()))
            .collect();
        assert_eq!(bounds, vec![(1101, 1110), (1012, 1022)]);
        assert_eq!(transcript.coding_region().unwrap().parts()[1].frame(), Some(2));
    }

    #[test]
    fn orf_coding_keeps_soft_masking() {
        let mut reference = InMemoryReference::new();
        reference.add_sequence("chr1", "ccatgGCCAAATAGgg");
        let reference: Arc<dyn ReferenceProvider> = Arc::new(reference);
        let exons = MultiPartSeqRegion::new(vec![SeqRegion::new(
            "chr1",
            1,
            16,
            Strand::Forward,
            reference,
        )
        .unwrap()])
        .unwrap();
        let transcript = TranslatedSeqRegion::new(exons, None).unwrap();
        assert_eq!(transcript.coding_source().unwrap(), CodingSource::Orf);
        assert_eq!(transcript.coding_dna().unwrap(), "atgGCCAAATAG");
        assert_eq!(
            transcript.get_sequence(SequenceType::Coding, true).unwrap(),
            "ATGGCCAAATAG"
        );
        assert_eq!(transcript.protein().unwrap(), "MAK");

        let record = transcript
            .retrieve("tx", SequenceType::Coding, &[var("chr1:7C>T")], false)
            .unwrap();
        assert_eq!(record.ref_sequence, "atgGCCAAATAG");
        assert_eq!(record.alt_sequence.as_deref(), Some("atgGTCAAATAG"));

        let record = transcript
            .retrieve("tx", SequenceType::Coding, &[var("chr1:7C>T")], true)
            .unwrap();
        assert_eq!(record.ref_sequence, "ATGGCCAAATAG");
        assert_eq!(record.alt_sequence.as_deref(), Some("ATGGTCAAATAG"));
    }

    #[test]
    fn no_orf() {
        let transcript = minus_transcript(false);
        let exon = transcript.exon_region().sub_region(1, 5).unwrap();
        let utr = TranslatedSeqRegion::new(exon, None).unwrap();
        assert!(matches!(utr.coding_dna(), Err(Error::OrfNotFound)));
        assert!(matches!(utr.protein(), Err(Error::OrfNotFound)));
    }

    #[test]
    fn cds_must_be_framed() {
        let transcript = minus_transcript(false);
        let exons = transcript.exon_region().clone();
        let unframed = exons.sub_region(6, 26).unwrap();
        assert!(matches!(
            TranslatedSeqRegion::new(exons, Some(unframed)),
            Err(Error::InconsistentParts(_))
        ));
    }

    #[test]
    fn stop_gain_from_deletion() {
        let transcript = minus_transcript(true);
        let variants = [var("chrX:1102delG")];
        let (alt, embedded) = transcript
            .get_alt_sequence(SequenceType::Coding, &variants, false)
            .unwrap();
        assert_eq!(alt, "ATGGCTTAA");
        assert_eq!(positions(&embedded), vec![(8, 9)]);
        assert_eq!(embedded[0].kind(), VariantKind::Deletion);

        let (protein, embedded) = transcript
            .get_alt_sequence(SequenceType::Protein, &variants, false)
            .unwrap();
        assert_eq!(protein, "MA");
        assert_eq!(positions(&embedded), vec![(3, 3)]);
    }

    #[test]
    fn stop_loss_extends_into_utr() {
        let transcript = minus_transcript(true);
        let variants = [var("chrX:1012T>C")];
        let (alt, embedded) = transcript
            .get_alt_sequence(SequenceType::Coding, &variants, false)
            .unwrap();
        assert_eq!(alt, "ATGGCTTACAGCAAGCCATGGGTCAAATAG");
        assert_eq!(positions(&embedded), vec![(21, 21)]);

        let (protein, embedded) = transcript
            .get_alt_sequence(SequenceType::Protein, &variants, false)
            .unwrap();
        assert_eq!(protein, "MAYSKPWVK");
        assert_eq!(positions(&embedded), vec![(7, 7)]);
    }

    #[test]
    fn stop_loss_extends_for_orf_derived_coding() {
        let transcript = minus_transcript(false);
        let (alt, _) = transcript
            .get_alt_sequence(SequenceType::Coding, &[var("chrX:1012T>C")], true)
            .unwrap();
        assert_eq!(alt.len(), 30);
    }

    #[test]
    fn stop_loss_without_recovery() {
        let transcript = minus_transcript(true);
        let variants = [var("chrX:1012T>C"), var("chrX:1004T>C")];
        let err = transcript
            .get_alt_sequence(SequenceType::Coding, &variants, false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidatedOrf(_)));

        let err = transcript
            .get_alt_sequence(SequenceType::Protein, &variants, false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidatedTranslation(_)));
        assert!(err.is_invalidated_orf());
    }

    #[test]
    fn start_codon_loss() {
        let transcript = minus_transcript(true);
        // ATG on the transcript is CAT at chrX:1108-1110
        let err = transcript
            .get_alt_sequence(SequenceType::Coding, &[var("chrX:1110T>C")], false)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidatedOrf(_)));
    }

    #[test]
    fn variants_in_utr_keep_coding_sequence() {
        let transcript = minus_transcript(true);
        let (alt, embedded) = transcript
            .get_alt_sequence(SequenceType::Coding, &[var("chrX:1114G>A")], false)
            .unwrap();
        assert_eq!(alt, CDS);
        assert!(embedded.is_empty());
    }

    #[test]
    fn transcript_alt_sequence() {
        let transcript = minus_transcript(true);
        let (alt, embedded) = transcript
            .get_alt_sequence(SequenceType::Transcript, &[var("chrX:1012T>C")], false)
            .unwrap();
        assert_eq!(alt, "GCCACATGGCTTACAGCAAGCCATGGGTCAAATAGCC");
        assert_eq!(positions(&embedded), vec![(26, 26)]);
    }

    #[test]
    fn cross_space_positions() {
        let transcript = minus_transcript(true);
        assert_eq!(transcript.to_transcript_position(1115).unwrap(), 1);
        assert_eq!(transcript.to_transcript_position(1012).unwrap(), 26);
        assert_eq!(transcript.to_coding_position(1110).unwrap(), 1);
        assert_eq!(transcript.to_coding_position(1012).unwrap(), 21);
        assert_eq!(transcript.to_protein_position(1102).unwrap(), 3);
        assert!(transcript.to_coding_position(1111).is_err());
        assert!(matches!(
            transcript.to_transcript_position(1050),
            Err(Error::InIntron(1050))
        ));
        assert_eq!(TranslatedSeqRegion::coding_to_protein_position(1), 1);
        assert_eq!(TranslatedSeqRegion::coding_to_protein_position(3), 1);
        assert_eq!(TranslatedSeqRegion::coding_to_protein_position(4), 2);
    }

    #[test]
    fn retrieve_records() {
        let transcript = minus_transcript(true);
        let record = transcript
            .retrieve("ENST0001", SequenceType::Protein, &[], false)
            .unwrap();
        assert_eq!(record.ref_sequence, "MAYSKP");
        assert!(!record.has_alt());

        let record = transcript
            .retrieve(
                "ENST0001",
                SequenceType::Protein,
                &[var("chrX:1102delG")],
                false,
            )
            .unwrap();
        assert_eq!(record.alt_name.as_deref(), Some("ENST0001:chrX:1102delG"));
        assert_eq!(record.alt_sequence.as_deref(), Some("MA"));
        let embedded = record.alt_embedded_variants.unwrap();
        assert_eq!((embedded[0].rel_start, embedded[0].rel_end), (3, 3));
    }

    #[test]
    fn sequence_type_names() {
        assert_eq!("protein".parse::<SequenceType>().unwrap(), SequenceType::Protein);
        assert_eq!(SequenceType::Coding.to_string(), "coding");
        assert_eq!(CodingSource::Orf.as_ref(), "Orf");
    }

    #[test]
    fn codon_numbers() {
        assert_eq!(codon_number(0), 0);
        assert_eq!(codon_number(1), 1);
        assert_eq!(codon_number(6), 2);
        assert_eq!(codon_number(7), 3);
    }
}
