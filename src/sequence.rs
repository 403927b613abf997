//! Nucleotide sequence helpers.

/// A DNA base
pub type Base = u8;
/// An amino acid
pub type AminoAcid = u8;
/// A biological sequence
pub type Sequence = Vec<u8>;

/// Complement of a single base. Case is kept, so soft-masked bases stay
/// lower-case; anything that is not `ACGTUN` is returned unchanged.
pub fn complement(base: Base) -> Base {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' | b'U' => b'A',
        b'a' => b't',
        b'c' => b'g',
        b'g' => b'c',
        b't' | b'u' => b'a',
        other => other,
    }
}

/// Reverse complement of a nucleotide string.
///
/// ```
/// use seq_region::sequence::reverse_complement;
/// assert_eq!(reverse_complement("ACGtn"), "naCGT");
/// ```
pub fn reverse_complement(seq: &str) -> String {
    seq.bytes().rev().map(|b| complement(b) as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_keeps_case() {
        assert_eq!(complement(b'a'), b't');
        assert_eq!(complement(b'G'), b'C');
        assert_eq!(complement(b'N'), b'N');
    }

    #[test]
    fn reverse_complement_involution() {
        let seq = "ATGcgtNNacg";
        assert_eq!(reverse_complement(&reverse_complement(seq)), seq);
        assert_eq!(reverse_complement(""), "");
    }
}
