// Copyright 2024 The seq-region developers.
// Licensed under the MIT license (http://opensource.org/licenses/MIT)
// This file may not be copied, modified, or distributed
// except according to those terms.

//! Random access into faidx-indexed FASTA files.
//!
//! The `<fasta>.fai` index is read when present; otherwise it is rebuilt
//! by scanning the file once. Compressed input is rejected.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::{check_window, ReferenceProvider};
use crate::error::{Error, Result};
use crate::genome::{Length, Position};

/// One line of a `.fai` index.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FaiEntry {
    length: Length,
    offset: u64,
    line_bases: u64,
    line_bytes: u64,
}

/// A FASTA file with its faidx index.
///
/// Every `fetch` opens the file on its own, so the reader can be shared
/// between threads without locking.
#[derive(Debug, Clone)]
pub struct IndexedFasta {
    path: PathBuf,
    index: HashMap<String, FaiEntry>,
}

impl IndexedFasta {
    /// Open a FASTA file, loading `<path>.fai` or building the index.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if is_gzip(&path)? {
            return Err(Error::ReferenceUnavailable {
                seq_id: path.display().to_string(),
                msg: "compressed FASTA is not supported, decompress it first".to_owned(),
            });
        }

        let fai = PathBuf::from(format!("{}.fai", path.display()));
        let index = if fai.exists() {
            load_fai(&fai)?
        } else {
            log::debug!("no index at {}, scanning {}", fai.display(), path.display());
            scan_fasta(&path)?
        };

        Ok(IndexedFasta { path, index })
    }

    pub fn sequence_length(&self, seq_id: &str) -> Option<Length> {
        self.index.get(seq_id).map(|e| e.length)
    }

    pub fn has_sequence(&self, seq_id: &str) -> bool {
        self.index.contains_key(seq_id)
    }

    pub fn sequence_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    fn read(&self, entry: &FaiEntry, start: Position, end: Position) -> std::io::Result<Vec<u8>> {
        let first = start - 1;
        let wanted = (end - start + 1) as usize;
        let file_offset =
            entry.offset + (first / entry.line_bases) * entry.line_bytes + first % entry.line_bases;
        let lines = (wanted as u64 + first % entry.line_bases).div_ceil(entry.line_bases);
        let to_read = wanted as u64 + lines * (entry.line_bytes - entry.line_bases);

        let mut file = File::open(&self.path)?;
        file.seek(SeekFrom::Start(file_offset))?;
        let mut buffer = Vec::with_capacity(to_read as usize);
        file.take(to_read).read_to_end(&mut buffer)?;

        Ok(buffer
            .into_iter()
            .filter(|&b| b != b'\n' && b != b'\r')
            .take(wanted)
            .collect())
    }
}

impl ReferenceProvider for IndexedFasta {
    fn fetch(&self, seq_id: &str, start: Position, end: Position) -> Result<Vec<u8>> {
        check_window(seq_id, start, end)?;
        let entry = self
            .index
            .get(seq_id)
            .ok_or_else(|| Error::NotFound(format!("reference sequence {seq_id}")))?;
        let unavailable = |msg: String| Error::ReferenceUnavailable {
            seq_id: seq_id.to_owned(),
            msg,
        };
        if end > entry.length {
            return Err(unavailable(format!(
                "{start}-{end} exceeds sequence length {}",
                entry.length
            )));
        }

        let bases = self
            .read(entry, start, end)
            .map_err(|e| unavailable(e.to_string()))?;
        if bases.len() as u64 != end - start + 1 {
            return Err(unavailable(format!(
                "read {} bases for {start}-{end}, index out of date?",
                bases.len()
            )));
        }
        Ok(bases)
    }
}

fn is_gzip(path: &Path) -> Result<bool> {
    let mut magic = [0u8; 2];
    match File::open(path)?.read_exact(&mut magic) {
        Ok(()) => Ok(magic == [0x1f, 0x8b]),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e.into()),
    }
}

fn load_fai(path: &Path) -> Result<HashMap<String, FaiEntry>> {
    let bad = |line: &str| Error::ReferenceUnavailable {
        seq_id: path.display().to_string(),
        msg: format!("malformed index line {line:?}"),
    };

    let mut index = HashMap::new();
    for line in BufReader::new(File::open(path)?).lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            return Err(bad(&line));
        }
        let number = |i: usize| fields[i].parse::<u64>().map_err(|_| bad(&line));
        let entry = FaiEntry {
            length: number(1)?,
            offset: number(2)?,
            line_bases: number(3)?,
            line_bytes: number(4)?,
        };
        if entry.line_bases == 0 || entry.line_bytes < entry.line_bases {
            return Err(bad(&line));
        }
        index.insert(fields[0].to_owned(), entry);
    }
    Ok(index)
}

fn scan_fasta(path: &Path) -> Result<HashMap<String, FaiEntry>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut index = HashMap::new();
    let mut current: Option<(String, FaiEntry)> = None;
    let mut position = 0u64;
    let mut line = String::new();

    loop {
        line.clear();
        let read = reader.read_line(&mut line)? as u64;
        if read == 0 {
            break;
        }
        let line_start = position;
        position += read;

        if let Some(header) = line.strip_prefix('>') {
            if let Some((name, entry)) = current.take() {
                index.insert(name, entry);
            }
            let name = header.split_whitespace().next().unwrap_or_default().to_owned();
            current = Some((
                name,
                FaiEntry {
                    length: 0,
                    offset: position,
                    line_bases: 0,
                    line_bytes: 0,
                },
            ));
        } else if let Some((_, entry)) = current.as_mut() {
            let bases = line.trim_end().len() as u64;
            if entry.line_bases == 0 && bases > 0 {
                entry.offset = line_start;
                entry.line_bases = bases;
                entry.line_bytes = read;
            }
            entry.length += bases;
        }
    }
    if let Some((name, entry)) = current {
        index.insert(name, entry);
    }

    Ok(index)
}
