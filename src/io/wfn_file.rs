//! Binary wavefunction file
//!
//! Layout (little-endian): the 8-byte magic, six `i64` header fields
//! (kind code, ndet, nbasis, nocc_up, nocc_dn, nword) and then
//! `ndet * stride` determinant words as `u64`.

use crate::bitdet::Word;
use crate::error::{CiError, Result};
use crate::wfn_impl::{Space, Wavefunction, WfnKind};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;
use tracing::info;

pub const WFN_MAGIC: &[u8; 8] = b"SELCIWFN";

/// Words read per chunk, bounding the allocation made for an untrusted header
const READ_CHUNK: usize = 1 << 16;

pub fn write_wfn<W: Write>(writer: &mut W, wfn: &Wavefunction) -> Result<()> {
    let space = wfn.space();
    writer.write_all(WFN_MAGIC)?;
    for field in [
        space.kind.code(),
        wfn.len() as i64,
        space.nbasis as i64,
        space.nocc_up as i64,
        space.nocc_dn as i64,
        space.nword as i64,
    ] {
        writer.write_all(&field.to_le_bytes())?;
    }
    for word in wfn.to_det_array() {
        writer.write_all(&word.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a wavefunction written by [`write_wfn`], rebuilding its index
///
/// A wrong magic, an out-of-range header field, a truncated body or an
/// invalid determinant record is a [`CiError::FormatMismatch`].
pub fn read_wfn<R: Read>(reader: &mut R) -> Result<Wavefunction> {
    let mut magic = [0u8; 8];
    read_bytes(reader, &mut magic)?;
    if &magic != WFN_MAGIC {
        return Err(CiError::FormatMismatch(
            "not a wavefunction file (bad magic)".to_string(),
        ));
    }

    let code = read_i64(reader)?;
    let kind = WfnKind::from_code(code)
        .ok_or_else(|| CiError::FormatMismatch(format!("unknown wavefunction kind code {}", code)))?;
    let ndet = read_count(reader, "ndet")?;
    let nbasis = read_count(reader, "nbasis")?;
    let nocc_up = read_count(reader, "nocc_up")?;
    let nocc_dn = read_count(reader, "nocc_dn")?;
    let nword = read_count(reader, "nword")?;

    let space = Space::new(kind, nbasis, nocc_up, nocc_dn)
        .map_err(|err| CiError::FormatMismatch(format!("invalid header: {}", err)))?;
    if nword != space.nword {
        return Err(CiError::FormatMismatch(format!(
            "header declares {} words per string, nbasis = {} needs {}",
            nword, nbasis, space.nword
        )));
    }
    let total = ndet.checked_mul(space.stride()).ok_or_else(|| {
        CiError::FormatMismatch(format!("determinant count {} is too large", ndet))
    })?;

    let mut words: Vec<Word> = Vec::with_capacity(total.min(READ_CHUNK));
    let mut buf = vec![0u8; 8 * READ_CHUNK];
    while words.len() < total {
        let count = (total - words.len()).min(READ_CHUNK);
        let bytes = &mut buf[..8 * count];
        read_bytes(reader, bytes)?;
        words.extend(bytes.chunks_exact(8).map(|b| {
            let mut le = [0u8; 8];
            le.copy_from_slice(b);
            Word::from_le_bytes(le)
        }));
    }

    Wavefunction::from_det_array(space, ndet, nword, &words)
}

pub fn save_wfn<P: AsRef<Path>>(path: P, wfn: &Wavefunction) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    write_wfn(&mut writer, wfn)?;
    info!(
        "Wavefunction with {} determinants saved to {}",
        wfn.len(),
        path.as_ref().display()
    );
    Ok(())
}

pub fn load_wfn<P: AsRef<Path>>(path: P) -> Result<Wavefunction> {
    let mut reader = BufReader::new(File::open(path.as_ref())?);
    let wfn = read_wfn(&mut reader)?;
    info!(
        "Wavefunction with {} determinants loaded from {}",
        wfn.len(),
        path.as_ref().display()
    );
    Ok(wfn)
}

fn read_bytes<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|err| match err.kind() {
        ErrorKind::UnexpectedEof => {
            CiError::FormatMismatch("wavefunction file is truncated".to_string())
        }
        _ => CiError::Io(err),
    })
}

fn read_i64<R: Read>(reader: &mut R) -> Result<i64> {
    let mut buf = [0u8; 8];
    read_bytes(reader, &mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

fn read_count<R: Read>(reader: &mut R, name: &str) -> Result<usize> {
    let value = read_i64(reader)?;
    usize::try_from(value)
        .map_err(|_| CiError::FormatMismatch(format!("header field {} is negative: {}", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Wavefunction {
        let mut wfn = Wavefunction::fci(70, 2, 1).unwrap();
        let hf = wfn.space().hartreefock();
        wfn.add_excited_up_to(&hf, 1).unwrap();
        wfn
    }

    fn header_offset(field: usize) -> usize {
        8 + 8 * field
    }

    #[test]
    fn test_round_trip() {
        let wfn = sample();
        let mut bytes = Vec::new();
        write_wfn(&mut bytes, &wfn).unwrap();
        assert_eq!(bytes.len(), 8 + 6 * 8 + 8 * wfn.to_det_array().len());

        let back = read_wfn(&mut bytes.as_slice()).unwrap();
        assert_eq!(back.space(), wfn.space());
        assert_eq!(back.to_det_array(), wfn.to_det_array());
        for (i, det) in wfn.iter().enumerate() {
            assert_eq!(back.index_of(det), Some(i));
        }
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = Vec::new();
        write_wfn(&mut bytes, &sample()).unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            read_wfn(&mut bytes.as_slice()),
            Err(CiError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_truncated_body() {
        let mut bytes = Vec::new();
        write_wfn(&mut bytes, &sample()).unwrap();
        bytes.truncate(bytes.len() - 3);
        assert!(matches!(
            read_wfn(&mut bytes.as_slice()),
            Err(CiError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_bad_header_fields() {
        let mut good = Vec::new();
        write_wfn(&mut good, &sample()).unwrap();

        let corrupt = |field: usize, value: i64| {
            let mut bytes = good.clone();
            let at = header_offset(field);
            bytes[at..at + 8].copy_from_slice(&value.to_le_bytes());
            read_wfn(&mut bytes.as_slice())
        };
        // kind code, ndet, nocc_up beyond nbasis, nword
        assert!(matches!(corrupt(0, 7), Err(CiError::FormatMismatch(_))));
        assert!(matches!(corrupt(1, -1), Err(CiError::FormatMismatch(_))));
        assert!(matches!(corrupt(3, 71), Err(CiError::FormatMismatch(_))));
        assert!(matches!(corrupt(5, 1), Err(CiError::FormatMismatch(_))));
    }

    #[test]
    fn test_invalid_record() {
        let mut wfn = Wavefunction::doci(4, 2).unwrap();
        wfn.add_hartreefock();
        let mut bytes = Vec::new();
        write_wfn(&mut bytes, &wfn).unwrap();
        let at = header_offset(6);
        bytes[at..at + 8].copy_from_slice(&0b111u64.to_le_bytes());
        assert!(matches!(
            read_wfn(&mut bytes.as_slice()),
            Err(CiError::FormatMismatch(_))
        ));
    }
}
