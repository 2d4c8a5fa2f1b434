//! FCIDUMP integral files
//!
//! ```text
//!  &FCI NORB=4,NELEC=4,MS2=0,
//!   ORBSYM=1,1,1,1,
//!   ISYM=1,
//!  &END
//!   0.6744931491E+00   1   1   1   1
//!  -0.1252477303E+01   1   1   0   0
//!   0.7137758743E+00   0   0   0   0
//! ```
//!
//! Indices are one-based, two-body records `(ij|kl)` stand for all eight
//! permutations, `i j 0 0` is a one-body record and `0 0 0 0` the core energy.

extern crate nalgebra as na;

use crate::error::{CiError, Result};
use crate::ham_impl::Hamiltonian;
use na::DMatrix;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Namelist values of an FCIDUMP header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FcidumpHeader {
    pub norb: usize,
    pub nelec: usize,
    pub ms2: i64,
}

impl FcidumpHeader {
    /// Alpha and beta electron counts implied by `nelec` and `ms2`
    pub fn occupations(&self) -> Result<(usize, usize)> {
        let nelec = self.nelec as i64;
        if (nelec + self.ms2) % 2 != 0 || self.ms2.abs() > nelec {
            return Err(CiError::Parse(format!(
                "NELEC = {} and MS2 = {} are inconsistent",
                self.nelec, self.ms2
            )));
        }
        Ok((((nelec + self.ms2) / 2) as usize, ((nelec - self.ms2) / 2) as usize))
    }
}

#[derive(Debug, Clone)]
pub struct Fcidump {
    pub header: FcidumpHeader,
    pub ham: Hamiltonian,
}

pub fn read_fcidump<P: AsRef<Path>>(path: P) -> Result<Fcidump> {
    let text = fs::read_to_string(path.as_ref())?;
    let dump = parse_fcidump(&text)?;
    info!(
        "Integrals read from {}: {} orbitals, {} electrons, MS2 = {}",
        path.as_ref().display(),
        dump.header.norb,
        dump.header.nelec,
        dump.header.ms2
    );
    Ok(dump)
}

pub fn parse_fcidump(text: &str) -> Result<Fcidump> {
    let mut lines = text.lines().enumerate();

    let mut namelist = String::new();
    let mut closed = false;
    for (_, line) in lines.by_ref() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let upper = trimmed.to_uppercase();
        if let Some(end) = upper.find("&END").or_else(|| upper.find('/')) {
            namelist.push_str(&upper[..end]);
            closed = true;
            break;
        }
        namelist.push_str(&upper);
        namelist.push(',');
    }
    if !closed {
        return Err(CiError::Parse("FCIDUMP header is not terminated".to_string()));
    }
    let header = parse_header(&namelist)?;

    let n = header.norb;
    let mut ecore = 0.0;
    let mut one = DMatrix::zeros(n, n);
    let mut two = vec![0.0; n * n * n * n];
    let idx = |p: usize, q: usize, r: usize, s: usize| ((p * n + q) * n + r) * n + s;

    for (lineno, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != 5 {
            return Err(CiError::Parse(format!(
                "line {}: expected `value i j k l`, got {:?}",
                lineno + 1,
                line.trim()
            )));
        }
        let value = parse_value(fields[0], lineno)?;
        let mut orb = [0usize; 4];
        for (slot, field) in orb.iter_mut().zip(&fields[1..]) {
            *slot = field.parse().map_err(|_| {
                CiError::Parse(format!("line {}: bad orbital index {:?}", lineno + 1, field))
            })?;
            if *slot > n {
                return Err(CiError::Parse(format!(
                    "line {}: orbital index {} exceeds NORB = {}",
                    lineno + 1,
                    slot,
                    n
                )));
            }
        }

        match orb {
            [0, 0, 0, 0] => ecore = value,
            [i, j, 0, 0] if i > 0 && j > 0 => {
                one[(i - 1, j - 1)] = value;
                one[(j - 1, i - 1)] = value;
            }
            [i, j, k, l] if i > 0 && j > 0 && k > 0 && l > 0 => {
                let (p, q, r, s) = (i - 1, j - 1, k - 1, l - 1);
                for (a, b, c, d) in [
                    (p, q, r, s),
                    (q, p, r, s),
                    (p, q, s, r),
                    (q, p, s, r),
                    (r, s, p, q),
                    (s, r, p, q),
                    (r, s, q, p),
                    (s, r, q, p),
                ] {
                    two[idx(a, b, c, d)] = value;
                }
            }
            // orbital energies, ignored
            [_, 0, 0, 0] => {}
            _ => {
                return Err(CiError::Parse(format!(
                    "line {}: unsupported index pattern {:?}",
                    lineno + 1,
                    orb
                )))
            }
        }
    }

    let ham = Hamiltonian::new(ecore, one, two)
        .map_err(|err| CiError::Parse(format!("inconsistent integrals: {}", err)))?;
    Ok(Fcidump { header, ham })
}

fn parse_header(namelist: &str) -> Result<FcidumpHeader> {
    let body = namelist.trim_start().strip_prefix("&FCI").ok_or_else(|| {
        CiError::Parse("FCIDUMP must start with an &FCI namelist".to_string())
    })?;

    let (mut norb, mut nelec, mut ms2) = (None, None, 0i64);
    for token in body.split(|c: char| c == ',' || c.is_whitespace()) {
        let Some((key, value)) = token.split_once('=') else {
            continue;
        };
        let parse = |v: &str| {
            v.trim()
                .parse::<i64>()
                .map_err(|_| CiError::Parse(format!("bad value for {}: {:?}", key, v)))
        };
        match key.trim() {
            "NORB" => norb = Some(parse(value)?),
            "NELEC" => nelec = Some(parse(value)?),
            "MS2" => ms2 = parse(value)?,
            _ => {}
        }
    }

    let norb = norb.ok_or_else(|| CiError::Parse("FCIDUMP header lacks NORB".to_string()))?;
    let nelec = nelec.ok_or_else(|| CiError::Parse("FCIDUMP header lacks NELEC".to_string()))?;
    if norb <= 0 || nelec < 0 {
        return Err(CiError::Parse(format!(
            "invalid header values NORB = {}, NELEC = {}",
            norb, nelec
        )));
    }
    Ok(FcidumpHeader {
        norb: norb as usize,
        nelec: nelec as usize,
        ms2,
    })
}

/// Floating-point field, Fortran `D` exponents accepted
fn parse_value(field: &str, lineno: usize) -> Result<f64> {
    field
        .replace(['D', 'd'], "E")
        .parse()
        .map_err(|_| CiError::Parse(format!("line {}: bad value {:?}", lineno + 1, field)))
}

/// Write `ham` in FCIDUMP format, one record per symmetry-unique non-zero integral
pub fn write_fcidump<W: Write>(writer: &mut W, ham: &Hamiltonian, nelec: usize, ms2: i64) -> Result<()> {
    let n = ham.nbasis;
    writeln!(writer, " &FCI NORB={},NELEC={},MS2={},", n, nelec, ms2)?;
    writeln!(writer, "  ORBSYM={}", "1,".repeat(n))?;
    writeln!(writer, "  ISYM=1,")?;
    writeln!(writer, " &END")?;

    for p in 0..n {
        for q in 0..=p {
            for r in 0..=p {
                let smax = if r == p { q } else { r };
                for s in 0..=smax {
                    let value = ham.two(p, q, r, s);
                    if value != 0.0 {
                        writeln!(writer, "{:>24.16E} {:>4} {:>4} {:>4} {:>4}", value, p + 1, q + 1, r + 1, s + 1)?;
                    }
                }
            }
        }
    }
    for p in 0..n {
        for q in 0..=p {
            let value = ham.one(p, q);
            if value != 0.0 {
                writeln!(writer, "{:>24.16E} {:>4} {:>4} {:>4} {:>4}", value, p + 1, q + 1, 0, 0)?;
            }
        }
    }
    writeln!(writer, "{:>24.16E} {:>4} {:>4} {:>4} {:>4}", ham.ecore, 0, 0, 0, 0)?;
    Ok(())
}
