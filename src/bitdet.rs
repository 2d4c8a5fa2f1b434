//! Bit-packed determinant strings
//!
//! A determinant string is a slice of `u64` words where bit `p` of the
//! string (word `p / 64`, bit `p % 64`) is set when orbital `p` is occupied.
//! Every helper here works on plain slices so that the store can keep all
//! determinants in one flat arena.

/// Machine word used for packing occupations.
pub type Word = u64;

/// Number of bits per packed word.
pub const WORD_BITS: usize = Word::BITS as usize;

/// Number of words required to hold `nbits` orbitals (at least one).
#[inline]
pub fn nword_for(nbits: usize) -> usize {
    ((nbits + WORD_BITS - 1) / WORD_BITS).max(1)
}

#[inline(always)]
pub fn test_bit(det: &[Word], p: usize) -> bool {
    (det[p / WORD_BITS] >> (p % WORD_BITS)) & 1 == 1
}

#[inline(always)]
pub fn set_bit(det: &mut [Word], p: usize) {
    det[p / WORD_BITS] |= (1 as Word) << (p % WORD_BITS);
}

#[inline(always)]
pub fn clear_bit(det: &mut [Word], p: usize) {
    det[p / WORD_BITS] &= !((1 as Word) << (p % WORD_BITS));
}

/// Number of occupied orbitals in the string.
#[inline]
pub fn popcount(det: &[Word]) -> usize {
    det.iter().map(|w| w.count_ones() as usize).sum()
}

/// Collect the occupied orbital indices in ascending order into `out`.
pub fn fill_occs(det: &[Word], out: &mut Vec<usize>) {
    out.clear();
    for (iword, &word) in det.iter().enumerate() {
        let mut w = word;
        while w != 0 {
            let bit = w.trailing_zeros() as usize;
            out.push(iword * WORD_BITS + bit);
            w &= w - 1;
        }
    }
}

/// Occupied orbital indices in ascending order.
pub fn occs(det: &[Word]) -> Vec<usize> {
    let mut out = Vec::with_capacity(popcount(det));
    fill_occs(det, &mut out);
    out
}

/// Unoccupied orbital indices below `nbits` in ascending order.
pub fn virs(det: &[Word], nbits: usize) -> Vec<usize> {
    (0..nbits).filter(|&p| !test_bit(det, p)).collect()
}

/// Pack a list of occupied orbitals into `nword` words.
pub fn from_occs(occs: &[usize], nword: usize) -> Vec<Word> {
    let mut det = vec![0; nword];
    for &p in occs {
        set_bit(&mut det, p);
    }
    det
}

/// True when no bit at or above `nbits` is set.
pub fn is_masked(det: &[Word], nbits: usize) -> bool {
    det.iter().enumerate().all(|(iword, &w)| {
        let lo = iword * WORD_BITS;
        if nbits >= lo + WORD_BITS {
            true
        } else if nbits <= lo {
            w == 0
        } else {
            w >> (nbits - lo) == 0
        }
    })
}

/// Number of set bits strictly between positions `lo` and `hi` (`lo < hi`).
pub fn count_between(det: &[Word], lo: usize, hi: usize) -> usize {
    if hi <= lo + 1 {
        return 0;
    }
    let (start, end) = (lo + 1, hi);
    let (w0, w1) = (start / WORD_BITS, (end - 1) / WORD_BITS);
    let mut count = 0;
    for iword in w0..=w1 {
        let mut w = det[iword];
        if iword == w0 {
            w &= Word::MAX << (start % WORD_BITS);
        }
        if iword == w1 {
            let top = end - iword * WORD_BITS;
            if top < WORD_BITS {
                w &= ((1 as Word) << top) - 1;
            }
        }
        count += w.count_ones() as usize;
    }
    count
}

/// Fermionic sign of moving an electron from `i` to `a` in `det`
/// (`i` occupied, `a` empty).
#[inline]
pub fn phase_single(det: &[Word], i: usize, a: usize) -> f64 {
    let n = if i < a {
        count_between(det, i, a)
    } else {
        count_between(det, a, i)
    };
    if n % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Move an electron from `i` to `a` in place.
#[inline]
pub fn excite(det: &mut [Word], i: usize, a: usize) {
    clear_bit(det, i);
    set_bit(det, a);
}

/// Holes (occupied in `bra` only) and particles (occupied in `ket` only).
pub fn differences(bra: &[Word], ket: &[Word]) -> (Vec<usize>, Vec<usize>) {
    let mut holes = Vec::new();
    let mut parts = Vec::new();
    for (iword, (&b, &k)) in bra.iter().zip(ket.iter()).enumerate() {
        let mut h = b & !k;
        while h != 0 {
            holes.push(iword * WORD_BITS + h.trailing_zeros() as usize);
            h &= h - 1;
        }
        let mut p = k & !b;
        while p != 0 {
            parts.push(iword * WORD_BITS + p.trailing_zeros() as usize);
            p &= p - 1;
        }
    }
    (holes, parts)
}

/// Number of orbital replacements separating two strings.
#[inline]
pub fn excitation_level(bra: &[Word], ket: &[Word]) -> usize {
    bra.iter()
        .zip(ket.iter())
        .map(|(&b, &k)| (b & !k).count_ones() as usize)
        .sum()
}
