//! Combinatorial enumeration of excited determinants

use crate::bitdet::{self, Word};
use crate::wfn_impl::{Space, WfnKind};
use itertools::Itertools;

/// Boxed lazy sequence of packed determinants
pub type DetIter = Box<dyn Iterator<Item = Vec<Word>> + Send>;

/// All strings reachable from `string` by exactly `level` replacements
///
/// Holes are drawn from the occupied orbitals and particles from the empty
/// orbitals below `nbits`, each as an ordered combination, so no string is
/// produced twice. `level == 0` yields the reference itself.
pub fn excited_strings(
    string: &[Word],
    nbits: usize,
    level: usize,
) -> impl Iterator<Item = Vec<Word>> + Send {
    let base = string.to_vec();
    let occ = bitdet::occs(string);
    let vir = bitdet::virs(string, nbits);

    occ.into_iter().combinations(level).flat_map(move |holes| {
        let base = base.clone();
        vir.clone()
            .into_iter()
            .combinations(level)
            .map(move |parts| {
                let mut det = base.clone();
                for &i in &holes {
                    bitdet::clear_bit(&mut det, i);
                }
                for &a in &parts {
                    bitdet::set_bit(&mut det, a);
                }
                det
            })
    })
}

/// All determinants of `space` exactly `level` replacements away from `reference`
///
/// For [`WfnKind::Fci`] the level is the total over both spin strings and
/// replacements never flip spin.
pub fn excitations(space: &Space, reference: &[Word], level: usize) -> DetIter {
    let nbasis = space.nbasis;
    match space.kind {
        WfnKind::Doci | WfnKind::Genci => Box::new(excited_strings(reference, nbasis, level)),
        WfnKind::Fci => {
            let (alpha, beta) = reference.split_at(space.nword);
            let alpha = alpha.to_vec();
            let beta = beta.to_vec();
            Box::new((0..=level).flat_map(move |level_up| {
                let beta = beta.clone();
                excited_strings(&alpha, nbasis, level_up).flat_map(move |up| {
                    excited_strings(&beta, nbasis, level - level_up).map(move |dn| {
                        let mut det = up.clone();
                        det.extend_from_slice(&dn);
                        det
                    })
                })
            }))
        }
    }
}

/// Determinants with a possibly non-zero Hamiltonian element to `det`, itself excluded
///
/// Pair wavefunctions only couple through single pair transfers; the
/// spin-orbital variants couple through single and double replacements.
pub fn connections(space: &Space, det: &[Word]) -> DetIter {
    match space.kind {
        WfnKind::Doci => excitations(space, det, 1),
        WfnKind::Fci | WfnKind::Genci => {
            Box::new(excitations(space, det, 1).chain(excitations(space, det, 2)))
        }
    }
}

/// Every determinant of `space`, in lexicographic order of occupations
pub fn all_dets(space: &Space) -> DetIter {
    let nbasis = space.nbasis;
    let nword = space.nword;
    match space.kind {
        WfnKind::Doci | WfnKind::Genci => Box::new(
            (0..nbasis)
                .combinations(space.nocc_up)
                .map(move |occs| bitdet::from_occs(&occs, nword)),
        ),
        WfnKind::Fci => {
            let nocc_dn = space.nocc_dn;
            Box::new(
                (0..nbasis)
                    .combinations(space.nocc_up)
                    .flat_map(move |up| {
                        let alpha = bitdet::from_occs(&up, nword);
                        (0..nbasis).combinations(nocc_dn).map(move |dn| {
                            let mut det = alpha.clone();
                            det.extend(bitdet::from_occs(&dn, nword));
                            det
                        })
                    }),
            )
        }
    }
}

/// Every determinant of `space` with exactly `seniority` singly occupied orbitals
pub fn seniority_dets(space: &Space, seniority: usize) -> DetIter {
    let space = *space;
    Box::new(all_dets(&space).filter(move |det| {
        space
            .seniority(det)
            .map(|s| s == seniority)
            .unwrap_or(false)
    }))
}
