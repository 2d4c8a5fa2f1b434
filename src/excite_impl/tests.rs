//! Tests for excitation enumeration

#[cfg(test)]
mod tests {
    use super::super::{all_dets, connections, excitations, excited_strings, seniority_dets};
    use crate::bitdet;
    use crate::wfn_impl::{binomial, Space};
    use std::collections::HashSet;

    #[test]
    fn test_excited_strings_counts() {
        let string = bitdet::from_occs(&[0, 1, 2], 1);
        for level in 0..=3 {
            let produced: Vec<_> = excited_strings(&string, 7, level).collect();
            assert_eq!(produced.len(), binomial(3, level) * binomial(4, level));
            let unique: HashSet<_> = produced.iter().cloned().collect();
            assert_eq!(unique.len(), produced.len());
            for det in &produced {
                assert_eq!(bitdet::popcount(det), 3);
                assert_eq!(bitdet::excitation_level(det, &string), level);
            }
        }
    }

    #[test]
    fn test_excited_strings_too_deep() {
        let string = bitdet::from_occs(&[0, 1], 1);
        assert_eq!(excited_strings(&string, 4, 3).count(), 0);
    }

    #[test]
    fn test_excited_strings_cross_word_boundary() {
        let string = bitdet::from_occs(&[62, 63], 2);
        let produced: Vec<_> = excited_strings(&string, 66, 1).collect();
        assert_eq!(produced.len(), 2 * 64);
        assert!(produced.contains(&bitdet::from_occs(&[62, 65], 2)));
    }

    #[test]
    fn test_fci_excitations_preserve_spin_counts() {
        let space = Space::fci(5, 2, 1).unwrap();
        let hf = space.hartreefock();
        for level in 0..=3 {
            for det in excitations(&space, &hf, level) {
                space.validate(&det).unwrap();
                assert_eq!(bitdet::excitation_level(&det, &hf), level);
            }
        }
    }

    #[test]
    fn test_connections_doci() {
        let space = Space::doci(6, 2).unwrap();
        let hf = space.hartreefock();
        let conns: Vec<_> = connections(&space, &hf).collect();
        assert_eq!(conns.len(), 2 * 4);
        assert!(!conns.contains(&hf));
    }

    #[test]
    fn test_connections_spin_orbital() {
        let space = Space::genci(6, 2).unwrap();
        let hf = space.hartreefock();
        let count = connections(&space, &hf).count();
        assert_eq!(count, 2 * 4 + 1 * binomial(4, 2));
    }

    #[test]
    fn test_all_dets_complete() {
        let space = Space::fci(4, 2, 1).unwrap();
        let dets: HashSet<_> = all_dets(&space).collect();
        assert_eq!(dets.len(), space.ndet_full());
        for det in &dets {
            space.validate(det).unwrap();
        }
    }

    #[test]
    fn test_seniority_dets_partition() {
        let space = Space::fci(4, 2, 2).unwrap();
        let total: usize = (0..=4)
            .map(|s| seniority_dets(&space, s).count())
            .sum();
        assert_eq!(total, space.ndet_full());
        // alpha and beta strings differ by one orbital swap: 6 * 4
        assert_eq!(seniority_dets(&space, 2).count(), 24);
        assert_eq!(seniority_dets(&space, 4).count(), 6);
    }
}
