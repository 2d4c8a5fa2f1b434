//! Tests for the determinant store

#[cfg(test)]
mod tests {
    use super::super::{binomial, Space, Wavefunction, WfnKind};
    use crate::bitdet;
    use crate::error::CiError;

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(10, 2), 45);
        assert_eq!(binomial(10, 0), 1);
        assert_eq!(binomial(4, 5), 0);
        assert_eq!(binomial(200, 100), usize::MAX);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("doci".parse::<WfnKind>().unwrap(), WfnKind::Doci);
        assert_eq!("FCI".parse::<WfnKind>().unwrap(), WfnKind::Fci);
        assert_eq!("general".parse::<WfnKind>().unwrap(), WfnKind::Genci);
        assert!("casscf".parse::<WfnKind>().is_err());
        for kind in [WfnKind::Doci, WfnKind::Fci, WfnKind::Genci] {
            assert_eq!(WfnKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn test_space_rejects_bad_shapes() {
        assert!(Space::doci(0, 0).is_err());
        assert!(Space::doci(4, 5).is_err());
        assert!(Space::new(WfnKind::Doci, 4, 2, 1).is_err());
        assert!(Space::new(WfnKind::Genci, 4, 2, 1).is_err());
        let space = Space::fci(70, 3, 2).unwrap();
        assert_eq!(space.nword, 2);
        assert_eq!(space.stride(), 4);
        assert_eq!(space.block_bits(), 128);
        assert_eq!(space.spin_orbital(128 + 5), 75);
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut wfn = Wavefunction::doci(6, 2).unwrap();
        let det = wfn.space().det_from_occs(&[1, 4]).unwrap();
        assert_eq!(wfn.add(&det).unwrap(), Some(0));
        assert_eq!(wfn.add(&det).unwrap(), None);
        assert_eq!(wfn.len(), 1);
        assert_eq!(wfn.index_of(&det), Some(0));
        assert_eq!(wfn.det(0).unwrap(), det.as_slice());
    }

    #[test]
    fn test_add_strict_reports_duplicate() {
        let mut wfn = Wavefunction::doci(6, 2).unwrap();
        wfn.add_hartreefock();
        let hf = wfn.space().hartreefock();
        match wfn.add_strict(&hf) {
            Err(CiError::Duplicate(0)) => {}
            other => panic!("expected duplicate, got {:?}", other),
        }
    }

    #[test]
    fn test_add_rejects_invalid_det() {
        let mut wfn = Wavefunction::doci(6, 2).unwrap();
        let three = bitdet::from_occs(&[0, 1, 2], 1);
        assert!(matches!(wfn.add(&three), Err(CiError::FormatMismatch(_))));
        let outside = bitdet::from_occs(&[0, 7], 1);
        assert!(matches!(wfn.add(&outside), Err(CiError::FormatMismatch(_))));
        assert!(matches!(wfn.add(&[0, 0]), Err(CiError::FormatMismatch(_))));
        assert!(wfn.is_empty());
    }

    #[test]
    fn test_add_all_doci() {
        let mut wfn = Wavefunction::doci(10, 2).unwrap();
        assert_eq!(wfn.add_all(), 45);
        assert_eq!(wfn.len(), 45);
        assert_eq!(wfn.add_all(), 0);
        for det in wfn.iter() {
            assert_eq!(bitdet::popcount(det), 2);
        }
    }

    #[test]
    fn test_add_all_fci() {
        let mut wfn = Wavefunction::fci(5, 2, 1).unwrap();
        assert_eq!(wfn.add_all(), binomial(5, 2) * binomial(5, 1));
        assert_eq!(wfn.len(), 50);
    }

    #[test]
    fn test_add_excited_levels() {
        let mut wfn = Wavefunction::doci(8, 3).unwrap();
        let hf = wfn.space().hartreefock();
        wfn.add_hartreefock();
        let singles = wfn.add_excited(&hf, 1).unwrap();
        assert_eq!(singles, 3 * 5);
        let doubles = wfn.add_excited(&hf, 2).unwrap();
        assert_eq!(doubles, binomial(3, 2) * binomial(5, 2));
        for det in wfn.iter() {
            assert!(bitdet::excitation_level(det, &hf) <= 2);
        }

        let mut capped = Wavefunction::doci(8, 3).unwrap();
        capped.add_excited_up_to(&hf, 2).unwrap();
        assert_eq!(capped.len(), wfn.len());
        assert_eq!(capped.to_det_array(), wfn.to_det_array());
    }

    #[test]
    fn test_add_excited_fci_splits_level() {
        let mut wfn = Wavefunction::fci(4, 2, 2).unwrap();
        let hf = wfn.space().hartreefock();
        let singles = wfn.add_excited(&hf, 1).unwrap();
        // 2 holes x 2 particles in each spin string
        assert_eq!(singles, 8);
        let doubles = wfn.add_excited(&hf, 2).unwrap();
        // same-spin doubles (1 each) plus opposite-spin products (4 x 4)
        assert_eq!(doubles, 1 + 1 + 16);
    }

    #[test]
    fn test_add_seniority() {
        let mut wfn = Wavefunction::fci(4, 2, 2).unwrap();
        let zero = wfn.add_seniority(0).unwrap();
        assert_eq!(zero, binomial(4, 2));
        for det in wfn.iter() {
            assert_eq!(wfn.space().seniority(det).unwrap(), 0);
        }

        let mut doci = Wavefunction::doci(4, 2).unwrap();
        assert_eq!(doci.add_seniority(2).unwrap(), 0);
        assert_eq!(doci.add_seniority(0).unwrap(), 6);

        let mut genci = Wavefunction::genci(4, 2).unwrap();
        assert!(matches!(
            genci.add_seniority(0),
            Err(CiError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_det_out_of_range() {
        let mut wfn = Wavefunction::doci(4, 2).unwrap();
        wfn.add_hartreefock();
        match wfn.det(3) {
            Err(CiError::OutOfRange { index: 3, len: 1 }) => {}
            other => panic!("expected out of range, got {:?}", other),
        }
        let mut out = vec![0; 1];
        assert!(wfn.copy_det(1, &mut out).is_err());
        wfn.copy_det(0, &mut out).unwrap();
        assert_eq!(out, wfn.space().hartreefock());
    }

    #[test]
    fn test_det_array_round_trip() {
        let mut wfn = Wavefunction::fci(6, 2, 2).unwrap();
        wfn.add_all();
        let space = *wfn.space();
        let rebuilt = Wavefunction::from_det_array(space, wfn.len(), space.nword, wfn.to_det_array()).unwrap();
        assert_eq!(rebuilt.len(), wfn.len());
        for (i, det) in wfn.iter().enumerate() {
            assert_eq!(rebuilt.index_of(det), Some(i));
        }

        let occs = wfn.to_occs_array();
        let from_occs = Wavefunction::from_occs_array(space, wfn.len(), &occs).unwrap();
        assert_eq!(from_occs.to_det_array(), wfn.to_det_array());
    }

    #[test]
    fn test_det_array_format_errors() {
        let space = Space::doci(6, 2).unwrap();
        let words = vec![0b11, 0b101];
        assert!(matches!(
            Wavefunction::from_det_array(space, 2, 2, &words),
            Err(CiError::FormatMismatch(_))
        ));
        assert!(matches!(
            Wavefunction::from_det_array(space, 3, 1, &words),
            Err(CiError::FormatMismatch(_))
        ));
        assert!(matches!(
            Wavefunction::from_det_array(space, 2, 1, &[0b11, 0b11]),
            Err(CiError::FormatMismatch(_))
        ));
        assert!(matches!(
            Wavefunction::from_occs_array(space, 1, &[0, 0]),
            Err(CiError::FormatMismatch(_))
        ));
    }

    #[test]
    fn test_wide_determinants() {
        let mut wfn = Wavefunction::doci(100, 2).unwrap();
        assert_eq!(wfn.space().nword, 2);
        let index = wfn.add_from_occs(&[3, 97]).unwrap().unwrap();
        assert_eq!(wfn.to_occs_array(), vec![3, 97]);
        let det = wfn.det(index).unwrap().to_vec();
        assert_eq!(det[0], 1 << 3);
        assert_eq!(det[1], 1 << 33);
    }

    #[test]
    fn test_clear_and_squeeze() {
        let mut wfn = Wavefunction::doci(6, 3).unwrap();
        wfn.add_all();
        wfn.squeeze();
        assert_eq!(wfn.len(), 20);
        wfn.clear();
        assert!(wfn.is_empty());
        assert_eq!(wfn.add_hartreefock(), Some(0));
    }

    #[test]
    fn test_merge_rejects_foreign_records() {
        let mut wfn = Wavefunction::doci(4, 2).unwrap();
        wfn.add_hartreefock();
        let before = wfn.to_det_array().to_vec();

        // bits beyond nbasis, then a record of the wrong width
        for batch in [vec![vec![0b1001u64], vec![0b1111_0111]], vec![vec![0b0110], vec![0, 0]]] {
            assert!(matches!(wfn.merge(batch), Err(CiError::FormatMismatch(_))));
            assert_eq!(wfn.len(), 1);
            assert_eq!(wfn.to_det_array(), before.as_slice());
        }

        let added = wfn.merge(vec![vec![0b0011u64], vec![0b0101], vec![0b0101]]).unwrap();
        assert_eq!(added, 1);
        assert_eq!(wfn.len(), 2);
        assert_eq!(wfn.index_of(&[0b0101]), Some(1));
    }

    #[test]
    fn test_declared_count_overflow() {
        let space = Space::fci(4, 2, 2).unwrap();
        assert!(matches!(
            Wavefunction::from_det_array(space, usize::MAX, space.nword, &[]),
            Err(CiError::FormatMismatch(_))
        ));
        assert!(matches!(
            Wavefunction::from_occs_array(space, usize::MAX / 2, &[]),
            Err(CiError::FormatMismatch(_))
        ));
    }
}
