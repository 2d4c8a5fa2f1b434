//! End-to-end tests: FCIDUMP input, fixed-space and selected CI, RDMs and
//! wavefunction files.

use nalgebra::DMatrix;
use selci::io::{load_wfn, parse_fcidump, read_fcidump, save_wfn, write_fcidump};
use selci::{compute_rdms, rdm_energy, Hamiltonian, HciDriver, SolverParams, SparseOp, Wavefunction};
use std::path::PathBuf;

/// H2 / STO-3G at 0.7414 Angstrom
const H2_FCIDUMP: &str = " &FCI NORB=2,NELEC=2,MS2=0,
  ORBSYM=1,5,
  ISYM=1,
 &END
  0.6744931491E+00   1   1   1   1
  0.6634720998E+00   2   2   1   1
  0.1812875477E+00   2   1   2   1
  0.6973545713E+00   2   2   2   2
 -0.1252477303E+01   1   1   0   0
 -0.4759344611E+00   2   2   0   0
  0.7137758743E+00   0   0   0   0
";

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("selci_{}_{}", std::process::id(), name))
}

/// Open Hubbard chain with a site-energy gradient
fn hubbard_chain(n: usize, t: f64, u: f64) -> Hamiltonian {
    let mut one = DMatrix::zeros(n, n);
    for i in 0..n {
        one[(i, i)] = 0.1 * i as f64;
        if i + 1 < n {
            one[(i, i + 1)] = -t;
            one[(i + 1, i)] = -t;
        }
    }
    let mut two = vec![0.0; n * n * n * n];
    for i in 0..n {
        two[((i * n + i) * n + i) * n + i] = u;
    }
    Hamiltonian::new(0.0, one, two).unwrap()
}

fn lowest(wfn: &Wavefunction, ham: &Hamiltonian) -> f64 {
    SparseOp::new(wfn, ham)
        .unwrap()
        .solve(1, 1e-10, 1000, None)
        .unwrap()
        .ground_energy()
}

#[test]
fn test_h2_reference_energies() {
    let dump = parse_fcidump(H2_FCIDUMP).unwrap();
    let ham = &dump.ham;
    let (up, dn) = dump.header.occupations().unwrap();

    let mut hf = Wavefunction::fci(2, up, dn).unwrap();
    hf.add_hartreefock();
    let e_hf = lowest(&hf, ham);
    assert!((e_hf - (-1.116686)).abs() < 1e-6);

    let mut doci = Wavefunction::doci(2, 1).unwrap();
    doci.add_all();
    let e_doci = lowest(&doci, ham);

    let mut fci = Wavefunction::fci(2, up, dn).unwrap();
    fci.add_all();
    let e_fci = lowest(&fci, ham);

    assert!((e_fci - (-1.137271)).abs() < 1e-6);
    assert!((e_fci - e_doci).abs() < 1e-9);
}

#[test]
fn test_fcidump_file_round_trip() {
    let ham = hubbard_chain(4, 1.0, 4.0);
    let path = scratch_path("hubbard.fcidump");
    let mut file = std::fs::File::create(&path).unwrap();
    write_fcidump(&mut file, &ham, 4, 0).unwrap();
    drop(file);

    let dump = read_fcidump(&path).unwrap();
    std::fs::remove_file(&path).ok();
    assert_eq!(dump.header.norb, 4);
    assert_eq!(dump.header.occupations().unwrap(), (2, 2));

    let mut wfn = Wavefunction::fci(4, 2, 2).unwrap();
    wfn.add_all();
    assert!((lowest(&wfn, &dump.ham) - lowest(&wfn, &ham)).abs() < 1e-12);
}

#[test]
fn test_selected_ci_reaches_full_ci() {
    let ham = hubbard_chain(6, 1.0, 2.0);
    let mut full = Wavefunction::fci(6, 3, 3).unwrap();
    full.add_all();
    let exact = lowest(&full, &ham);

    let mut wfn = Wavefunction::fci(6, 3, 3).unwrap();
    let mut driver = HciDriver::new(1e-9, SolverParams::new(1, 1e-10, 1000), 30).unwrap();
    let summary = driver.run(&mut wfn, &ham).unwrap();
    assert!(summary.converged);
    assert!(wfn.len() <= full.len());
    assert!((summary.spectrum.ground_energy() - exact).abs() < 1e-7);

    let mut coarse = Wavefunction::fci(6, 3, 3).unwrap();
    let mut driver = HciDriver::new(5e-2, SolverParams::new(1, 1e-10, 1000), 30).unwrap();
    let rough = driver.run(&mut coarse, &ham).unwrap();
    assert!(coarse.len() < wfn.len());
    assert!(rough.spectrum.ground_energy() >= exact - 1e-9);
}

#[test]
fn test_rdm_energy_of_selected_state() {
    let ham = hubbard_chain(5, 1.0, 3.0);
    let mut wfn = Wavefunction::fci(5, 3, 2).unwrap();
    let mut driver = HciDriver::new(1e-4, SolverParams::new(1, 1e-10, 1000), 10).unwrap();
    let summary = driver.run(&mut wfn, &ham).unwrap();

    let rdms = compute_rdms(&wfn, summary.spectrum.ground_state().as_slice()).unwrap();
    let energy = rdm_energy(wfn.space(), &ham, &rdms).unwrap();
    assert!((energy - summary.spectrum.ground_energy()).abs() < 1e-8);
}

#[test]
fn test_wavefunction_file_restart() {
    let ham = hubbard_chain(5, 1.0, 3.0);
    let mut wfn = Wavefunction::fci(5, 2, 2).unwrap();
    let hf = wfn.space().hartreefock();
    wfn.add_excited_up_to(&hf, 2).unwrap();
    let energy = lowest(&wfn, &ham);

    let path = scratch_path("restart.wfn");
    save_wfn(&path, &wfn).unwrap();
    let restored = load_wfn(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(restored.to_det_array(), wfn.to_det_array());
    assert!((lowest(&restored, &ham) - energy).abs() < 1e-12);
}
