//! Integration tests for the bundled demos and the external solver driver.

use carousel::Network;
use carousel_sim::demo;
use float_cmp::assert_approx_eq;
use rstest::rstest;

#[test_log::test]
fn test_binary_demo_assembles() {
    let network = demo::binary_smb().unwrap();
    let process = network.build().unwrap();

    let q_1 = (4.14e-8 + 0.787 * 2.0e-8) / (1.0 - 0.752 * 0.787);
    assert_approx_eq!(f64, process.unit_flow("zone_I").unwrap(), q_1, epsilon = 1e-15);
    assert_eq!(process.stages().len(), 8);
}

#[test_log::test]
fn test_ternary_demo_assembles() {
    let network = demo::ternary_smb().unwrap();
    let process = network.build().unwrap();

    let loop_share = 0.3562 * 0.5581 * 0.776;
    let q_1 = (2.34e-7 + 0.776 * 1.67e-8) / (1.0 - loop_share);
    assert_approx_eq!(f64, process.unit_flow("zone_I").unwrap(), q_1, epsilon = 1e-15);
    assert_eq!(process.stages().len(), 5);
}

#[rstest]
#[case::binary(demo::binary_smb().unwrap())]
#[case::ternary(demo::ternary_smb().unwrap())]
fn test_demo_mass_closure(#[case] network: Network) {
    let process = network.build().unwrap();

    let inflow: f64 = network
        .units()
        .filter(|u| u.is_source())
        .filter_map(|u| process.unit_flow(u.name()))
        .sum();
    let outflow: f64 = network
        .units()
        .filter(|u| u.is_sink())
        .filter_map(|u| process.unit_flow(u.name()))
        .sum();

    assert_approx_eq!(f64, inflow, outflow, epsilon = 1e-15);
}

/// Serializing a demo to XML and reading it back must reproduce the same
/// units, schedule and resolved flows.
#[rstest]
#[case::binary(demo::binary_smb().unwrap())]
#[case::ternary(demo::ternary_smb().unwrap())]
fn test_demo_document_round_trip(#[case] network: Network) {
    let process = network.build().unwrap();
    let document = process.document();

    let xml = carousel::schema::serialize(&document).unwrap();
    let parsed: carousel::schema::CarouselProcess = carousel::schema::deserialize(&xml).unwrap();
    parsed.check_version().unwrap();

    let rebuilt = Network::from_document(&parsed).unwrap();
    assert_eq!(rebuilt.name(), network.name());
    assert_eq!(rebuilt.n_columns(), network.n_columns());
    assert_approx_eq!(f64, rebuilt.switch_time(), network.switch_time());

    let reprocess = rebuilt.build().unwrap();
    for (unit, flow) in process.unit_flows() {
        assert_approx_eq!(
            f64,
            reprocess.unit_flow(unit).unwrap(),
            flow,
            epsilon = 1e-15
        );
    }
}

#[cfg(unix)]
mod external_solver {
    use super::*;
    use carousel_sim::solver::{ExternalSolver, ProcessSolver, SolveError};
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    fn fake_solver(dir: &Path, script: &str) -> PathBuf {
        let path = dir.join("fake-solver.sh");
        std::fs::write(&path, script).unwrap();
        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_mode(0o755);
        std::fs::set_permissions(&path, permissions).unwrap();
        path
    }

    #[test_log::test]
    fn test_external_solver_reads_solution() {
        let dir = tempfile::tempdir().unwrap();
        let script = "#!/bin/sh\nprintf 'time,raffinate.A\\n0.0,1.0\\n1.0,2.0\\n' > \"$2\"\n";
        let binary = fake_solver(dir.path(), script);

        let document = demo::binary_smb().unwrap().build().unwrap().document();
        let mut solver = ExternalSolver::new(&binary);
        let solution = solver.solve(&document).unwrap();

        assert_eq!(solution.num_rows(), 2);
        assert_eq!(solution.schema().field(0).name(), "time");
    }

    #[test_log::test]
    fn test_solver_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let script = "#!/bin/sh\necho 'no convergence' >&2\nexit 3\n";
        let binary = fake_solver(dir.path(), script);

        let document = demo::binary_smb().unwrap().build().unwrap().document();
        let err = ExternalSolver::new(&binary).solve(&document).unwrap_err();
        match err {
            SolveError::Failed { stderr, .. } => assert!(stderr.contains("no convergence")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_solver_writing_nothing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let binary = fake_solver(dir.path(), "#!/bin/sh\nexit 0\n");

        let document = demo::binary_smb().unwrap().build().unwrap().document();
        let err = ExternalSolver::new(&binary).solve(&document).unwrap_err();
        assert!(matches!(err, SolveError::MissingOutput { .. }));
    }

    #[test]
    fn test_missing_solver_binary() {
        let document = demo::binary_smb().unwrap().build().unwrap().document();
        let err = ExternalSolver::new("/nonexistent/solver")
            .solve(&document)
            .unwrap_err();
        assert!(matches!(err, SolveError::Launch { .. }));
    }
}
