//! Full initialization pipeline on a single-machine-infinite-bus network.

use gs_devices::{DeviceModel, DynamicBranch, InfiniteSource, SynchronousGenerator};
use gs_network::{
    BranchModel, FailingPowerFlow, Injection, Network, PrescribedPowerFlow,
};
use gs_sim::{BuildError, BuildStatus, Simulation};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn smib_network(dynamic_line: bool) -> Network {
    let mut net = Network::new();
    let b1 = net.add_bus("infinite");
    let b2 = net.add_bus("machine");

    net.add_device(
        "source",
        b1,
        Injection { p: -1.0, q: 0.0 },
        DeviceModel::InfiniteSource(InfiniteSource::new(0.0, 0.1).unwrap()),
    )
    .unwrap();

    net.add_device(
        "gen",
        b2,
        Injection { p: 1.0, q: 0.0 },
        DeviceModel::SynchronousGenerator(
            SynchronousGenerator::new(1.81, 1.76, 0.3, 0.65, 0.003, 8.0, 1.0, 3.5, 2.0, None)
                .unwrap(),
        ),
    )
    .unwrap();

    let model = if dynamic_line {
        BranchModel::Dynamic(DynamicBranch::new(0.01, 0.1, 0.0).unwrap())
    } else {
        BranchModel::Static {
            r: 0.01,
            x: 0.1,
            b: 0.0,
        }
    };
    net.add_branch("line", b1, b2, model).unwrap();
    net
}

#[test]
fn build_reaches_ready_and_reads_back_states() {
    init_tracing();
    let pf = PrescribedPowerFlow::flat(2);
    let mut sim = Simulation::new(smib_network(false), pf);

    assert_eq!(sim.status(), BuildStatus::Incomplete);
    assert!(sim.initialize());
    assert_eq!(sim.status(), BuildStatus::Ready);

    let ic = sim.initial_conditions();

    // Generator on the infinite bus: positive rotor angle, synchronous speed.
    let machine = &ic["gen"];
    assert!(machine["delta"] > 0.0);
    assert!((machine["omega"] - 1.0).abs() < 1e-12);

    // Torque setpoint covers the injection plus stator loss.
    let tau = sim.setpoints()["gen"].torque_ref.unwrap();
    assert!(tau >= 1.0 && tau < 1.05);

    // No dynamic branch, so no branch states were laid out.
    assert!(!ic.contains_key("line"));
    assert!(sim.validation_issues().is_empty());
}

#[test]
fn dynamic_branch_stage_runs_only_when_present() {
    let pf = PrescribedPowerFlow::new(vec![1.02, 1.0], vec![0.05, 0.0]);
    let mut sim = Simulation::new(smib_network(true), pf);

    assert!(sim.initialize());

    let ic = sim.initial_conditions();
    let line = &ic["line"];
    // Voltages differ across the line, so the current states are nonzero.
    assert!(line["i_re"].abs() + line["i_im"].abs() > 1e-6);
}

#[test]
fn power_flow_failure_is_fatal() {
    let mut sim = Simulation::new(smib_network(false), FailingPowerFlow);

    assert_eq!(sim.build(), BuildStatus::Failed);
    assert!(matches!(
        sim.build_error(),
        Some(BuildError::PowerFlow(_))
    ));
}

#[test]
fn overvoltage_fails_validation_with_itemized_entries() {
    // 1.5 pu at the machine bus must be flagged.
    let pf = PrescribedPowerFlow::new(vec![1.0, 1.5], vec![0.0, 0.0]);
    let mut sim = Simulation::new(smib_network(false), pf);

    assert_eq!(sim.build(), BuildStatus::Failed);
    let issues = sim.validation_issues();
    assert!(!issues.is_empty());
    assert!(issues.iter().any(|i| i.what.contains("Voltage entry")));
}

#[test]
fn initial_conditions_serialize_for_reporting() {
    let mut sim = Simulation::new(smib_network(false), PrescribedPowerFlow::flat(2));
    assert!(sim.initialize());

    let json = serde_json::to_string(&sim.initial_conditions()).unwrap();
    assert!(json.contains("\"gen\""));
    assert!(json.contains("\"delta\""));
    assert!(json.contains("\"e_mag\""));
}

#[test]
fn rebuilding_after_failure_recovers() {
    let mut sim = Simulation::new(
        smib_network(false),
        PrescribedPowerFlow::new(vec![1.0, 1.5], vec![0.0, 0.0]),
    );
    assert_eq!(sim.build(), BuildStatus::Failed);

    let mut sim = Simulation::new(smib_network(false), PrescribedPowerFlow::flat(2));
    assert_eq!(sim.build(), BuildStatus::Ready);
    assert!(sim.build_error().is_none());
}
