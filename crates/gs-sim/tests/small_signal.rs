//! Small-signal entry point on the simulation object.

use nalgebra::DVector;

use gs_devices::{DeviceModel, InfiniteSource, SynchronousGenerator};
use gs_network::{Injection, Network, PrescribedPowerFlow};
use gs_sim::{SimError, Simulation};
use gs_ssa::{DynamicSystem, ResidualForm, ResidualSystem};

/// Damped oscillator in residual form, standing in for the integration
/// engine's callback.
struct Oscillator;

impl ResidualSystem for Oscillator {
    fn dim(&self) -> usize {
        2
    }

    fn residual(&self, out: &mut DVector<f64>, dx: &DVector<f64>, x: &DVector<f64>, _t: f64) {
        out[0] = dx[0] - x[1];
        out[1] = dx[1] - (-4.0 * x[0] - 0.4 * x[1]);
    }

    fn mass_diagonal(&self) -> DVector<f64> {
        DVector::from_element(2, 1.0)
    }
}

fn one_bus_network() -> Network {
    let mut net = Network::new();
    let b1 = net.add_bus("infinite");
    net.add_device(
        "source",
        b1,
        Injection { p: 0.0, q: 0.0 },
        DeviceModel::InfiniteSource(InfiniteSource::new(0.0, 0.1).unwrap()),
    )
    .unwrap();
    net
}

#[test]
fn caller_supplied_point_bypasses_build_state() {
    let sim = Simulation::new(one_bus_network(), PrescribedPowerFlow::flat(1));

    let system = ResidualForm(&Oscillator);
    let point = DVector::zeros(2);
    let result = sim.small_signal(&system, Some(&point)).unwrap();

    assert!(result.stable);
    assert_eq!(result.eigenvalues.len(), 2);
    // Lightly damped complex pair of the oscillator.
    assert!(result.eigenvalues.iter().all(|l| l.re < 0.0));
    assert!(result.eigenvalues.iter().any(|l| l.im != 0.0));
}

#[test]
fn default_point_requires_a_ready_build() {
    let sim = Simulation::new(one_bus_network(), PrescribedPowerFlow::flat(1));

    let system = ResidualForm(&Oscillator);
    let err = sim.small_signal(&system, None).unwrap_err();
    assert!(matches!(err, SimError::NotReady { .. }));
}

#[test]
fn wrong_point_length_is_rejected() {
    let sim = Simulation::new(one_bus_network(), PrescribedPowerFlow::flat(1));

    let system = ResidualForm(&Oscillator);
    let point = DVector::zeros(5);
    let err = sim.small_signal(&system, Some(&point)).unwrap_err();
    assert!(matches!(err, SimError::PointLength { got: 5, .. }));
}

/// A generator without any source in the network has no angle reference;
/// the analysis still runs and classifies.
#[test]
fn analysis_runs_without_angle_reference() {
    let mut net = Network::new();
    let b1 = net.add_bus("machine");
    net.add_device(
        "gen",
        b1,
        Injection { p: 1.0, q: 0.0 },
        DeviceModel::SynchronousGenerator(
            SynchronousGenerator::new(1.81, 1.76, 0.3, 0.65, 0.003, 8.0, 1.0, 3.5, 2.0, None)
                .unwrap(),
        ),
    )
    .unwrap();
    assert!(!net.has_angle_reference());

    let sim = Simulation::new(net, PrescribedPowerFlow::flat(1));
    let system = ResidualForm(&Oscillator);
    let point = DVector::zeros(2);
    assert!(sim.small_signal(&system, Some(&point)).is_ok());
}

/// DynamicSystem is object-safe enough to accept either form.
#[test]
fn derivative_form_works_directly() {
    struct Direct;
    impl DynamicSystem for Direct {
        fn dim(&self) -> usize {
            1
        }
        fn derivative(&self, out: &mut DVector<f64>, x: &DVector<f64>, _t: f64) {
            out[0] = -0.5 * x[0];
        }
        fn mass_diagonal(&self) -> DVector<f64> {
            DVector::from_element(1, 1.0)
        }
    }

    let sim = Simulation::new(one_bus_network(), PrescribedPowerFlow::flat(1));
    let result = sim
        .small_signal(&Direct, Some(&DVector::zeros(1)))
        .unwrap();
    assert!((result.eigenvalues[0].re + 0.5).abs() < 1e-8);
    assert!(result.stable);
}
