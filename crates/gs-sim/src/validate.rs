//! Post-initialization sanity checks on the assembled state vector.

use nalgebra::DVector;

use gs_network::{Network, StateIndex};

/// Largest plausible per-unit voltage magnitude; entries are checked
/// against the band [-VOLTAGE_LIMIT, VOLTAGE_LIMIT].
pub const VOLTAGE_LIMIT: f64 = 1.3;

/// Plausible band for per-unit speed/frequency states.
pub const FREQUENCY_BAND: (f64, f64) = (0.8, 1.2);

/// One offending entry found during validation.
#[derive(Clone, Debug)]
pub struct ValidationIssue {
    /// Human-readable identity of the offending entry
    pub what: String,
    /// Offending value
    pub value: f64,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.what, self.value)
    }
}

/// Scan the assembled global vector for physically implausible entries.
///
/// Checks, in order: bus voltage magnitudes against the ±1.3 pu band,
/// per-unit frequency states against [0.8, 1.2], and non-finite values
/// anywhere — reported once per device holding any non-finite state, and
/// per component for bus voltages.
pub fn validate_states(
    x: &DVector<f64>,
    network: &Network,
    index: &StateIndex,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for bus in network.buses() {
        let (re, im) = index.bus_voltage(bus.id);
        let mag = (x[re] * x[re] + x[im] * x[im]).sqrt();
        if !mag.is_finite() {
            issues.push(ValidationIssue {
                what: format!("Non-finite voltage at bus {}", bus.name),
                value: mag,
            });
        } else if mag > VOLTAGE_LIMIT {
            issues.push(ValidationIssue {
                what: format!("Voltage entry at bus {} outside ±{} pu", bus.name, VOLTAGE_LIMIT),
                value: mag,
            });
        }
    }

    for device in network.devices() {
        let range = index
            .state_range(&device.name)
            .expect("every device claims a state range");

        for &local in device.model.frequency_states() {
            let value = x[range.start + local];
            if value.is_finite() && !(FREQUENCY_BAND.0..=FREQUENCY_BAND.1).contains(&value) {
                issues.push(ValidationIssue {
                    what: format!(
                        "Frequency state {} of {} outside [{}, {}] pu",
                        device.model.state_names()[local],
                        device.name,
                        FREQUENCY_BAND.0,
                        FREQUENCY_BAND.1
                    ),
                    value,
                });
            }
        }
    }

    // Non-finite sweep: one entry per owner with any bad state.
    for (owner, _, range) in index.owners() {
        if let Some(bad) = range.clone().map(|i| x[i]).find(|v| !v.is_finite()) {
            issues.push(ValidationIssue {
                what: format!("Non-finite state in {owner}"),
                value: bad,
            });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use gs_devices::{DeviceModel, InfiniteSource, SynchronousGenerator};
    use gs_network::Injection;

    fn network_with_generator() -> (Network, StateIndex) {
        let mut net = Network::new();
        let b1 = net.add_bus("bus-1");
        net.add_device(
            "gen",
            b1,
            Injection { p: 1.0, q: 0.0 },
            DeviceModel::SynchronousGenerator(
                SynchronousGenerator::new(1.8, 1.7, 0.3, 0.55, 0.0, 8.0, 0.4, 6.5, 0.0, None)
                    .unwrap(),
            ),
        )
        .unwrap();
        let index = StateIndex::new(&net);
        (net, index)
    }

    #[test]
    fn clean_vector_passes() {
        let (net, index) = network_with_generator();
        let mut x = DVector::zeros(index.len());
        x[0] = 1.0; // v_re
        let range = index.state_range("gen").unwrap();
        x[range.start + 1] = 1.0; // omega

        assert!(validate_states(&x, &net, &index).is_empty());
    }

    #[test]
    fn overvoltage_is_itemized() {
        let (net, index) = network_with_generator();
        let mut x = DVector::zeros(index.len());
        x[0] = 1.5; // 1.5 pu voltage magnitude
        let range = index.state_range("gen").unwrap();
        x[range.start + 1] = 1.0;

        let issues = validate_states(&x, &net, &index);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].what.contains("Voltage entry"));
        assert!((issues[0].value - 1.5).abs() < 1e-12);
    }

    #[test]
    fn off_nominal_frequency_is_flagged() {
        let (net, index) = network_with_generator();
        let mut x = DVector::zeros(index.len());
        x[0] = 1.0;
        let range = index.state_range("gen").unwrap();
        x[range.start + 1] = 1.4; // omega far above synchronous

        let issues = validate_states(&x, &net, &index);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].what.contains("Frequency state omega"));
    }

    #[test]
    fn non_finite_states_reported_per_device() {
        let mut net = Network::new();
        let b1 = net.add_bus("bus-1");
        net.add_device(
            "slack",
            b1,
            Injection::default(),
            DeviceModel::InfiniteSource(InfiniteSource::new(0.0, 0.1).unwrap()),
        )
        .unwrap();
        let index = StateIndex::new(&net);

        let mut x = DVector::zeros(index.len());
        x[0] = 1.0;
        let range = index.state_range("slack").unwrap();
        x[range.start] = f64::NAN;

        let issues = validate_states(&x, &net, &index);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].what.contains("Non-finite state in slack"));
    }
}
