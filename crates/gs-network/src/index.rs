//! Global state-vector indexing.
//!
//! Maps every bus voltage component and every (owner, state symbol) pair
//! onto a unique position in the flat global state vector. Built once per
//! network; read-only afterward.

use std::collections::HashMap;
use std::ops::Range;

use gs_core::BusId;

use crate::network::Network;

/// Identity of one global state-vector entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateLabel {
    /// Bus, device, or dynamic-branch name owning the entry
    pub owner: String,
    /// State symbol within the owner
    pub symbol: String,
}

impl std::fmt::Display for StateLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}::{}", self.owner, self.symbol)
    }
}

/// One state-owning entity (device or dynamic branch) and its range.
#[derive(Clone, Debug)]
struct OwnerSlot {
    name: String,
    symbols: &'static [&'static str],
    offset: usize,
}

/// Bijective mapping from (owner, state symbol) to global vector positions.
///
/// Layout: the contiguous prefix `0..2·|buses|` holds bus voltage components
/// (real, imaginary per bus, interleaved); devices follow in insertion
/// order, then dynamic branches, each as one contiguous fixed-size range.
#[derive(Clone, Debug)]
pub struct StateIndex {
    bus_names: Vec<String>,
    owners: Vec<OwnerSlot>,
    by_name: HashMap<String, usize>,
    len: usize,
}

impl StateIndex {
    /// Lay out the global vector for a network.
    ///
    /// Panics on a duplicate owner name; the network rejects those at
    /// construction, so a collision here is a modeling bug.
    pub fn new(network: &Network) -> Self {
        let bus_names: Vec<String> = network.buses().iter().map(|b| b.name.clone()).collect();

        let mut owners = Vec::new();
        let mut by_name = HashMap::new();
        let mut offset = 2 * bus_names.len();

        let mut claim = |name: &str, symbols: &'static [&'static str], offset: &mut usize| {
            let slot = OwnerSlot {
                name: name.to_string(),
                symbols,
                offset: *offset,
            };
            *offset += symbols.len();
            let previous = by_name.insert(name.to_string(), owners.len());
            assert!(previous.is_none(), "overlapping state range for {name}");
            owners.push(slot);
        };

        for device in network.devices() {
            claim(&device.name, device.model.state_names(), &mut offset);
        }
        for branch in network.branches() {
            if branch.dynamics().is_some() {
                claim(
                    &branch.name,
                    &gs_devices::DynamicBranch::STATE_NAMES,
                    &mut offset,
                );
            }
        }

        let len = offset;
        let index = Self {
            bus_names,
            owners,
            by_name,
            len,
        };
        index.assert_bijection(network);
        index
    }

    /// Every range has the declared length and the layout covers `0..len`
    /// exactly once.
    fn assert_bijection(&self, network: &Network) {
        let mut expected = 2 * self.bus_names.len();
        for slot in &self.owners {
            assert_eq!(
                slot.offset, expected,
                "state range of {} does not abut its predecessor",
                slot.name
            );
            if let Some(device) = network.device(&slot.name) {
                assert_eq!(
                    slot.symbols.len(),
                    device.model.state_count(),
                    "state range of {} does not match its declared state count",
                    slot.name
                );
            }
            expected += slot.symbols.len();
        }
        assert_eq!(expected, self.len);
    }

    /// Total global vector length: `2·|buses| + Σ state counts`.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bus_count(&self) -> usize {
        self.bus_names.len()
    }

    /// Indices of a bus's (real, imaginary) voltage components.
    pub fn bus_voltage(&self, bus: BusId) -> (usize, usize) {
        let i = bus.index() as usize;
        assert!(i < self.bus_names.len(), "bus index out of range");
        (2 * i, 2 * i + 1)
    }

    /// Global range claimed by a device or dynamic branch.
    pub fn state_range(&self, owner: &str) -> Option<Range<usize>> {
        let slot = &self.owners[*self.by_name.get(owner)?];
        Some(slot.offset..slot.offset + slot.symbols.len())
    }

    /// Global index of one named state.
    pub fn index_of(&self, owner: &str, symbol: &str) -> Option<usize> {
        let slot = &self.owners[*self.by_name.get(owner)?];
        let local = slot.symbols.iter().position(|s| *s == symbol)?;
        Some(slot.offset + local)
    }

    /// Owner and symbol of a global index.
    ///
    /// Panics when the index is out of range.
    pub fn label(&self, index: usize) -> StateLabel {
        assert!(index < self.len, "state index out of range");
        if index < 2 * self.bus_names.len() {
            return StateLabel {
                owner: self.bus_names[index / 2].clone(),
                symbol: if index % 2 == 0 { "v_re" } else { "v_im" }.to_string(),
            };
        }
        let slot = self
            .owners
            .iter()
            .rfind(|s| s.offset <= index)
            .expect("index past the bus prefix belongs to an owner");
        StateLabel {
            owner: slot.name.clone(),
            symbol: slot.symbols[index - slot.offset].to_string(),
        }
    }

    /// Iterate owners as (name, symbols, range).
    pub fn owners(&self) -> impl Iterator<Item = (&str, &'static [&'static str], Range<usize>)> {
        self.owners.iter().map(|s| {
            (
                s.name.as_str(),
                s.symbols,
                s.offset..s.offset + s.symbols.len(),
            )
        })
    }
}
