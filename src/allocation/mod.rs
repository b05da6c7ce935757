pub mod flow;
pub mod normalizer;

pub use self::flow::{allocate_flows, FlowPlan, FlowStrategy};
pub use self::normalizer::{normalize, normalize_flat};

use crate::scenario::Scenario;
use serde::Serialize;

/// Integer personnel per zone and class: `[Z][C]`.
pub type IntAllocation = Vec<Vec<u64>>;

/// One zone's line of the allocation table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AllocationRow {
    pub zone_id: String,
    pub zone_name: String,
    pub amounts: Vec<u64>,
    pub total: u64,
}

/// One positive transfer of the flow table.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FlowRow {
    pub class_id: String,
    pub class_name: String,
    pub from_id: String,
    pub from_name: String,
    pub to_id: String,
    pub to_name: String,
    pub units: u64,
}

impl FlowRow {
    pub fn is_self_retention(&self) -> bool {
        self.from_id == self.to_id
    }
}

pub fn allocation_rows(scenario: &Scenario, allocation: &IntAllocation) -> Vec<AllocationRow> {
    scenario
        .zones()
        .iter()
        .zip(allocation)
        .map(|(zone, amounts)| AllocationRow {
            zone_id: zone.id.clone(),
            zone_name: zone.name.clone(),
            amounts: amounts.clone(),
            total: amounts.iter().sum(),
        })
        .collect()
}

/// Every entry with at least one unit, self-retention included.
pub fn flow_rows(scenario: &Scenario, plan: &FlowPlan) -> Vec<FlowRow> {
    let zones = scenario.zones();
    let mut rows = Vec::new();
    for (class, matrix) in scenario.classes().iter().zip(&plan.flows) {
        for (from, row) in matrix.iter().enumerate() {
            for (to, &units) in row.iter().enumerate() {
                if units == 0 {
                    continue;
                }
                rows.push(FlowRow {
                    class_id: class.id.clone(),
                    class_name: class.name.clone(),
                    from_id: zones[from].id.clone(),
                    from_name: zones[from].name.clone(),
                    to_id: zones[to].id.clone(),
                    to_name: zones[to].name.clone(),
                    units,
                });
            }
        }
    }
    rows
}
