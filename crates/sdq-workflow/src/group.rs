//! Domain-level parent scenarios.

use sdq_model::{Domain, ParentScenario, Scenario};
use tracing::debug;

/// One parent per distinct domain, in the order domains first appear.
pub fn group_by_domain(scenarios: &[Scenario]) -> Vec<ParentScenario> {
    let mut parents: Vec<ParentScenario> = Vec::new();
    for scenario in scenarios {
        match parents.iter_mut().find(|p| p.domain == scenario.domain) {
            Some(parent) => parent.child_scenarios.push(scenario.clone()),
            None => {
                let mut parent = parent_for(scenario.domain);
                parent.child_scenarios.push(scenario.clone());
                parents.push(parent);
            }
        }
    }
    for parent in &mut parents {
        parent.description = format!(
            "{} data quality checks from the data review plan ({} scenarios).",
            parent.domain.display_name(),
            parent.child_scenarios.len()
        );
    }
    debug!(parents = parents.len(), scenarios = scenarios.len(), "grouped scenarios by domain");
    parents
}

fn parent_for(domain: Domain) -> ParentScenario {
    ParentScenario {
        id: format!("drp_parent_{}", domain.slug()),
        name: format!("{} Checks", domain.display_name()),
        description: String::new(),
        domain,
        child_scenarios: Vec::new(),
        is_from_drp: true,
    }
}
