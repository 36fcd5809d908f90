//! Migration planning: which transforms to run, in which order.

use super::entity::EntityKind;
use super::registry::{MigrationRegistry, Scope};
use super::traits::{Direction, Migration};
use semver::Version;
use std::ops::Bound;
use std::sync::Arc;

/// An ordered list of migrations taking a payload from `from` to `to`.
#[derive(Debug, Clone)]
pub struct MigrationPlan {
    pub from: Version,
    pub to: Version,
    pub steps: Vec<Arc<dyn Migration>>,
}

impl MigrationPlan {
    pub fn empty(from: Version, to: Version) -> Self {
        Self {
            from,
            to,
            steps: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn direction(&self) -> Direction {
        if self.to > self.from {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    /// Boundaries crossed, in execution order.
    pub fn boundaries(&self) -> Vec<Version> {
        self.steps.iter().map(|step| step.boundary()).collect()
    }

    pub fn lossy_steps(&self) -> impl Iterator<Item = &Arc<dyn Migration>> {
        self.steps.iter().filter(|step| step.is_lossy())
    }
}

/// Computes the plan for one scope.
///
/// With a kind, only that kind's chain is consulted (an unregistered kind
/// yields an empty plan); without one, the global chain is.
pub fn plan(
    registry: &MigrationRegistry,
    kind: Option<EntityKind>,
    from: &Version,
    to: &Version,
) -> MigrationPlan {
    if from == to {
        return MigrationPlan::empty(from.clone(), to.clone());
    }

    let scope = Scope::from(kind);
    let Some(partition) = registry.partition(scope) else {
        tracing::debug!("No {} migrations registered", scope);
        return MigrationPlan::empty(from.clone(), to.clone());
    };

    let steps: Vec<Arc<dyn Migration>> = if to > from {
        partition
            .range((Bound::Excluded(from), Bound::Included(to)))
            .filter_map(|(_, boundary)| boundary.get(Direction::Forward).cloned())
            .collect()
    } else {
        partition
            .range((Bound::Excluded(to), Bound::Included(from)))
            .rev()
            .filter_map(|(_, boundary)| boundary.get(Direction::Backward).cloned())
            .collect()
    };

    tracing::debug!("Planned {} {} step(s): {} -> {}", steps.len(), scope, from, to);
    MigrationPlan {
        from: from.clone(),
        to: to.clone(),
        steps,
    }
}
