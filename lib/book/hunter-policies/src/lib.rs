/*
 * Copyright (C) 2023 Asim Ihsan
 * SPDX-License-Identifier: AGPL-3.0-only
 *
 * This program is free software: you can redistribute it and/or modify it under
 * the terms of the GNU Affero General Public License as published by the Free
 * Software Foundation, version 3.
 *
 * This program is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A
 * PARTICULAR PURPOSE. See the GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License along
 * with this program. If not, see <https://www.gnu.org/licenses/>
 */

#![warn(missing_docs)]

//! Hunter policies: how a hunter picks its next move.
//!
//! A policy sees the grid through a [`Percept`] and answers with a [`Decision`]. It never touches
//! the grid world itself; applying the action is the simulation's job.

use hunter_task_logic::{Action, AgentId, CaptureStatus, GridState};
use serde::{Deserialize, Serialize};

pub mod distance;
pub mod external;
pub mod table;

pub use distance::DistancePolicy;
pub use external::ExternalActionPolicy;
pub use table::{PolicyTable, TableChoice, TableKey, TablePolicy};

/// What a hunter gets to look at before it moves.
///
/// `target` is the prey the simulation would like this hunter to chase. Policies that pick their
/// own prey (the table policy) are free to ignore it.
#[derive(Debug, Clone, Copy)]
pub struct Percept<'a> {
    /// Position of every agent.
    pub state: &'a GridState,

    /// Which prey are already caught.
    pub captures: &'a CaptureStatus,

    /// Suggested prey to chase, if any.
    pub target: Option<AgentId>,
}

/// A hunter's choice for one move. `target` and `label` are informational: the prey the policy
/// was chasing and, for table lookups, the label the table reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// The move to make.
    pub action: Action,

    /// Prey the policy was chasing.
    pub target: Option<AgentId>,

    /// Label reported by a table lookup.
    pub label: Option<String>,
}

impl Decision {
    /// STAY, with no target and no label.
    pub fn stay() -> Self {
        Self::from(Action::Stay)
    }
}

impl From<Action> for Decision {
    fn from(action: Action) -> Self {
        Self {
            action,
            target: None,
            label: None,
        }
    }
}

/// A Policy turns a Percept into a Decision for one hunter.
///
/// Policies hold no per-step state, so `decide` takes `&self`. The only mutable policy is the
/// external one, and it is changed from the outside through its setter, never by deciding.
pub trait Policy {
    /// The hunter this policy moves.
    fn agent(&self) -> AgentId;

    /// Pick the next move for the current percept.
    fn decide(&self, percept: &Percept<'_>) -> Decision;
}

/// Which kind of policy drives a hunter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Greedy pursuit of the nominal target.
    #[default]
    Distance,

    /// Lookup in a pre-built table of action scores.
    Table,

    /// Whatever action was last set from outside.
    External,
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyKind::Distance => write!(f, "distance"),
            PolicyKind::Table => write!(f, "table"),
            PolicyKind::External => write!(f, "external"),
        }
    }
}

/// Any of the three hunter policies.
#[derive(Debug, Clone)]
pub enum HunterPolicy {
    /// Greedy pursuit.
    Distance(DistancePolicy),

    /// Table lookup.
    Table(TablePolicy),

    /// Externally set action.
    External(ExternalActionPolicy),
}

impl HunterPolicy {
    /// Which kind of policy this is.
    pub fn kind(&self) -> PolicyKind {
        match self {
            HunterPolicy::Distance(_) => PolicyKind::Distance,
            HunterPolicy::Table(_) => PolicyKind::Table,
            HunterPolicy::External(_) => PolicyKind::External,
        }
    }

    /// The external policy, if that is what this is. Used to feed it the next action.
    pub fn as_external_mut(&mut self) -> Option<&mut ExternalActionPolicy> {
        match self {
            HunterPolicy::External(policy) => Some(policy),
            _ => None,
        }
    }
}

impl Policy for HunterPolicy {
    fn agent(&self) -> AgentId {
        match self {
            HunterPolicy::Distance(policy) => policy.agent(),
            HunterPolicy::Table(policy) => policy.agent(),
            HunterPolicy::External(policy) => policy.agent(),
        }
    }

    fn decide(&self, percept: &Percept<'_>) -> Decision {
        match self {
            HunterPolicy::Distance(policy) => policy.decide(percept),
            HunterPolicy::Table(policy) => policy.decide(percept),
            HunterPolicy::External(policy) => policy.decide(percept),
        }
    }
}

impl From<DistancePolicy> for HunterPolicy {
    fn from(policy: DistancePolicy) -> Self {
        HunterPolicy::Distance(policy)
    }
}

impl From<TablePolicy> for HunterPolicy {
    fn from(policy: TablePolicy) -> Self {
        HunterPolicy::Table(policy)
    }
}

impl From<ExternalActionPolicy> for HunterPolicy {
    fn from(policy: ExternalActionPolicy) -> Self {
        HunterPolicy::External(policy)
    }
}
