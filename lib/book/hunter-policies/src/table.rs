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

//! Hunters driven by a pre-built table of action scores.

use hunter_task_logic::{Action, AgentId, CaptureStatus, GridState, HashMap, Position};
use tracing::debug;

use crate::{Decision, Percept, Policy};

/// `(hunter_x, hunter_y, target_x, target_y)`.
pub type TableKey = (i32, i32, i32, i32);

/// Pre-built action scores, keyed by hunter and target position.
///
/// Each entry keeps its `(label, score)` pairs in insertion order, because the first label wins
/// when scores tie. A missing key and an empty entry both mean "no opinion".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyTable {
    entries: HashMap<TableKey, Vec<(String, f64)>>,
}

impl PolicyTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scores for one key, replacing any previous entry.
    pub fn insert<L>(&mut self, key: TableKey, scores: impl IntoIterator<Item = (L, f64)>)
    where
        L: Into<String>,
    {
        let scores = scores
            .into_iter()
            .map(|(label, score)| (label.into(), score))
            .collect();
        self.entries.insert(key, scores);
    }

    /// Scores for one key, in insertion order.
    pub fn get(&self, key: &TableKey) -> Option<&[(String, f64)]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest scoring label for a hunter at `hunter` chasing a target at `target`. Only a
    /// strictly greater score replaces the current best, so the first label wins ties.
    pub fn best_for(&self, hunter: Position, target: Position) -> Option<(&str, f64)> {
        let scores = self.get(&(hunter.x, hunter.y, target.x, target.y))?;
        let mut best: Option<(&str, f64)> = None;
        for (label, score) in scores {
            if best.map_or(true, |(_, best_score)| *score > best_score) {
                best = Some((label.as_str(), *score));
            }
        }
        best
    }
}

impl<L> FromIterator<(TableKey, Vec<(L, f64)>)> for PolicyTable
where
    L: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (TableKey, Vec<(L, f64)>)>>(iter: I) -> Self {
        let mut table = PolicyTable::new();
        for (key, scores) in iter {
            table.insert(key, scores);
        }
        table
    }
}

/// Result of a table lookup: the action to take, the prey it chases (none if the table had no
/// opinion about any live prey) and the label the table reported.
#[derive(Debug, Clone, PartialEq)]
pub struct TableChoice {
    /// The move to make.
    pub action: Action,

    /// Prey the move chases.
    pub target: Option<AgentId>,

    /// Label as the table reported it.
    pub label: String,
}

/// Hunter driven by a [`PolicyTable`]. Picks its own prey: every live prey is looked up and the
/// best scoring one wins. The table is only ever read.
#[derive(Debug, Clone)]
pub struct TablePolicy {
    agent: AgentId,
    table: PolicyTable,
}

impl TablePolicy {
    /// Policy for `agent` reading from `table`.
    pub fn new(agent: AgentId, table: PolicyTable) -> Self {
        Self { agent, table }
    }

    /// The table this policy reads.
    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Best action against any live prey.
    ///
    /// Returns `None` when the hunter itself is missing from `state`. Captured prey, prey missing
    /// from `state` and prey the table knows nothing about are skipped; if that leaves nothing,
    /// the choice is STAY with no target. Prey are tried in id order and only a strictly greater
    /// score replaces the current best. A label that is not a known action becomes STAY, with the
    /// label kept as reported.
    pub fn choose_action(
        &self,
        state: &GridState,
        captures: &CaptureStatus,
    ) -> Option<TableChoice> {
        let own = *state.get(&self.agent)?;

        let mut prey: Vec<AgentId> = state.keys().copied().filter(AgentId::is_prey).collect();
        prey.sort();

        let mut best: Option<(AgentId, &str, f64)> = None;
        for target in prey {
            if captures.is_captured(target) {
                continue;
            }
            let Some((label, score)) = self.table.best_for(own, state[&target]) else {
                continue;
            };
            if best.map_or(true, |(_, _, best_score)| score > best_score) {
                best = Some((target, label, score));
            }
        }

        let Some((target, label, _)) = best else {
            return Some(TableChoice {
                action: Action::Stay,
                target: None,
                label: Action::Stay.label().to_string(),
            });
        };

        let action = Action::from_label(label).unwrap_or_else(|| {
            debug!(agent = %self.agent, label, "Unknown table label, staying put");
            Action::Stay
        });
        Some(TableChoice {
            action,
            target: Some(target),
            label: label.to_string(),
        })
    }
}

impl Policy for TablePolicy {
    fn agent(&self) -> AgentId {
        self.agent
    }

    fn decide(&self, percept: &Percept<'_>) -> Decision {
        match self.choose_action(percept.state, percept.captures) {
            Some(choice) => Decision {
                action: choice.action,
                target: choice.target,
                label: Some(choice.label),
            },
            None => Decision::stay(),
        }
    }
}
