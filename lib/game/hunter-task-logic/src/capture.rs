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

//! Capture bookkeeping. A prey is caught when it shares a cell with any hunter, and stays caught
//! for the rest of the run.

use serde::{Deserialize, Serialize};

use crate::{AgentId, GridState, Position};

/// Captured flag for every prey, indexed by prey number. Flags only ever go from `false` to
/// `true`; the only way back is [`CaptureStatus::reset`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaptureStatus {
    captured: Vec<bool>,
}

impl CaptureStatus {
    /// No prey captured yet.
    pub fn new(prey_count: usize) -> Self {
        Self {
            captured: vec![false; prey_count],
        }
    }

    /// Number of prey tracked.
    pub fn len(&self) -> usize {
        self.captured.len()
    }

    /// Whether no prey are tracked at all.
    pub fn is_empty(&self) -> bool {
        self.captured.is_empty()
    }

    /// Whether `agent` is a prey that has been captured. Hunters and unknown prey are never
    /// captured.
    pub fn is_captured(&self, agent: AgentId) -> bool {
        match agent {
            AgentId::Prey(index) => self.captured.get(index).copied().unwrap_or(false),
            AgentId::Hunter(_) => false,
        }
    }

    /// Mark a prey as captured. Returns `true` only the first time a prey is marked.
    pub fn mark_captured(&mut self, agent: AgentId) -> bool {
        match agent {
            AgentId::Prey(index) => match self.captured.get_mut(index) {
                Some(flag) if !*flag => {
                    *flag = true;
                    true
                }
                _ => false,
            },
            AgentId::Hunter(_) => false,
        }
    }

    /// Number of captured prey.
    pub fn captured_count(&self) -> usize {
        self.captured.iter().filter(|&&captured| captured).count()
    }

    /// Whether every prey has been captured.
    pub fn all_captured(&self) -> bool {
        self.captured.iter().all(|&captured| captured)
    }

    /// `(prey, captured)` pairs in prey order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, bool)> + '_ {
        self.captured
            .iter()
            .enumerate()
            .map(|(index, &captured)| (AgentId::Prey(index), captured))
    }

    /// Ids of prey still at large, in prey order.
    pub fn live_prey(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.iter()
            .filter(|(_, captured)| !captured)
            .map(|(prey, _)| prey)
    }

    /// Clear every flag.
    pub fn reset(&mut self) {
        self.captured.iter_mut().for_each(|flag| *flag = false);
    }
}

/// Mark every prey that shares a cell with a hunter as captured. Returns the prey captured by
/// this call, in prey order. Prey missing from `state` are skipped.
pub fn detect_captures(state: &GridState, captures: &mut CaptureStatus) -> Vec<AgentId> {
    let hunters: Vec<Position> = state
        .iter()
        .filter(|(agent, _)| agent.is_hunter())
        .map(|(_, position)| *position)
        .collect();

    let mut newly_captured = Vec::new();
    for index in 0..captures.len() {
        let prey = AgentId::Prey(index);
        let Some(position) = state.get(&prey) else {
            continue;
        };
        if hunters.contains(position) && captures.mark_captured(prey) {
            newly_captured.push(prey);
        }
    }
    newly_captured
}
