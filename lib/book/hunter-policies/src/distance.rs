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

//! Greedy pursuit of a target prey.

use hunter_task_logic::{torus_delta, Action, AgentId, GridState};

use crate::{Decision, Percept, Policy};

/// Greedy pursuit ("Lv0"). Closes the larger of the two toroidal offsets to the target, one cell
/// per move, preferring the vertical axis on ties.
///
/// The choice is recomputed from scratch every move, so it follows a moving target. When the two
/// offsets are nearly equal it can switch axis from one move to the next; against a stationary
/// target it still arrives in exactly `|dx| + |dy|` moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistancePolicy {
    agent: AgentId,
    grid_size: i32,
}

impl DistancePolicy {
    /// Policy for `agent` on a grid of `grid_size` cells per side.
    pub fn new(agent: AgentId, grid_size: i32) -> Self {
        Self { agent, grid_size }
    }

    /// Next move toward `target`. STAY if either position is missing from `state`, or if the
    /// hunter is already on the target's cell.
    pub fn choose_action(&self, state: &GridState, target: AgentId) -> Action {
        let (Some(&own), Some(&goal)) = (state.get(&self.agent), state.get(&target)) else {
            return Action::Stay;
        };

        let (dx, dy) = torus_delta(own, goal, self.grid_size);
        if dx == 0 && dy == 0 {
            Action::Stay
        } else if dy.abs() >= dx.abs() {
            if dy > 0 {
                Action::Down
            } else {
                Action::Up
            }
        } else if dx > 0 {
            Action::Right
        } else {
            Action::Left
        }
    }
}

impl Policy for DistancePolicy {
    fn agent(&self) -> AgentId {
        self.agent
    }

    fn decide(&self, percept: &Percept<'_>) -> Decision {
        match percept.target {
            Some(target) => Decision {
                action: self.choose_action(percept.state, target),
                target: Some(target),
                label: None,
            },
            None => Decision::stay(),
        }
    }
}
