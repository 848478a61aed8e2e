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

//! A hunter moved from outside the simulation.

use hunter_task_logic::{Action, AgentId, GridState};

use crate::{Decision, Percept, Policy};

/// Plays whatever action it was last told to, STAY until told otherwise. The action sticks:
/// it is repeated every move until it is set again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalActionPolicy {
    agent: AgentId,
    action: Action,
}

impl ExternalActionPolicy {
    /// Policy for `agent`, starting on STAY.
    pub fn new(agent: AgentId) -> Self {
        Self {
            agent,
            action: Action::Stay,
        }
    }

    /// Replace the action played from now on.
    pub fn set_action(&mut self, action: Action) {
        self.action = action;
    }

    /// The action currently set.
    pub fn action(&self) -> Action {
        self.action
    }

    /// The action currently set. State and target are ignored.
    pub fn choose_action(&self, _state: &GridState, _target: Option<AgentId>) -> Action {
        self.action
    }
}

impl Policy for ExternalActionPolicy {
    fn agent(&self) -> AgentId {
        self.agent
    }

    fn decide(&self, percept: &Percept<'_>) -> Decision {
        Decision::from(self.choose_action(percept.state, percept.target))
    }
}
