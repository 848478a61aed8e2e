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

use std::collections::BTreeMap;

use hunter_policies::Decision;
use hunter_task_logic::{Action, AgentId, CaptureStatus, Position};
use serde::{Deserialize, Serialize};

use crate::Phase;

/// One agent's move during a tick. Prey moves carry no target or label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub agent: AgentId,
    pub action: Action,
    pub target: Option<AgentId>,
    pub label: Option<String>,
}

impl MoveRecord {
    pub fn hunter(agent: AgentId, decision: Decision) -> Self {
        Self {
            agent,
            action: decision.action,
            target: decision.target,
            label: decision.label,
        }
    }

    pub fn prey(agent: AgentId, action: Action) -> Self {
        Self {
            agent,
            action,
            target: None,
            label: None,
        }
    }
}

/// Everything that happened in one tick. The session keeps one per tick as its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Step counter after the tick.
    pub step: u64,

    /// Phase the controller is in after the tick.
    pub phase: Phase,

    /// Moves in the order they were applied.
    pub moves: Vec<MoveRecord>,

    /// Prey captured during this tick.
    pub captured: Vec<AgentId>,

    /// Positions after the tick, sorted by agent.
    pub positions: BTreeMap<AgentId, Position>,

    /// Captured flags after the tick.
    pub captures: CaptureStatus,
}
