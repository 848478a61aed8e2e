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

use hunter_policies::{
    DistancePolicy, ExternalActionPolicy, HunterPolicy, Policy, PolicyKind, PolicyTable,
    TablePolicy,
};
use hunter_task_logic::{Action, AgentId, CaptureStatus, GridState, GridWorld, HashMap};
use rand::SeedableRng;
use tracing::{debug, warn};

use crate::{Rng, SimulationConfig, SimulationError, TickReport};

/// Everything that changes during one run: the world, the captures, the hunters' policies, the
/// random number generator and the run's bookkeeping.
///
/// The session is owned by the caller and advanced by a
/// [`SimulationController`](crate::SimulationController).
#[derive(Debug, Clone)]
pub struct SimulationSession {
    pub(crate) config: SimulationConfig,
    pub(crate) world: GridWorld,
    pub(crate) captures: CaptureStatus,
    pub(crate) policies: Vec<HunterPolicy>,

    /// Drives hunter_0 in turn-alternating play.
    pub(crate) manual: ExternalActionPolicy,

    pub(crate) rng: Rng,
    pub(crate) step_count: u64,
    pub(crate) last_actions: HashMap<AgentId, Action>,
    pub(crate) history: Vec<TickReport>,
}

impl SimulationSession {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        Self::with_tables(config, std::iter::empty())
    }

    /// Create a session, handing each table-driven hunter its table. A hunter configured for
    /// table play without a table falls back to the distance policy.
    pub fn with_tables(
        config: SimulationConfig,
        tables: impl IntoIterator<Item = (AgentId, PolicyTable)>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;
        let world = GridWorld::new(config.grid_size, config.hunter_count, config.prey_count)?;

        let mut tables: HashMap<AgentId, PolicyTable> = tables.into_iter().collect();
        let policies = config
            .hunter_policies
            .iter()
            .enumerate()
            .map(|(index, kind)| {
                build_policy(*kind, AgentId::Hunter(index), config.grid_size, &mut tables)
            })
            .collect();
        for agent in tables.keys() {
            debug!(%agent, "Ignoring table for hunter that does not play by table");
        }

        Ok(Self {
            captures: CaptureStatus::new(config.prey_count),
            manual: ExternalActionPolicy::new(AgentId::Hunter(0)),
            rng: Rng::seed_from_u64(config.seed),
            step_count: 0,
            last_actions: HashMap::default(),
            history: Vec::new(),
            world,
            policies,
            config,
        })
    }

    /// Replace the random number generator, e.g. with one seeded differently.
    pub fn with_rng(mut self, rng: Rng) -> Self {
        self.rng = rng;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    /// Current position of every agent.
    pub fn state(&self) -> &GridState {
        self.world.get_state()
    }

    pub fn captures(&self) -> &CaptureStatus {
        &self.captures
    }

    pub fn all_captured(&self) -> bool {
        self.captures.all_captured()
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    /// Most recent action of every agent that has acted since the last reset.
    pub fn last_actions(&self) -> &HashMap<AgentId, Action> {
        &self.last_actions
    }

    pub fn last_action(&self, agent: AgentId) -> Option<Action> {
        self.last_actions.get(&agent).copied()
    }

    /// One report per tick since the last reset, oldest first.
    pub fn history(&self) -> &[TickReport] {
        &self.history
    }

    pub fn history_json(&self) -> Result<String, SimulationError> {
        Ok(serde_json::to_string(&self.history)?)
    }

    pub fn policy(&self, hunter: usize) -> Option<&HunterPolicy> {
        self.policies.get(hunter)
    }

    /// Swap the policy driving `hunter`. The policy must have been built for that hunter.
    pub fn set_policy(
        &mut self,
        hunter: usize,
        policy: impl Into<HunterPolicy>,
    ) -> Result<(), SimulationError> {
        let policy = policy.into();
        let slot = self
            .policies
            .get_mut(hunter)
            .ok_or(SimulationError::UnknownHunter(hunter))?;
        if policy.agent() != AgentId::Hunter(hunter) {
            return Err(SimulationError::PolicyMismatch {
                hunter: AgentId::Hunter(hunter),
                policy: policy.agent(),
            });
        }
        debug!(hunter = %AgentId::Hunter(hunter), kind = %policy.kind(), "Replacing policy");
        *slot = policy;
        Ok(())
    }

    /// Action hunter_0 plays on its turn in turn-alternating play. It is repeated every turn
    /// until set again.
    pub fn set_manual_action(&mut self, action: Action) {
        self.manual.set_action(action);
    }

    pub fn manual_action(&self) -> Action {
        self.manual.action()
    }

    /// Feed the next action to a hunter whose configured policy is external.
    pub fn set_external_action(
        &mut self,
        hunter: usize,
        action: Action,
    ) -> Result<(), SimulationError> {
        self.policies
            .get_mut(hunter)
            .ok_or(SimulationError::UnknownHunter(hunter))?
            .as_external_mut()
            .ok_or(SimulationError::NotExternal(AgentId::Hunter(hunter)))?
            .set_action(action);
        Ok(())
    }

    pub fn set_prey_movement(&mut self, enabled: bool) {
        self.config.prey_movement = enabled;
    }

    /// Back to the starting layout with nothing captured. Policies, the manual action and the
    /// random number generator are kept as they are.
    pub(crate) fn reset(&mut self) {
        self.world.reset();
        self.captures.reset();
        self.step_count = 0;
        self.last_actions.clear();
        self.history.clear();
    }
}

fn build_policy(
    kind: PolicyKind,
    agent: AgentId,
    grid_size: i32,
    tables: &mut HashMap<AgentId, PolicyTable>,
) -> HunterPolicy {
    match kind {
        PolicyKind::Distance => DistancePolicy::new(agent, grid_size).into(),
        PolicyKind::External => ExternalActionPolicy::new(agent).into(),
        PolicyKind::Table => match tables.remove(&agent) {
            Some(table) => TablePolicy::new(agent, table).into(),
            None => {
                warn!(%agent, "No policy table loaded, falling back to distance policy");
                DistancePolicy::new(agent, grid_size).into()
            }
        },
    }
}
