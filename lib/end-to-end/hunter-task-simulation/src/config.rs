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

use hunter_policies::PolicyKind;
use hunter_task_logic::DEFAULT_GRID_SIZE;
use serde::{Deserialize, Serialize};

use crate::SimulationError;

/// How hunters take turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayMode {
    /// Every tick moves every hunter, then the prey.
    #[default]
    Synchronous,

    /// One tick moves hunter_0 with the externally supplied action. The next moves the other
    /// hunters with their policies, then the prey.
    TurnAlternating,
}

/// Settings for one run. Missing fields take their default when deserialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub grid_size: i32,
    pub hunter_count: usize,
    pub prey_count: usize,

    /// One entry per hunter, in hunter order.
    pub hunter_policies: Vec<PolicyKind>,

    pub prey_movement: bool,

    /// Chance that a free prey stays put on its turn. Otherwise it moves in one of the four
    /// directions, picked uniformly.
    pub prey_stay_probability: f64,

    pub mode: PlayMode,
    pub seed: u64,
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.grid_size <= 0 {
            return Err(SimulationError::InvalidConfig(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }
        if self.hunter_count == 0 {
            return Err(SimulationError::InvalidConfig(
                "at least one hunter is required".to_string(),
            ));
        }
        if self.hunter_policies.len() != self.hunter_count {
            return Err(SimulationError::InvalidConfig(format!(
                "{} hunter policies for {} hunters",
                self.hunter_policies.len(),
                self.hunter_count
            )));
        }
        if !(0.0..=1.0).contains(&self.prey_stay_probability) {
            return Err(SimulationError::InvalidConfig(format!(
                "prey_stay_probability must be within [0, 1], got {}",
                self.prey_stay_probability
            )));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            hunter_count: 2,
            prey_count: 2,
            hunter_policies: vec![PolicyKind::Distance, PolicyKind::Distance],
            prey_movement: true,
            prey_stay_probability: 0.1,
            mode: PlayMode::Synchronous,
            seed: 42,
        }
    }
}
