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

//! Hunter task simulation.
//!
//! Ties the grid world and the hunter policies together. A [`SimulationSession`] owns everything
//! that changes during a run; a [`SimulationController`] advances it one tick at a time, either
//! moving every hunter per tick or alternating between an externally driven hunter_0 and the
//! rest.
//!
//! ```ignore
//! let config = SimulationConfig::default();
//! let mut session = SimulationSession::new(config)?;
//! let mut controller = SimulationController::new();
//! while !session.all_captured() {
//!     controller.tick(&mut session)?;
//! }
//! ```

use hunter_task_logic::{AgentId, GridWorldError};

pub mod config;
pub mod controller;
pub mod prey;
pub mod report;
pub mod session;

pub use config::{PlayMode, SimulationConfig};
pub use controller::{nominal_target, Phase, SimulationController};
pub use prey::{move_prey, random_prey_action, PreyPass};
pub use report::{MoveRecord, TickReport};
pub use session::SimulationSession;

pub type Rng = rand_pcg::Pcg64;

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Grid(#[from] GridWorldError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown hunter: {0}")]
    UnknownHunter(usize),

    #[error("policy for {policy} cannot drive {hunter}")]
    PolicyMismatch { hunter: AgentId, policy: AgentId },

    #[error("{0} is not externally controlled")]
    NotExternal(AgentId),
}
