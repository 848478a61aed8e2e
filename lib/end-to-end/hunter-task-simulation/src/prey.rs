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

use hunter_task_logic::{
    detect_captures, Action, AgentId, CaptureStatus, GridWorld, GridWorldError,
};
use rand::Rng as _;

use crate::Rng;

/// What one prey pass did: the moves made, in prey order, and the prey captured along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreyPass {
    pub moves: Vec<(AgentId, Action)>,
    pub captured: Vec<AgentId>,
}

/// STAY with probability `stay_probability`, otherwise one of the four moves, uniformly.
pub fn random_prey_action(rng: &mut Rng, stay_probability: f64) -> Action {
    if rng.gen::<f64>() < stay_probability {
        Action::Stay
    } else {
        Action::MOVES[rng.gen_range(0..Action::MOVES.len())]
    }
}

/// Move every free prey once, in prey order.
///
/// Captures are checked before each prey moves, so a prey a hunter already reached stays frozen,
/// and again after, so a prey that walks onto a hunter is caught. Captured prey are not moved and
/// draw nothing from `rng`.
pub fn move_prey(
    world: &mut GridWorld,
    captures: &mut CaptureStatus,
    rng: &mut Rng,
    stay_probability: f64,
) -> Result<PreyPass, GridWorldError> {
    let mut pass = PreyPass::default();
    let prey: Vec<AgentId> = world.prey_ids().collect();
    for agent in prey {
        pass.captured.extend(detect_captures(world.get_state(), captures));
        if captures.is_captured(agent) {
            continue;
        }

        let action = random_prey_action(rng, stay_probability);
        world.step(agent, action)?;
        pass.moves.push((agent, action));

        pass.captured.extend(detect_captures(world.get_state(), captures));
    }
    Ok(pass)
}
