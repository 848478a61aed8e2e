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

use std::ops::Range;

use hunter_policies::{Decision, Percept, Policy};
use hunter_task_logic::{detect_captures, AgentId, CaptureStatus};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{move_prey, MoveRecord, PlayMode, SimulationError, SimulationSession, TickReport};

/// Where the controller is in its cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing has happened since the start or the last reset.
    #[default]
    Idle,

    /// Synchronous play, after at least one tick.
    Ready,

    /// Turn-alternating play, hunter_0 moves next.
    AwaitingHunter0,

    /// Turn-alternating play, the other hunters and then the prey move next.
    AwaitingHunter1,
}

/// The prey a non-table hunter chases.
///
/// Hunter `i` chases prey `i mod prey_count`. Once that prey is captured it moves on to the first
/// live prey after it, wrapping around; with every prey captured it settles on the next one.
/// `None` only when there is no prey at all.
pub fn nominal_target(
    hunter: usize,
    captures: &CaptureStatus,
    prey_count: usize,
) -> Option<AgentId> {
    if prey_count == 0 {
        return None;
    }
    let own = hunter % prey_count;
    if !captures.is_captured(AgentId::Prey(own)) {
        return Some(AgentId::Prey(own));
    }
    let index = (1..prey_count)
        .map(|offset| (own + offset) % prey_count)
        .find(|&index| !captures.is_captured(AgentId::Prey(index)))
        .unwrap_or((own + 1) % prey_count);
    Some(AgentId::Prey(index))
}

/// Advances a [`SimulationSession`] one tick at a time.
///
/// The play mode comes from the session's config. In synchronous play every tick moves all
/// hunters and then the prey. In turn-alternating play ticks alternate between hunter_0, driven by
/// the session's manual action, and the remaining hunters followed by the prey.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimulationController {
    phase: Phase,
}

impl SimulationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run one tick and append its report to the session's history.
    ///
    /// Fails only if the world rejects a move. The world checks before it changes anything, but
    /// moves made earlier in the same tick are not rolled back.
    pub fn tick(
        &mut self,
        session: &mut SimulationSession,
    ) -> Result<TickReport, SimulationError> {
        let report = match (session.config.mode, self.phase) {
            (PlayMode::Synchronous, _) => self.tick_all(session)?,
            (PlayMode::TurnAlternating, Phase::AwaitingHunter1) => self.tick_others(session)?,
            (PlayMode::TurnAlternating, _) => self.tick_hunter_0(session)?,
        };
        session.history.push(report.clone());
        Ok(report)
    }

    /// Put the session back in its starting layout and the controller back to [`Phase::Idle`].
    pub fn reset(&mut self, session: &mut SimulationSession) {
        session.reset();
        self.phase = Phase::Idle;
        info!(mode = ?session.config.mode, "Simulation reset");
    }

    fn tick_all(
        &mut self,
        session: &mut SimulationSession,
    ) -> Result<TickReport, SimulationError> {
        session.step_count += 1;
        let decisions = decide(session, 0..session.world.hunter_count());
        let mut moves = apply(session, decisions)?;
        let mut captured = detect_captures(session.world.get_state(), &mut session.captures);
        prey_turn(session, &mut moves, &mut captured)?;
        self.phase = Phase::Ready;
        Ok(report(session, self.phase, moves, captured))
    }

    fn tick_hunter_0(
        &mut self,
        session: &mut SimulationSession,
    ) -> Result<TickReport, SimulationError> {
        session.step_count += 1;
        let agent = AgentId::Hunter(0);
        let target = nominal_target(0, &session.captures, session.world.prey_count());
        let decision = Decision {
            target,
            ..session.manual.decide(&Percept {
                state: session.world.get_state(),
                captures: &session.captures,
                target,
            })
        };
        debug!(%agent, action = %decision.action, target = ?decision.target, "Manual move");

        let moves = apply(session, vec![(agent, decision)])?;
        let captured = detect_captures(session.world.get_state(), &mut session.captures);
        self.phase = Phase::AwaitingHunter1;
        Ok(report(session, self.phase, moves, captured))
    }

    fn tick_others(
        &mut self,
        session: &mut SimulationSession,
    ) -> Result<TickReport, SimulationError> {
        let decisions = decide(session, 1..session.world.hunter_count());
        let mut moves = apply(session, decisions)?;
        let mut captured = detect_captures(session.world.get_state(), &mut session.captures);
        prey_turn(session, &mut moves, &mut captured)?;
        self.phase = Phase::AwaitingHunter0;
        Ok(report(session, self.phase, moves, captured))
    }
}

/// Ask each hunter in `hunters` for its move. Every hunter sees the same snapshot.
fn decide(session: &SimulationSession, hunters: Range<usize>) -> Vec<(AgentId, Decision)> {
    let state = session.world.get_state();
    let prey_count = session.world.prey_count();
    session.policies[hunters]
        .iter()
        .map(|policy| {
            let agent = policy.agent();
            let target = nominal_target(agent.index(), &session.captures, prey_count);
            let decision = policy.decide(&Percept {
                state,
                captures: &session.captures,
                target,
            });
            debug!(
                %agent,
                policy = %policy.kind(),
                action = %decision.action,
                target = ?decision.target,
                label = ?decision.label,
                "Hunter decided"
            );
            (agent, decision)
        })
        .collect()
}

fn apply(
    session: &mut SimulationSession,
    decisions: Vec<(AgentId, Decision)>,
) -> Result<Vec<MoveRecord>, SimulationError> {
    let mut moves = Vec::with_capacity(decisions.len());
    for (agent, decision) in decisions {
        session.world.step(agent, decision.action)?;
        session.last_actions.insert(agent, decision.action);
        moves.push(MoveRecord::hunter(agent, decision));
    }
    Ok(moves)
}

fn prey_turn(
    session: &mut SimulationSession,
    moves: &mut Vec<MoveRecord>,
    captured: &mut Vec<AgentId>,
) -> Result<(), SimulationError> {
    if !session.config.prey_movement {
        return Ok(());
    }
    let pass = move_prey(
        &mut session.world,
        &mut session.captures,
        &mut session.rng,
        session.config.prey_stay_probability,
    )?;
    for (agent, action) in pass.moves {
        session.last_actions.insert(agent, action);
        moves.push(MoveRecord::prey(agent, action));
    }
    captured.extend(pass.captured);
    Ok(())
}

fn report(
    session: &SimulationSession,
    phase: Phase,
    moves: Vec<MoveRecord>,
    captured: Vec<AgentId>,
) -> TickReport {
    for prey in &captured {
        info!(%prey, step = session.step_count, "Prey captured");
    }
    if !captured.is_empty() && session.all_captured() {
        info!(step = session.step_count, "All prey captured");
    }
    TickReport {
        step: session.step_count,
        phase,
        moves,
        captured,
        positions: session
            .world
            .get_state()
            .iter()
            .map(|(agent, position)| (*agent, *position))
            .collect(),
        captures: session.captures.clone(),
    }
}

#[cfg(test)]
mod tests {
    use hunter_policies::{DistancePolicy, PolicyKind, PolicyTable};
    use hunter_task_logic::{Action, Position};
    use proptest::prelude::*;

    use super::*;
    use crate::SimulationConfig;

    fn still_prey(mode: PlayMode) -> SimulationConfig {
        SimulationConfig {
            prey_movement: false,
            mode,
            ..SimulationConfig::default()
        }
    }

    fn position(session: &SimulationSession, agent: AgentId) -> Position {
        session.world().position(agent).unwrap()
    }

    #[test]
    fn test_nominal_target_for_two_prey() {
        let mut captures = CaptureStatus::new(2);
        assert_eq!(nominal_target(0, &captures, 2), Some(AgentId::Prey(0)));
        assert_eq!(nominal_target(1, &captures, 2), Some(AgentId::Prey(1)));

        captures.mark_captured(AgentId::Prey(0));
        assert_eq!(nominal_target(0, &captures, 2), Some(AgentId::Prey(1)));
        assert_eq!(nominal_target(1, &captures, 2), Some(AgentId::Prey(1)));

        captures.mark_captured(AgentId::Prey(1));
        assert_eq!(nominal_target(0, &captures, 2), Some(AgentId::Prey(1)));
        assert_eq!(nominal_target(1, &captures, 2), Some(AgentId::Prey(0)));
    }

    #[test]
    fn test_nominal_target_for_other_prey_counts() {
        let mut captures = CaptureStatus::new(3);
        assert_eq!(nominal_target(4, &captures, 3), Some(AgentId::Prey(1)));
        captures.mark_captured(AgentId::Prey(1));
        captures.mark_captured(AgentId::Prey(2));
        assert_eq!(nominal_target(4, &captures, 3), Some(AgentId::Prey(0)));

        assert_eq!(nominal_target(0, &CaptureStatus::new(0), 0), None);
        let mut single = CaptureStatus::new(1);
        single.mark_captured(AgentId::Prey(0));
        assert_eq!(nominal_target(3, &single, 1), Some(AgentId::Prey(0)));
    }

    #[test]
    fn test_first_synchronous_tick() {
        let config = still_prey(PlayMode::Synchronous);
        let mut session = SimulationSession::new(config).unwrap();
        let mut controller = SimulationController::new();
        assert_eq!(controller.phase(), Phase::Idle);

        let report = controller.tick(&mut session).unwrap();

        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(report.step, 1);
        assert_eq!(report.phase, Phase::Ready);
        assert!(report.captured.is_empty());

        // hunter_0 chases prey_0 at (10, 10) and breaks the tie vertically. hunter_1 chases
        // prey_1 at (15, 15), which is closer going up and left across the edges.
        let actions: Vec<(AgentId, Action, Option<AgentId>)> = report
            .moves
            .iter()
            .map(|record| (record.agent, record.action, record.target))
            .collect();
        assert_eq!(
            actions,
            vec![
                (AgentId::Hunter(0), Action::Down, Some(AgentId::Prey(0))),
                (AgentId::Hunter(1), Action::Up, Some(AgentId::Prey(1))),
            ]
        );
        assert_eq!(position(&session, AgentId::Hunter(0)), Position::new(0, 1));
        assert_eq!(position(&session, AgentId::Hunter(1)), Position::new(0, 0));
        assert_eq!(position(&session, AgentId::Prey(0)), Position::new(10, 10));
        assert_eq!(session.last_action(AgentId::Hunter(0)), Some(Action::Down));
        assert_eq!(session.last_action(AgentId::Prey(0)), None);
        assert_eq!(report.positions[&AgentId::Hunter(1)], Position::new(0, 0));
        assert_eq!(session.history(), &[report]);
    }

    #[test]
    fn test_second_tick_turns_right() {
        let config = still_prey(PlayMode::Synchronous);
        let mut session = SimulationSession::new(config).unwrap();
        let mut controller = SimulationController::new();
        controller.tick(&mut session).unwrap();
        controller.tick(&mut session).unwrap();

        assert_eq!(session.last_action(AgentId::Hunter(0)), Some(Action::Right));
        assert_eq!(position(&session, AgentId::Hunter(0)), Position::new(1, 1));
        assert_eq!(session.step_count(), 2);
    }

    #[test]
    fn test_table_hunter_through_controller() {
        let config = SimulationConfig {
            hunter_policies: vec![PolicyKind::Table, PolicyKind::Distance],
            ..still_prey(PlayMode::Synchronous)
        };
        let mut table = PolicyTable::new();
        table.insert((0, 0, 10, 10), [("RIGHT", 0.5), ("DOWN", 0.9)]);
        let mut session =
            SimulationSession::with_tables(config, [(AgentId::Hunter(0), table)]).unwrap();
        let mut controller = SimulationController::new();

        let report = controller.tick(&mut session).unwrap();
        let record = &report.moves[0];
        assert_eq!(record.agent, AgentId::Hunter(0));
        assert_eq!(record.action, Action::Down);
        assert_eq!(record.target, Some(AgentId::Prey(0)));
        assert_eq!(record.label.as_deref(), Some("DOWN"));

        // No entry for (0, 1, ...), so the table has no opinion.
        let report = controller.tick(&mut session).unwrap();
        assert_eq!(report.moves[0].action, Action::Stay);
        assert_eq!(report.moves[0].target, None);
    }

    #[test]
    fn test_turn_alternating_cycle() {
        let config = SimulationConfig {
            mode: PlayMode::TurnAlternating,
            ..SimulationConfig::default()
        };
        let mut session = SimulationSession::new(config).unwrap();
        let mut controller = SimulationController::new();
        session.set_manual_action(Action::Right);

        let report = controller.tick(&mut session).unwrap();
        assert_eq!(controller.phase(), Phase::AwaitingHunter1);
        assert_eq!(report.step, 1);
        assert_eq!(report.moves.len(), 1);
        assert_eq!(report.moves[0].agent, AgentId::Hunter(0));
        assert_eq!(report.moves[0].target, Some(AgentId::Prey(0)));
        assert_eq!(position(&session, AgentId::Hunter(0)), Position::new(1, 0));
        assert_eq!(position(&session, AgentId::Hunter(1)), Position::new(0, 1));
        assert_eq!(position(&session, AgentId::Prey(0)), Position::new(10, 10));
        assert_eq!(position(&session, AgentId::Prey(1)), Position::new(15, 15));

        let report = controller.tick(&mut session).unwrap();
        assert_eq!(controller.phase(), Phase::AwaitingHunter0);
        assert_eq!(report.step, 1);
        let agents: Vec<AgentId> = report.moves.iter().map(|record| record.agent).collect();
        assert_eq!(
            agents,
            vec![AgentId::Hunter(1), AgentId::Prey(0), AgentId::Prey(1)]
        );
        assert_eq!(position(&session, AgentId::Hunter(0)), Position::new(1, 0));
        assert_eq!(position(&session, AgentId::Hunter(1)), Position::new(0, 0));

        controller.tick(&mut session).unwrap();
        assert_eq!(controller.phase(), Phase::AwaitingHunter1);
        assert_eq!(session.step_count(), 2);
        assert_eq!(position(&session, AgentId::Hunter(0)), Position::new(2, 0));
    }

    #[test]
    fn test_play_mode_follows_session_config() {
        let mut controller = SimulationController::new();
        let mut alternating =
            SimulationSession::new(still_prey(PlayMode::TurnAlternating)).unwrap();
        controller.tick(&mut alternating).unwrap();
        assert_eq!(controller.phase(), Phase::AwaitingHunter1);
        controller.tick(&mut alternating).unwrap();
        assert_eq!(controller.phase(), Phase::AwaitingHunter0);

        // The same controller drives a synchronous session synchronously.
        let mut synchronous = SimulationSession::new(still_prey(PlayMode::Synchronous)).unwrap();
        controller.reset(&mut synchronous);
        let report = controller.tick(&mut synchronous).unwrap();
        assert_eq!(controller.phase(), Phase::Ready);
        assert_eq!(report.moves.len(), 2);
    }

    #[test]
    fn test_distance_hunter_across_the_edge_of_largest_grid() {
        let config = SimulationConfig {
            grid_size: i32::MAX,
            hunter_policies: vec![PolicyKind::External, PolicyKind::Distance],
            ..still_prey(PlayMode::Synchronous)
        };
        let mut session = SimulationSession::new(config).unwrap();
        let mut controller = SimulationController::new();
        session.set_external_action(0, Action::Up).unwrap();
        controller.tick(&mut session).unwrap();
        assert_eq!(
            position(&session, AgentId::Hunter(0)),
            Position::new(0, i32::MAX - 1)
        );

        // prey_0 at (10, 10) is 11 cells down across the edge, 10 cells right.
        session
            .set_policy(0, DistancePolicy::new(AgentId::Hunter(0), i32::MAX))
            .unwrap();
        let report = controller.tick(&mut session).unwrap();
        assert_eq!(report.moves[0].action, Action::Down);
        assert_eq!(position(&session, AgentId::Hunter(0)), Position::new(0, 0));
    }

    #[test]
    fn test_external_hunter_in_synchronous_play() {
        let config = SimulationConfig {
            hunter_policies: vec![PolicyKind::Distance, PolicyKind::External],
            ..still_prey(PlayMode::Synchronous)
        };
        let mut session = SimulationSession::new(config).unwrap();
        let mut controller = SimulationController::new();

        controller.tick(&mut session).unwrap();
        assert_eq!(position(&session, AgentId::Hunter(1)), Position::new(0, 1));

        session.set_external_action(1, Action::Left).unwrap();
        controller.tick(&mut session).unwrap();
        controller.tick(&mut session).unwrap();
        assert_eq!(position(&session, AgentId::Hunter(1)), Position::new(18, 1));
    }

    #[test]
    fn test_captured_prey_stay_frozen() {
        // On a 5x5 grid both prey start on hunter_0's cell at (0, 0).
        let config = SimulationConfig {
            grid_size: 5,
            ..SimulationConfig::default()
        };
        let mut session = SimulationSession::new(config).unwrap();
        let mut controller = SimulationController::new();

        let report = controller.tick(&mut session).unwrap();
        assert_eq!(report.captured, vec![AgentId::Prey(0), AgentId::Prey(1)]);
        assert!(report.captures.all_captured());
        assert!(session.all_captured());

        for _ in 0..20 {
            let report = controller.tick(&mut session).unwrap();
            assert!(report.captured.is_empty());
            assert!(report.moves.iter().all(|record| record.agent.is_hunter()));
            assert_eq!(position(&session, AgentId::Prey(0)), Position::new(0, 0));
            assert_eq!(position(&session, AgentId::Prey(1)), Position::new(0, 0));
        }
    }

    #[test]
    fn test_distance_hunters_catch_moving_prey() {
        let mut session = SimulationSession::new(SimulationConfig::default()).unwrap();
        let mut controller = SimulationController::new();
        for _ in 0..10_000 {
            if session.all_captured() {
                break;
            }
            controller.tick(&mut session).unwrap();
        }
        assert!(session.all_captured());
        let captured: usize = session
            .history()
            .iter()
            .map(|report| report.captured.len())
            .sum();
        assert_eq!(captured, 2);
    }

    #[test]
    fn test_reset() {
        let mut session = SimulationSession::new(SimulationConfig::default()).unwrap();
        let mut controller = SimulationController::new();
        for _ in 0..5 {
            controller.tick(&mut session).unwrap();
        }

        controller.reset(&mut session);
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(session.step_count(), 0);
        assert!(session.history().is_empty());
        assert!(session.last_actions().is_empty());
        assert_eq!(session.captures().captured_count(), 0);
        assert_eq!(position(&session, AgentId::Hunter(0)), Position::new(0, 0));
        assert_eq!(position(&session, AgentId::Prey(1)), Position::new(15, 15));
    }

    #[test]
    fn test_history_json() {
        let config = still_prey(PlayMode::Synchronous);
        let mut session = SimulationSession::new(config).unwrap();
        let mut controller = SimulationController::new();
        controller.tick(&mut session).unwrap();

        let json = session.history_json().unwrap();
        assert!(json.contains("\"hunter_0\""));
        assert!(json.contains("\"DOWN\""));
        assert!(json.contains("\"ready\""));
    }

    proptest! {
        #[test]
        fn test_same_seed_same_run(seed in any::<u64>()) {
            let config = SimulationConfig { seed, ..SimulationConfig::default() };
            let run = || {
                let mut session = SimulationSession::new(config.clone()).unwrap();
                let mut controller = SimulationController::new();
                for _ in 0..30 {
                    controller.tick(&mut session).unwrap();
                }
                session.history().to_vec()
            };
            prop_assert_eq!(run(), run());
        }

        #[test]
        fn test_captures_never_undone(seed in any::<u64>(), ticks in 1..100usize) {
            let config = SimulationConfig { grid_size: 6, seed, ..SimulationConfig::default() };
            let mut session = SimulationSession::new(config).unwrap();
            let mut controller = SimulationController::new();
            let mut caught = 0;
            for _ in 0..ticks {
                controller.tick(&mut session).unwrap();
                let now = session.captures().captured_count();
                prop_assert!(now >= caught);
                caught = now;
            }
        }
    }
}
