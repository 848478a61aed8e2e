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

#![warn(missing_docs)]

//! Hunter task grid world.
//!
//! This is a library for the hunter task: hunters chase prey on a small
//! toroidal grid, one cell per step. It holds the positions and applies moves.
//! Deciding what to do, and deciding when a prey is caught, is left to the
//! callers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub mod capture;

pub use capture::{detect_captures, CaptureStatus};

/// Width and height of the grid unless configured otherwise.
pub const DEFAULT_GRID_SIZE: i32 = 20;

/// Hash map used throughout the hunter task crates.
pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// Position of every agent on the grid.
pub type GridState = HashMap<AgentId, Position>;

/// Grid world error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridWorldError {
    /// The agent is not on the grid.
    #[error("unknown agent: {0}")]
    UnknownAgent(AgentId),

    /// The action code is not one of the five known actions.
    #[error("invalid action: {0}")]
    InvalidAction(i32),

    /// The grid must have at least one cell.
    #[error("invalid grid size: {0}")]
    InvalidGridSize(i32),

    /// The string is neither `hunter_<n>` nor `prey_<n>`.
    #[error("malformed agent id: {0}")]
    MalformedAgentId(String),
}

/// Cell on the grid. `x` grows to the right, `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: i32,

    /// Vertical coordinate.
    pub y: i32,
}

impl Position {
    /// Create a new position. Coordinates are taken as given; use [`Position::wrap`] to bring
    /// them onto a grid.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Wrap both coordinates into `[0, grid_size)`. Negative coordinates wrap around to the far
    /// side of the grid.
    pub fn wrap(self, grid_size: i32) -> Self {
        Self {
            x: self.x.rem_euclid(grid_size),
            y: self.y.rem_euclid(grid_size),
        }
    }

    /// The position one action away, wrapped onto the grid.
    pub fn moved(self, action: Action, grid_size: i32) -> Self {
        let (dx, dy) = action.delta();
        Self::new(self.x + dx, self.y + dy).wrap(grid_size)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Identifier of an agent. Hunters and prey are numbered from zero.
///
/// The string form is `hunter_0`, `prey_1` and so on, which is also how the identifier
/// serializes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgentId {
    /// A hunter.
    Hunter(usize),

    /// A prey.
    Prey(usize),
}

impl AgentId {
    /// Number of the hunter or prey.
    pub fn index(&self) -> usize {
        match self {
            AgentId::Hunter(index) | AgentId::Prey(index) => *index,
        }
    }

    /// Whether this is a hunter.
    pub fn is_hunter(&self) -> bool {
        matches!(self, AgentId::Hunter(_))
    }

    /// Whether this is a prey.
    pub fn is_prey(&self) -> bool {
        matches!(self, AgentId::Prey(_))
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentId::Hunter(index) => write!(f, "hunter_{}", index),
            AgentId::Prey(index) => write!(f, "prey_{}", index),
        }
    }
}

impl FromStr for AgentId {
    type Err = GridWorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GridWorldError::MalformedAgentId(s.to_string());
        if let Some(index) = s.strip_prefix("hunter_") {
            index.parse().map(AgentId::Hunter).map_err(|_| malformed())
        } else if let Some(index) = s.strip_prefix("prey_") {
            index.parse().map(AgentId::Prey).map_err(|_| malformed())
        } else {
            Err(malformed())
        }
    }
}

impl Serialize for AgentId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One of the five moves an agent can make. The numeric codes are fixed, since pre-built policy
/// tables depend on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Stay put. Code 0.
    #[default]
    Stay,

    /// Move to `y - 1`. Code 1.
    Up,

    /// Move to `y + 1`. Code 2.
    Down,

    /// Move to `x - 1`. Code 3.
    Left,

    /// Move to `x + 1`. Code 4.
    Right,
}

impl Action {
    /// All actions, in code order.
    pub const ALL: [Action; 5] = [
        Action::Stay,
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
    ];

    /// The four actions that change position.
    pub const MOVES: [Action; 4] = [Action::Up, Action::Down, Action::Left, Action::Right];

    /// Numeric code of the action.
    pub fn code(self) -> i32 {
        match self {
            Action::Stay => 0,
            Action::Up => 1,
            Action::Down => 2,
            Action::Left => 3,
            Action::Right => 4,
        }
    }

    /// `(dx, dy)` applied to a position, before wrapping.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Action::Stay => (0, 0),
            Action::Up => (0, -1),
            Action::Down => (0, 1),
            Action::Left => (-1, 0),
            Action::Right => (1, 0),
        }
    }

    /// Label used by policy tables, e.g. `"UP"`.
    pub fn label(self) -> &'static str {
        match self {
            Action::Stay => "STAY",
            Action::Up => "UP",
            Action::Down => "DOWN",
            Action::Left => "LEFT",
            Action::Right => "RIGHT",
        }
    }

    /// Parse a policy table label. Labels are matched exactly.
    pub fn from_label(label: &str) -> Option<Self> {
        Action::ALL.into_iter().find(|action| action.label() == label)
    }
}

impl TryFrom<i32> for Action {
    type Error = GridWorldError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Action::ALL
            .into_iter()
            .find(|action| action.code() == code)
            .ok_or(GridWorldError::InvalidAction(code))
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

// An offset larger than half the grid is shorter going the other way round. Compared as `2 * d`
// against the grid size so odd sizes need no rounding; for even sizes an offset of exactly half
// the grid is kept as is. Worked in i64 so `2 * d` cannot overflow on the largest grids.
fn axis_delta(d: i32, grid_size: i32) -> i32 {
    let (d, n) = (i64::from(d), i64::from(grid_size));
    let shortest = if 2 * d > n {
        d - n
    } else if 2 * d < -n {
        d + n
    } else {
        d
    };
    // |shortest| <= n / 2, which always fits.
    shortest as i32
}

/// Shortest signed displacement `(dx, dy)` from `from` to `to` on a toroidal grid, each axis
/// computed independently. Both positions must already be on the grid.
pub fn torus_delta(from: Position, to: Position, grid_size: i32) -> (i32, i32) {
    (
        axis_delta(to.x - from.x, grid_size),
        axis_delta(to.y - from.y, grid_size),
    )
}

/// Starting layout: hunter `i` at `(0, i)`, prey `i` at `(10 + 5i, 10 + 5i)`, all wrapped onto
/// the grid. Placement is fixed and not checked for overlap.
fn initial_layout(grid_size: i32, hunter_count: usize, prey_count: usize) -> GridState {
    let mut positions = GridState::default();
    for index in 0..hunter_count {
        let position = Position::new(0, index as i32).wrap(grid_size);
        positions.insert(AgentId::Hunter(index), position);
    }
    for index in 0..prey_count {
        let offset = 10 + 5 * index as i32;
        let position = Position::new(offset, offset).wrap(grid_size);
        positions.insert(AgentId::Prey(index), position);
    }
    positions
}

/// Toroidal grid world. Owns the position of every hunter and prey.
///
/// The world only moves agents. It does not know about captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridWorld {
    grid_size: i32,
    hunter_count: usize,
    prey_count: usize,
    positions: GridState,
}

impl Default for GridWorld {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            hunter_count: 2,
            prey_count: 2,
            positions: initial_layout(DEFAULT_GRID_SIZE, 2, 2),
        }
    }
}

impl GridWorld {
    /// Create a new world in its starting layout.
    pub fn new(
        grid_size: i32,
        hunter_count: usize,
        prey_count: usize,
    ) -> Result<Self, GridWorldError> {
        if grid_size <= 0 {
            return Err(GridWorldError::InvalidGridSize(grid_size));
        }
        Ok(Self {
            grid_size,
            hunter_count,
            prey_count,
            positions: initial_layout(grid_size, hunter_count, prey_count),
        })
    }

    /// Put every agent back in its starting position.
    pub fn reset(&mut self) -> &GridState {
        self.positions = initial_layout(self.grid_size, self.hunter_count, self.prey_count);
        &self.positions
    }

    /// Current position of every agent.
    pub fn get_state(&self) -> &GridState {
        &self.positions
    }

    /// Current position of one agent.
    pub fn position(&self, agent: AgentId) -> Option<Position> {
        self.positions.get(&agent).copied()
    }

    /// Width and height of the grid.
    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    /// Number of hunters.
    pub fn hunter_count(&self) -> usize {
        self.hunter_count
    }

    /// Number of prey.
    pub fn prey_count(&self) -> usize {
        self.prey_count
    }

    /// Hunter ids in order.
    pub fn hunter_ids(&self) -> impl Iterator<Item = AgentId> {
        (0..self.hunter_count).map(AgentId::Hunter)
    }

    /// Prey ids in order.
    pub fn prey_ids(&self) -> impl Iterator<Item = AgentId> {
        (0..self.prey_count).map(AgentId::Prey)
    }

    /// Move one agent by one action, wrapping around the edges. Returns the updated state.
    pub fn step(&mut self, agent: AgentId, action: Action) -> Result<&GridState, GridWorldError> {
        let grid_size = self.grid_size;
        let position = self
            .positions
            .get_mut(&agent)
            .ok_or(GridWorldError::UnknownAgent(agent))?;
        *position = position.moved(action, grid_size);
        Ok(&self.positions)
    }

    /// Like [`GridWorld::step`], but takes a raw action code. The agent is checked before the
    /// code, and nothing changes if either is rejected.
    pub fn step_code(&mut self, agent: AgentId, code: i32) -> Result<&GridState, GridWorldError> {
        if !self.positions.contains_key(&agent) {
            return Err(GridWorldError::UnknownAgent(agent));
        }
        let action = Action::try_from(code)?;
        self.step(agent, action)
    }
}
