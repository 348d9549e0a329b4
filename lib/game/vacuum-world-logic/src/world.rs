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

use std::fmt::{Display, Formatter};

use crate::action::{Action, ActionSet};
use crate::WorldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileState {
    Clean,
    Dirty,
    Blocked,
}

impl TileState {
    pub fn symbol(self) -> char {
        match self {
            TileState::Clean => '_',
            TileState::Dirty => '*',
            TileState::Blocked => '#',
        }
    }
}

/// A single grid square. `g` is the cost of an action performed on or into this tile; every
/// tile currently costs 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub state: TileState,
    pub g: u32,
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            state: TileState::Clean,
            g: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub row: usize,
    pub col: usize,
}

/// The grid, the agent on it, and how much dirt is left.
///
/// Invariant: `dirt_remaining` equals the number of `Dirty` tiles. Every mutation goes through
/// `populate`, `apply` or `undo`, which keep the counter in step with the grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct World {
    width: usize,
    height: usize,
    tiles: Vec<Vec<Tile>>,
    agent: Location,
    dirt_remaining: usize,
}

impl World {
    /// Creates an all-clean grid with the agent parked at (0, 0) until `populate` places it.
    pub fn new(width: usize, height: usize) -> Result<Self, WorldError> {
        if width == 0 || height == 0 {
            return Err(WorldError::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        let too_large = |_| WorldError::TooLarge { width, height };
        let mut tiles = Vec::new();
        tiles.try_reserve_exact(height).map_err(too_large)?;
        for _ in 0..height {
            let mut row = Vec::new();
            row.try_reserve_exact(width).map_err(too_large)?;
            row.resize(width, Tile::default());
            tiles.push(row);
        }
        Ok(Self {
            width,
            height,
            tiles,
            agent: Location::default(),
            dirt_remaining: 0,
        })
    }

    /// Fills the grid from `height` rows of tile symbols. Only the first `width` characters of
    /// each row are read.
    ///
    /// `_` is clean, `*` is dirty, `#` is blocked and `@` is the clean tile the agent starts on.
    /// The number of `@` symbols is not checked: without one the agent stays at (0, 0), and
    /// with several the last one wins.
    pub fn populate<I, S>(&mut self, rows: I) -> Result<(), WorldError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut dirt = 0;
        let mut rows_read = 0;
        for (row, line) in rows.into_iter().take(self.height).enumerate() {
            let mut cols_read = 0;
            for (col, symbol) in line.as_ref().chars().take(self.width).enumerate() {
                let state = match symbol {
                    '_' => TileState::Clean,
                    '*' => {
                        dirt += 1;
                        TileState::Dirty
                    }
                    '@' => {
                        self.agent = Location { row, col };
                        TileState::Clean
                    }
                    '#' => TileState::Blocked,
                    _ => return Err(WorldError::UnknownTile { symbol, row, col }),
                };
                self.tiles[row][col] = Tile { state, g: 1 };
                cols_read += 1;
            }
            if cols_read < self.width {
                return Err(WorldError::ShortRow {
                    row,
                    expected: self.width,
                    found: cols_read,
                });
            }
            rows_read += 1;
        }
        if rows_read < self.height {
            return Err(WorldError::MissingRows {
                expected: self.height,
                found: rows_read,
            });
        }
        self.dirt_remaining = dirt;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn agent(&self) -> Location {
        self.agent
    }

    pub fn dirt_remaining(&self) -> usize {
        self.dirt_remaining
    }

    pub fn tile(&self, row: usize, col: usize) -> Result<Tile, WorldError> {
        if row >= self.height || col >= self.width {
            return Err(WorldError::OutOfBounds { row, col });
        }
        Ok(self.tiles[row][col])
    }

    fn state_at(&self, row: usize, col: usize) -> TileState {
        self.tiles[row][col].state
    }

    fn open(&self, row: usize, col: usize) -> bool {
        self.state_at(row, col) != TileState::Blocked
    }

    pub fn is_goal(&self) -> bool {
        self.dirt_remaining == 0
    }

    /// Actions that neither leave the grid nor enter a blocked tile, plus Vacuum when the agent
    /// stands on dirt.
    pub fn legal_actions(&self) -> ActionSet {
        let Location { row, col } = self.agent;
        let mut actions = ActionSet::new();
        if row > 0 && self.open(row - 1, col) {
            actions.insert(Action::North);
        }
        if row + 1 < self.height && self.open(row + 1, col) {
            actions.insert(Action::South);
        }
        if col + 1 < self.width && self.open(row, col + 1) {
            actions.insert(Action::East);
        }
        if col > 0 && self.open(row, col - 1) {
            actions.insert(Action::West);
        }
        if self.state_at(row, col) == TileState::Dirty {
            actions.insert(Action::Vacuum);
        }
        actions
    }

    /// Cost of performing `action` from the current state.
    pub fn step_cost(&self, action: Action) -> u32 {
        let (dr, dc) = action.delta();
        let row = self.agent.row.wrapping_add_signed(dr);
        let col = self.agent.col.wrapping_add_signed(dc);
        self.tiles
            .get(row)
            .and_then(|tiles| tiles.get(col))
            .map_or(1, |tile| tile.g)
    }

    /// Performs `action` in place. Legality is not re-checked; the caller must only apply
    /// members of `legal_actions()`.
    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Vacuum => {
                let Location { row, col } = self.agent;
                debug_assert_eq!(self.state_at(row, col), TileState::Dirty);
                self.tiles[row][col].state = TileState::Clean;
                self.dirt_remaining -= 1;
            }
            movement => self.shift(movement),
        }
    }

    /// Reverses a preceding `apply(action)`, restoring the exact prior state.
    pub fn undo(&mut self, action: Action) {
        match action.opposite() {
            None => {
                let Location { row, col } = self.agent;
                debug_assert_eq!(self.state_at(row, col), TileState::Clean);
                self.tiles[row][col].state = TileState::Dirty;
                self.dirt_remaining += 1;
            }
            Some(opposite) => self.shift(opposite),
        }
    }

    fn shift(&mut self, movement: Action) {
        let (dr, dc) = movement.delta();
        self.agent.row = self.agent.row.wrapping_add_signed(dr);
        self.agent.col = self.agent.col.wrapping_add_signed(dc);
        debug_assert!(self.agent.row < self.height && self.agent.col < self.width);
    }
}

// Renders the grid in input notation, with `@` wherever the agent currently is.
impl Display for World {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (row, tiles) in self.tiles.iter().enumerate() {
            for (col, tile) in tiles.iter().enumerate() {
                if self.agent == (Location { row, col }) {
                    write!(f, "@")?;
                } else {
                    write!(f, "{}", tile.state.symbol())?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
