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

// The vacuum world of chapter 2, generalized to a rectangular grid with blocked tiles. This crate
// knows nothing about search; it only offers legality and reversible actions.

pub mod action;
pub mod world;

pub use action::{Action, ActionSet};
pub use world::{Location, Tile, TileState, World};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("world of {width}x{height} tiles does not fit in memory")]
    TooLarge { width: usize, height: usize },

    #[error("unknown tile {symbol:?} at row {row}, column {col}")]
    UnknownTile { symbol: char, row: usize, col: usize },

    #[error("row {row} has {found} tiles, expected {expected}")]
    ShortRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("found {found} rows, expected {expected}")]
    MissingRows { expected: usize, found: usize },

    #[error("out of bounds: row {row}, column {col}")]
    OutOfBounds { row: usize, col: usize },
}
