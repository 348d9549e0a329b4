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

use serde::Serialize;

/// An atomic operation the vacuum agent can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Vacuum,
    North,
    South,
    East,
    West,
}

impl Action {
    /// The order in which search tries actions at every decision point.
    pub const PRIORITY: [Action; 5] = [
        Action::Vacuum,
        Action::West,
        Action::South,
        Action::East,
        Action::North,
    ];

    /// Single-letter code used in plan output.
    pub fn code(self) -> char {
        match self {
            Action::Vacuum => 'V',
            Action::North => 'N',
            Action::South => 'S',
            Action::East => 'E',
            Action::West => 'W',
        }
    }

    /// The movement that cancels this one. Vacuum has no opposite movement, its inverse is
    /// re-dirtying the tile, which only `World::undo` can do.
    pub fn opposite(self) -> Option<Action> {
        match self {
            Action::Vacuum => None,
            Action::North => Some(Action::South),
            Action::South => Some(Action::North),
            Action::East => Some(Action::West),
            Action::West => Some(Action::East),
        }
    }

    /// Row and column delta of a movement, `(0, 0)` for Vacuum.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Action::Vacuum => (0, 0),
            Action::North => (-1, 0),
            Action::South => (1, 0),
            Action::East => (0, 1),
            Action::West => (0, -1),
        }
    }

    fn bit(self) -> u8 {
        match self {
            Action::North => 0x01,
            Action::South => 0x02,
            Action::East => 0x04,
            Action::West => 0x08,
            Action::Vacuum => 0x10,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl TryFrom<char> for Action {
    type Error = char;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        match code {
            'V' => Ok(Action::Vacuum),
            'N' => Ok(Action::North),
            'S' => Ok(Action::South),
            'E' => Ok(Action::East),
            'W' => Ok(Action::West),
            other => Err(other),
        }
    }
}

// Actions serialize as their letter code so a JSON plan reads the same as the line output.
impl Serialize for Action {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The set of actions legal from some world state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ActionSet {
    bits: u8,
}

impl ActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, action: Action) {
        self.bits |= action.bit();
    }

    pub fn contains(&self, action: Action) -> bool {
        self.bits & action.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Iterates members in `Action::PRIORITY` order.
    pub fn iter(&self) -> impl Iterator<Item = Action> + '_ {
        Action::PRIORITY
            .into_iter()
            .filter(move |action| self.contains(*action))
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<T: IntoIterator<Item = Action>>(iter: T) -> Self {
        let mut set = ActionSet::new();
        for action in iter {
            set.insert(action);
        }
        set
    }
}
