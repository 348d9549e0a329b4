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

// Uninformed search strategies.
//
// See:
// -  Chapter 3: Solving Problems by Searching, section 3.4

use std::fmt::Debug;
use std::hash::Hash;

use serde::Serialize;

mod depth_first;
mod uniform_cost;

pub use depth_first::{depth_first, depth_limited, iterative_deepening, DepthLimitedOutcome};
pub use uniform_cost::uniform_cost;

pub type Count = u64;
pub type Cost = u64;
pub type HashSet<K> = rustc_hash::FxHashSet<K>;

pub trait Action: Clone + Copy + PartialEq + Eq + Hash + Debug {}

/// A problem state that search can mutate in place through reversible actions.
///
/// `apply` followed by `undo` with the same action must restore a state equal to the original.
/// Depth-first strategies rely on this to walk a single state instead of copying it per node.
pub trait State<_Action>: Clone + PartialEq + Eq + Hash + Debug
where
    _Action: Action,
{
    /// What must not repeat along one root-to-node path.
    type Key: Clone + Eq + Hash + Debug;

    /// Legal actions, in the order search should try them.
    fn get_actions(&self) -> Vec<_Action>;
    fn apply(&mut self, action: &_Action);
    fn undo(&mut self, action: &_Action);
    fn is_goal(&self) -> bool;
    fn key(&self) -> Self::Key;

    fn step_cost(&self, _action: &_Action) -> Cost {
        1
    }

    fn get_next_state(&self, action: &_Action) -> Self {
        let mut next_state = self.clone();
        next_state.apply(action);
        next_state
    }
}

/// Search effort counters, owned by the caller so separate searches never share them.
///
/// The root counts as one generated node. Each call to `State::get_actions` counts as one
/// expanded node and adds one generated node per returned action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub nodes_generated: Count,
    pub nodes_expanded: Count,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn expand<_State, _Action>(&mut self, state: &_State) -> Vec<_Action>
    where
        _State: State<_Action>,
        _Action: Action,
    {
        let actions = state.get_actions();
        self.nodes_expanded += 1;
        self.nodes_generated += actions.len() as Count;
        actions
    }

    fn root(&mut self) {
        self.nodes_generated += 1;
    }
}
