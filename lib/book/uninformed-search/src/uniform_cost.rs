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

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::{Action, Cost, Count, HashSet, SearchStats, State};

new_key_type! { struct FrontierNodeKey; }

/// A node of the search tree. The state is dropped once the node is popped; only the parent
/// link and the action that produced the node are needed afterwards, to rebuild the path.
#[derive(Debug)]
struct FrontierNode<_State, _Action> {
    state: Option<_State>,
    parent: Option<FrontierNodeKey>,
    action: Option<_Action>,
}

fn path_to<_State, _Action: Action>(
    nodes: &SlotMap<FrontierNodeKey, FrontierNode<_State, _Action>>,
    node_key: FrontierNodeKey,
) -> Vec<_Action> {
    let mut path = Vec::new();
    let mut current = Some(node_key);
    while let Some(key) = current {
        let node = &nodes[key];
        if let Some(action) = node.action {
            path.push(action);
        }
        current = node.parent;
    }
    path.reverse();
    path
}

/// Uniform-cost search, section 3.4.2.
///
/// The open list pops the lowest path cost first and, among equal costs, the node pushed first,
/// so with unit step costs this is breadth-first search. A popped node is goal-tested, then
/// discarded if an equal state was already expanded, then expanded. Every open node owns its
/// own copy of the state; `state` itself is left untouched.
pub fn uniform_cost<_State, _Action>(
    state: &_State,
    stats: &mut SearchStats,
) -> Option<Vec<_Action>>
where
    _State: State<_Action>,
    _Action: Action,
{
    stats.root();
    let mut nodes: SlotMap<FrontierNodeKey, FrontierNode<_State, _Action>> = SlotMap::with_key();
    let mut open: BinaryHeap<Reverse<(Cost, Count, FrontierNodeKey)>> = BinaryHeap::new();
    let mut closed: HashSet<_State> = HashSet::default();
    let mut pushed: Count = 0;

    let root = nodes.insert(FrontierNode {
        state: Some(state.clone()),
        parent: None,
        action: None,
    });
    open.push(Reverse((0, pushed, root)));

    while let Some(Reverse((path_cost, _, node_key))) = open.pop() {
        let Some(state) = nodes[node_key].state.take() else {
            continue;
        };

        if state.is_goal() {
            let path = path_to(&nodes, node_key);
            debug!(path_cost, length = path.len(), "found goal");
            return Some(path);
        }

        if closed.contains(&state) {
            trace!(key = ?state.key(), "duplicate");
            nodes.remove(node_key);
            continue;
        }

        let actions = stats.expand(&state);
        trace!(key = ?state.key(), path_cost, ?actions, "expand");
        for action in actions {
            let child_cost = path_cost + state.step_cost(&action);
            let child = nodes.insert(FrontierNode {
                state: Some(state.get_next_state(&action)),
                parent: Some(node_key),
                action: Some(action),
            });
            pushed += 1;
            open.push(Reverse((child_cost, pushed, child)));
        }
        closed.insert(state);
    }

    debug!(closed = closed.len(), "open list exhausted");
    None
}
