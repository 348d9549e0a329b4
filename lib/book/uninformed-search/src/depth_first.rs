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

use tracing::{debug, trace};

use crate::{Action, HashSet, SearchStats, State};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepthLimitedOutcome<_Action: Action> {
    Found(Vec<_Action>),
    /// No solution within the limit, but some node was cut off by it.
    Cutoff,
    /// No solution at any depth.
    Exhausted,
}

struct Frame<_Key, _Action> {
    key: _Key,
    pending: std::vec::IntoIter<_Action>,
}

enum Visit {
    Goal,
    Cycle,
    Cutoff,
    Expanded,
}

/// Backtracking walk over one mutable state. `frames[i]` holds the untried actions of the node
/// reached by `path[..i]`, and `on_path` holds the keys of exactly those nodes.
struct Walk<'a, _State, _Action>
where
    _State: State<_Action>,
    _Action: Action,
{
    state: &'a mut _State,
    stats: &'a mut SearchStats,
    limit: Option<usize>,
    path: Vec<_Action>,
    frames: Vec<Frame<<_State as State<_Action>>::Key, _Action>>,
    on_path: HashSet<<_State as State<_Action>>::Key>,
    cutoff: bool,
}

impl<'a, _State, _Action> Walk<'a, _State, _Action>
where
    _State: State<_Action>,
    _Action: Action,
{
    fn new(state: &'a mut _State, stats: &'a mut SearchStats, limit: Option<usize>) -> Self {
        Self {
            state,
            stats,
            limit,
            path: Vec::new(),
            frames: Vec::new(),
            on_path: HashSet::default(),
            cutoff: false,
        }
    }

    fn visit(&mut self) -> Visit {
        if self.state.is_goal() {
            return Visit::Goal;
        }
        let key = self.state.key();
        if self.on_path.contains(&key) {
            trace!(?key, depth = self.path.len(), "cycle");
            return Visit::Cycle;
        }
        if self.limit.map_or(false, |limit| self.path.len() >= limit) {
            self.cutoff = true;
            return Visit::Cutoff;
        }
        let actions = self.stats.expand(&*self.state);
        trace!(?key, depth = self.path.len(), ?actions, "expand");
        self.on_path.insert(key.clone());
        self.frames.push(Frame {
            key,
            pending: actions.into_iter(),
        });
        Visit::Expanded
    }

    fn run(mut self) -> DepthLimitedOutcome<_Action> {
        self.stats.root();
        match self.visit() {
            Visit::Goal => return DepthLimitedOutcome::Found(Vec::new()),
            Visit::Expanded => {}
            Visit::Cycle | Visit::Cutoff => return self.failure(),
        }

        while let Some(frame) = self.frames.last_mut() {
            match frame.pending.next() {
                Some(action) => {
                    self.path.push(action);
                    self.state.apply(&action);
                    match self.visit() {
                        Visit::Goal => {
                            debug!(length = self.path.len(), "found goal");
                            return DepthLimitedOutcome::Found(self.path);
                        }
                        Visit::Expanded => {}
                        Visit::Cycle | Visit::Cutoff => {
                            self.state.undo(&action);
                            self.path.pop();
                        }
                    }
                }
                None => {
                    if let Some(frame) = self.frames.pop() {
                        self.on_path.remove(&frame.key);
                    }
                    if let Some(action) = self.path.pop() {
                        self.state.undo(&action);
                    }
                }
            }
        }

        self.failure()
    }

    fn failure(self) -> DepthLimitedOutcome<_Action> {
        if self.cutoff {
            DepthLimitedOutcome::Cutoff
        } else {
            DepthLimitedOutcome::Exhausted
        }
    }
}

/// Depth-first search with backtracking, section 3.4.3.
///
/// Actions are tried in the order `get_actions` returns them, and a node whose key already
/// appears on the current root-to-node path is treated as a dead end rather than expanded
/// again. On success `state` is left in the goal configuration and the returned actions lead
/// there from the initial state. On failure `state` is restored to how it was passed in.
///
/// The walk keeps its own stack instead of recursing, so path length is bounded by memory, not
/// by the thread's stack.
pub fn depth_first<_State, _Action>(
    state: &mut _State,
    stats: &mut SearchStats,
) -> Option<Vec<_Action>>
where
    _State: State<_Action>,
    _Action: Action,
{
    match Walk::new(state, stats, None).run() {
        DepthLimitedOutcome::Found(path) => Some(path),
        DepthLimitedOutcome::Cutoff | DepthLimitedOutcome::Exhausted => None,
    }
}

/// Depth-limited search, section 3.4.4. Nodes at depth `limit` are goal-tested but never
/// expanded.
pub fn depth_limited<_State, _Action>(
    state: &mut _State,
    stats: &mut SearchStats,
    limit: usize,
) -> DepthLimitedOutcome<_Action>
where
    _State: State<_Action>,
    _Action: Action,
{
    Walk::new(state, stats, Some(limit)).run()
}

/// Iterative deepening search, section 3.4.5. Stops with no solution once a pass finishes
/// without anything being cut off. `stats` accumulates over all passes.
pub fn iterative_deepening<_State, _Action>(
    state: &mut _State,
    stats: &mut SearchStats,
) -> Option<Vec<_Action>>
where
    _State: State<_Action>,
    _Action: Action,
{
    let mut limit = 0;
    loop {
        match depth_limited(state, stats, limit) {
            DepthLimitedOutcome::Found(path) => return Some(path),
            DepthLimitedOutcome::Exhausted => return None,
            DepthLimitedOutcome::Cutoff => {
                debug!(limit, "deepening");
                limit += 1;
            }
        }
    }
}
