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
use std::io::{BufRead, Write};

use serde::Serialize;
use tracing::{debug, info};
use uninformed_search::{Cost, SearchStats};
use vacuum_world_logic::{Location, World, WorldError};

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("invalid {field}: {line:?}")]
    InvalidHeader { field: &'static str, line: String },

    #[error("invalid world: {0}")]
    World(#[from] WorldError),

    #[error("failed to encode plan: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Action(pub vacuum_world_logic::Action);

impl uninformed_search::Action for Action {}

/// The vacuum world as seen by the search engines.
///
/// Equality and hashing cover the whole grid, so the uniform-cost closed list only merges
/// worlds whose dirt layout is identical. The path key is the narrower
/// `(agent, dirt_remaining)`: along a single path dirt only ever decreases, so two nodes on
/// the same path with the same count also have the same layout.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct State {
    pub world: World,
}

impl State {
    pub fn new(world: World) -> Self {
        Self { world }
    }
}

impl uninformed_search::State<Action> for State {
    type Key = (Location, usize);

    fn get_actions(&self) -> Vec<Action> {
        self.world.legal_actions().iter().map(Action).collect()
    }

    fn apply(&mut self, action: &Action) {
        self.world.apply(action.0);
    }

    fn undo(&mut self, action: &Action) {
        self.world.undo(action.0);
    }

    fn is_goal(&self) -> bool {
        self.world.is_goal()
    }

    fn key(&self) -> Self::Key {
        (self.world.agent(), self.world.dirt_remaining())
    }

    fn step_cost(&self, action: &Action) -> Cost {
        Cost::from(self.world.step_cost(action.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    UniformCost,
    DepthFirst,
    DepthFirstId,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::UniformCost => "uniform-cost",
            Strategy::DepthFirst => "depth-first",
            Strategy::DepthFirstId => "depth-first-id",
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannerConfig {
    pub strategy: Strategy,
    pub format: OutputFormat,
    /// Print the world before and after the plan. Text output only.
    pub visual: bool,
}

impl PlannerConfig {
    pub fn new(strategy: Strategy, format: OutputFormat, visual: bool) -> Self {
        Self {
            strategy,
            format,
            visual,
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self::new(Strategy::DepthFirst, OutputFormat::Text, false)
    }
}

/// Outcome of one search: the actions, or `None` when no action sequence cleans the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub strategy: Strategy,
    pub actions: Option<Vec<vacuum_world_logic::Action>>,
    pub stats: SearchStats,
}

impl Plan {
    pub fn is_solved(&self) -> bool {
        self.actions.is_some()
    }
}

impl Display for Plan {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.actions {
            Some(actions) => {
                for action in actions {
                    writeln!(f, "{}", action)?;
                }
            }
            None => writeln!(f, "No solution")?,
        }
        writeln!(f, "{} nodes generated", self.stats.nodes_generated)?;
        writeln!(f, "{} nodes expanded", self.stats.nodes_expanded)
    }
}

fn next_line<R: BufRead>(lines: &mut std::io::Lines<R>) -> Result<String, PlannerError> {
    let mut line = lines.next().ok_or(PlannerError::UnexpectedEof)??;
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(line)
}

fn parse_dimension(field: &'static str, line: String) -> Result<i64, PlannerError> {
    line.trim()
        .parse::<i64>()
        .map_err(|_| PlannerError::InvalidHeader { field, line })
}

/// Reads a world: a width line, a height line, then `height` rows of tile symbols.
pub fn read_world<R: BufRead>(reader: R) -> Result<World, PlannerError> {
    let mut lines = reader.lines();
    let width = parse_dimension("width", next_line(&mut lines)?)?;
    let height = parse_dimension("height", next_line(&mut lines)?)?;
    if width <= 0 || height <= 0 {
        return Err(WorldError::InvalidDimensions { width, height }.into());
    }

    let (width, height) = (width as usize, height as usize);
    let mut rows = Vec::new();
    for row in 0..height {
        let line = next_line(&mut lines)?;
        let found = line.chars().take(width).count();
        if found < width {
            return Err(WorldError::ShortRow {
                row,
                expected: width,
                found,
            }
            .into());
        }
        rows.push(line);
    }

    // Row lengths are checked before the grid is allocated.
    let mut world = World::new(width, height)?;
    world.populate(&rows)?;
    debug!(
        width,
        height,
        dirt = world.dirt_remaining(),
        agent = ?world.agent(),
        "read world"
    );
    Ok(world)
}

/// Searches for a plan that cleans `world` with the chosen strategy. `world` is not modified.
pub fn plan(world: &World, strategy: Strategy) -> Plan {
    let mut state = State::new(world.clone());
    let mut stats = SearchStats::new();
    let actions: Option<Vec<Action>> = match strategy {
        Strategy::UniformCost => uninformed_search::uniform_cost(&state, &mut stats),
        Strategy::DepthFirst => uninformed_search::depth_first(&mut state, &mut stats),
        Strategy::DepthFirstId => uninformed_search::iterative_deepening(&mut state, &mut stats),
    };
    info!(
        %strategy,
        solved = actions.is_some(),
        nodes_generated = stats.nodes_generated,
        nodes_expanded = stats.nodes_expanded,
        "search finished"
    );
    Plan {
        strategy,
        actions: actions.map(|actions| actions.into_iter().map(|action| action.0).collect()),
        stats,
    }
}

/// Replays `actions` on a copy of `world`. Every action must be legal where it is applied.
pub fn replay(world: &World, actions: &[vacuum_world_logic::Action]) -> World {
    let mut world = world.clone();
    for &action in actions {
        debug_assert!(world.legal_actions().contains(action));
        world.apply(action);
    }
    world
}

pub fn write_plan<W: Write>(
    plan: &Plan,
    format: OutputFormat,
    mut output: W,
) -> Result<(), PlannerError> {
    match format {
        OutputFormat::Text => write!(output, "{}", plan)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut output, plan)?;
            writeln!(output)?;
        }
    }
    Ok(())
}

/// Reads a world from `input`, plans, and writes the result to `output`.
///
/// Input errors are returned before anything is written.
pub fn run<R: BufRead, W: Write>(
    input: R,
    mut output: W,
    config: &PlannerConfig,
) -> Result<Plan, PlannerError> {
    let world = read_world(input)?;
    let visual = config.visual && config.format == OutputFormat::Text;
    if visual {
        writeln!(output, "{}", world)?;
    }

    let plan = plan(&world, config.strategy);

    if visual {
        if let Some(actions) = &plan.actions {
            writeln!(output, "{}", replay(&world, actions))?;
        }
    }
    write_plan(&plan, config.format, &mut output)?;
    output.flush()?;
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uninformed_search::State as _;
    use vacuum_world_logic::Action::{East, North, South, Vacuum, West};

    fn world_from(rows: &[&str]) -> World {
        let input = format!("{}\n{}\n{}\n", rows[0].len(), rows.len(), rows.join("\n"));
        read_world(input.as_bytes()).expect("valid world")
    }

    fn run_text(input: &str, strategy: Strategy) -> (Result<Plan, PlannerError>, String) {
        let mut output = Vec::new();
        let config = PlannerConfig::new(strategy, OutputFormat::Text, false);
        let result = run(input.as_bytes(), &mut output, &config);
        (result, String::from_utf8(output).unwrap())
    }

    fn stats(nodes_generated: u64, nodes_expanded: u64) -> SearchStats {
        SearchStats {
            nodes_generated,
            nodes_expanded,
        }
    }

    const ALL_STRATEGIES: [Strategy; 3] = [
        Strategy::UniformCost,
        Strategy::DepthFirst,
        Strategy::DepthFirstId,
    ];

    #[test]
    fn test_read_world_parses_header_and_rows() {
        let world = read_world("3\n2\n_*#\r\n*@_\n".as_bytes()).unwrap();
        assert_eq!(world.width(), 3);
        assert_eq!(world.height(), 2);
        assert_eq!(world.dirt_remaining(), 2);
        assert_eq!(world.agent(), Location { row: 1, col: 1 });
    }

    #[test]
    fn test_read_world_tolerates_padded_header() {
        let world = read_world(" 2 \n1\n@*\n".as_bytes()).unwrap();
        assert_eq!(world.width(), 2);
    }

    #[test]
    fn test_read_world_rejects_non_positive_dimensions() {
        assert!(matches!(
            read_world("0\n1\n".as_bytes()),
            Err(PlannerError::World(WorldError::InvalidDimensions {
                width: 0,
                height: 1
            }))
        ));
        assert!(matches!(
            read_world("2\n-1\n".as_bytes()),
            Err(PlannerError::World(WorldError::InvalidDimensions { .. }))
        ));
    }

    #[test]
    fn test_read_world_rejects_garbage_header() {
        assert!(matches!(
            read_world("two\n1\n@*\n".as_bytes()),
            Err(PlannerError::InvalidHeader { field: "width", .. })
        ));
    }

    #[test]
    fn test_read_world_rejects_short_row_before_allocating() {
        assert!(matches!(
            read_world("1000000000000\n1\n@*\n".as_bytes()),
            Err(PlannerError::World(WorldError::ShortRow {
                row: 0,
                expected: 1_000_000_000_000,
                found: 2
            }))
        ));
        assert!(matches!(
            read_world("3\n2\n@*_\n*\n".as_bytes()),
            Err(PlannerError::World(WorldError::ShortRow {
                row: 1,
                expected: 3,
                found: 1
            }))
        ));
    }

    #[test]
    fn test_read_world_reports_early_eof() {
        assert!(matches!(
            read_world("2\n".as_bytes()),
            Err(PlannerError::UnexpectedEof)
        ));
        assert!(matches!(
            read_world("2\n2\n@*\n".as_bytes()),
            Err(PlannerError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_state_key_tracks_agent_and_dirt() {
        let mut state = State::new(world_from(&["@*"]));
        assert_eq!(state.key(), (Location { row: 0, col: 0 }, 1));
        state.apply(&Action(East));
        state.apply(&Action(Vacuum));
        assert_eq!(state.key(), (Location { row: 0, col: 1 }, 0));
        assert!(state.is_goal());
    }

    #[test]
    fn test_already_clean_world_needs_no_actions() {
        let world = world_from(&["_@_", "#__"]);
        for strategy in ALL_STRATEGIES {
            let plan = plan(&world, strategy);
            assert_eq!(plan.actions, Some(vec![]), "{}", strategy);
            assert_eq!(plan.stats, stats(1, 0), "{}", strategy);
        }
    }

    // A 2x1 world with the dirt one step east of the agent.
    #[test]
    fn test_single_dirt_east_of_agent() {
        let (result, output) = run_text("2\n1\n@*\n", Strategy::DepthFirst);
        let plan = result.unwrap();
        assert_eq!(plan.actions, Some(vec![East, Vacuum]));
        assert_eq!(plan.stats, stats(4, 2));
        assert_eq!(output, "E\nV\n4 nodes generated\n2 nodes expanded\n");

        let plan = super::plan(&world_from(&["@*"]), Strategy::UniformCost);
        assert_eq!(plan.actions, Some(vec![East, Vacuum]));
        assert_eq!(plan.stats, stats(4, 2));

        let plan = super::plan(&world_from(&["@*"]), Strategy::DepthFirstId);
        assert_eq!(plan.actions, Some(vec![East, Vacuum]));
        assert_eq!(plan.stats, stats(7, 3));
    }

    // The agent is walled in and the dirt is on the far side of the wall.
    #[test]
    fn test_unreachable_dirt_has_no_solution() {
        for strategy in ALL_STRATEGIES {
            let (result, output) = run_text("3\n1\n@#*\n", strategy);
            let plan = result.unwrap();
            assert!(!plan.is_solved(), "{}", strategy);
            assert!(output.starts_with("No solution\n"), "{}", strategy);
        }
        let (_, output) = run_text("3\n1\n@#*\n", Strategy::DepthFirst);
        assert_eq!(output, "No solution\n1 nodes generated\n1 nodes expanded\n");
    }

    // Dirt on all four sides of an agent in the middle of a 3x3 grid.
    #[test]
    fn test_plus_shaped_dirt_depth_first_follows_priority_order() {
        let world = world_from(&["_*_", "*@*", "_*_"]);
        let plan = plan(&world, Strategy::DepthFirst);
        assert_eq!(
            plan.actions,
            Some(vec![
                West, Vacuum, South, East, Vacuum, West, North, East, East, Vacuum, West, West,
                North, East, Vacuum,
            ])
        );
        assert_eq!(plan.stats, stats(57, 18));
    }

    #[test]
    fn test_plus_shaped_dirt_uniform_cost_finds_shortest_plan() {
        let world = world_from(&["_*_", "*@*", "_*_"]);
        let plan = plan(&world, Strategy::UniformCost);
        assert_eq!(
            plan.actions,
            Some(vec![
                West, Vacuum, South, East, Vacuum, East, North, Vacuum, West, North, Vacuum,
            ])
        );
        assert_eq!(plan.stats, stats(393, 135));
        assert!(replay(&world, plan.actions.as_ref().unwrap()).is_goal());
    }

    #[test]
    fn test_plus_shaped_dirt_iterative_deepening_matches_shortest_length() {
        let world = world_from(&["_*_", "*@*", "_*_"]);
        let plan = plan(&world, Strategy::DepthFirstId);
        assert_eq!(
            plan.actions,
            Some(vec![
                West, Vacuum, South, East, Vacuum, East, North, Vacuum, West, North, Vacuum,
            ])
        );
        assert_eq!(plan.stats, stats(15989, 5279));
    }

    #[test]
    fn test_loop_around_pillar() {
        let world = world_from(&["__*", "_#_", "@__"]);
        let expected = Some(vec![East, East, North, North, Vacuum]);

        let depth_first = plan(&world, Strategy::DepthFirst);
        assert_eq!(depth_first.actions, expected);
        assert_eq!(depth_first.stats, stats(12, 5));

        let uniform_cost = plan(&world, Strategy::UniformCost);
        assert_eq!(uniform_cost.actions, expected);
        assert_eq!(uniform_cost.stats, stats(18, 8));

        let deepening = plan(&world, Strategy::DepthFirstId);
        assert_eq!(deepening.actions, expected);
        assert_eq!(deepening.stats, stats(49, 21));
    }

    #[test]
    fn test_depth_first_can_take_a_longer_route() {
        let world = world_from(&["@_*", "___"]);
        assert_eq!(
            plan(&world, Strategy::DepthFirst).actions,
            Some(vec![South, East, East, North, Vacuum])
        );
        assert_eq!(
            plan(&world, Strategy::UniformCost).actions,
            Some(vec![East, East, Vacuum])
        );
    }

    #[test]
    fn test_loop_with_unreachable_dirt_exhausts_every_strategy() {
        let world = world_from(&["___#*", "_#_##", "@__#_"]);
        let expected = [
            (Strategy::UniformCost, stats(17, 8)),
            (Strategy::DepthFirst, stats(31, 15)),
            (Strategy::DepthFirstId, stats(137, 64)),
        ];
        for (strategy, expected_stats) in expected {
            let plan = plan(&world, strategy);
            assert_eq!(plan.actions, None, "{}", strategy);
            assert_eq!(plan.stats, expected_stats, "{}", strategy);
        }
    }

    /// Delegates to `State` and panics if a node is expanded while its key is already on the
    /// path from the root.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct PathRecorder {
        inner: State,
        path: Vec<(Location, usize)>,
    }

    impl uninformed_search::State<Action> for PathRecorder {
        type Key = (Location, usize);

        fn get_actions(&self) -> Vec<Action> {
            assert!(
                !self.path.contains(&self.key()),
                "revisited {:?} on path {:?}",
                self.key(),
                self.path
            );
            self.inner.get_actions()
        }

        fn apply(&mut self, action: &Action) {
            self.path.push(self.key());
            self.inner.apply(action);
        }

        fn undo(&mut self, action: &Action) {
            self.inner.undo(action);
            self.path.pop();
        }

        fn is_goal(&self) -> bool {
            self.inner.is_goal()
        }

        fn key(&self) -> Self::Key {
            self.inner.key()
        }
    }

    #[test]
    fn test_depth_first_never_expands_a_state_twice_on_one_path() {
        for rows in [
            &["___#*", "_#_##", "@__#_"][..],
            &["_*_", "*@*", "_*_"][..],
            &["__*", "_#_", "@__"][..],
        ] {
            let mut recorder = PathRecorder {
                inner: State::new(world_from(rows)),
                path: Vec::new(),
            };
            let mut stats = SearchStats::new();
            let found = uninformed_search::depth_first(&mut recorder, &mut stats);
            if found.is_none() {
                assert_eq!(recorder.inner.world, world_from(rows));
                assert!(recorder.path.is_empty());
            }
        }
    }

    #[test]
    fn test_unknown_tile_writes_nothing() {
        for strategy in ALL_STRATEGIES {
            let (result, output) = run_text("2\n1\n@x\n", strategy);
            assert!(matches!(
                result,
                Err(PlannerError::World(WorldError::UnknownTile {
                    symbol: 'x',
                    row: 0,
                    col: 1
                }))
            ));
            assert!(output.is_empty());
        }
    }

    #[test]
    fn test_visual_output_shows_world_before_and_after() {
        let mut output = Vec::new();
        let config = PlannerConfig::new(Strategy::DepthFirst, OutputFormat::Text, true);
        run("2\n1\n@*\n".as_bytes(), &mut output, &config).unwrap();
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "@*\n\n_@\n\nE\nV\n4 nodes generated\n2 nodes expanded\n"
        );
    }

    #[test]
    fn test_json_output() {
        let mut output = Vec::new();
        let config = PlannerConfig::new(Strategy::UniformCost, OutputFormat::Json, true);
        run("2\n1\n@*\n".as_bytes(), &mut output, &config).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "strategy": "uniform-cost",
                "actions": ["E", "V"],
                "stats": { "nodes_generated": 4, "nodes_expanded": 2 }
            })
        );
    }

    #[test]
    fn test_json_output_without_solution() {
        let mut output = Vec::new();
        let config = PlannerConfig::new(Strategy::DepthFirst, OutputFormat::Json, false);
        run("3\n1\n@#*\n".as_bytes(), &mut output, &config).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value["actions"], serde_json::Value::Null);
    }
}
