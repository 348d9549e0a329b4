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

mod logging;

use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::debug;
use vacuum_world_planner::{OutputFormat, PlannerConfig, Strategy};

// Chapter 3 Solving Problems by Searching.
//
// Reads a vacuum world from stdin:
//
//     <width>
//     <height>
//     <height rows of _ (clean), * (dirty), # (blocked), @ (agent, clean)>
//
// and prints one action per line (V, N, S, E, W), or "No solution", followed by the number of
// nodes generated and expanded.

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SearchArg {
    UniformCost,
    DepthFirst,
    /// Depth-first with iterative deepening.
    DepthFirstId,
}

impl From<SearchArg> for Strategy {
    fn from(search: SearchArg) -> Self {
        match search {
            SearchArg::UniformCost => Strategy::UniformCost,
            SearchArg::DepthFirst => Strategy::DepthFirst,
            SearchArg::DepthFirstId => Strategy::DepthFirstId,
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "vacuum-world-planner",
    version,
    about = "Plans a sequence of actions that cleans a vacuum world read from stdin"
)]
struct Cli {
    /// Search strategy.
    #[arg(value_enum)]
    search: SearchArg,

    /// Print the world before and after the plan.
    #[arg(short, long)]
    visual: bool,

    /// Print the plan as JSON.
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> PlannerConfig {
        let format = if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };
        PlannerConfig::new(self.search.into(), format, self.visual)
    }
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();
    let config = cli.config();
    debug!(strategy = %config.strategy, visual = config.visual, "starting");

    let stdout = io::stdout();
    vacuum_world_planner::run(io::stdin().lock(), BufWriter::new(stdout.lock()), &config)
        .context("failed to plan")?;
    Ok(())
}
