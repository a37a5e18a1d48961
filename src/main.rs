// Copyright (C) 2022-2026 The Rill Contributors.
// This file is part of the Rill library.

// The Rill library is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// The Rill library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with the Rill library. If not, see <https://www.gnu.org/licenses/>.

//! The rill command-line interface.

use rill_ir::GraphDef;
use rill_passes::optimize;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rill", author, version, about)]
struct Cli {
    /// The verbosity level (0 = warn, 1 = info, 2 = debug, 3 = trace).
    #[arg(short, long, global = true, default_value_t = 0)]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrites the function calls of a graph into framed inlined form.
    Transform {
        /// The graph to transform, in JSON form.
        graph: PathBuf,
        /// A tensor whose producing node keeps its name (`node:port`).
        #[arg(long)]
        fetch: Vec<String>,
        /// Writes the transformed graph here instead of standard output.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbosity);

    match cli.command {
        Command::Transform { graph, fetch, output } => {
            let json = fs::read_to_string(&graph)
                .with_context(|| format!("failed to read `{}`", graph.display()))?;
            let input = GraphDef::from_json_string(&json)?;
            let transformed = optimize(&input, &fetch)?;
            let rendered = transformed.to_json_string()?;
            match output {
                Some(path) => fs::write(&path, rendered)
                    .with_context(|| format!("failed to write `{}`", path.display()))?,
                None => println!("{rendered}"),
            }
        }
    }
    Ok(())
}
