//! Prints the solved pose of every recorded frame as JSON lines.
//!
//! Useful for tuning dampeners: pipe the output into a plotting script.

use anyhow::{Context, Result};
use std::io::{self, BufWriter, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

use puppet_tracker::config::Config;
use puppet_tracker::pose::ReplayFrames;
use puppet_tracker::solver::HolisticSolver;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    // stdout は JSON 出力専用なのでログは stderr へ
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("puppet_tracker=info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let recording = args
        .next()
        .context("usage: solve_dump <recording.jsonl> [config.toml]")?;
    let config = Config::load_or_default(args.next().as_deref().unwrap_or(CONFIG_PATH));

    let frames = ReplayFrames::load(&recording)?;
    let solver = HolisticSolver::new(&config);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut empty = 0usize;
    for set in frames.frames() {
        let frame = solver.solve(set);
        if frame.is_empty() {
            empty += 1;
        }
        serde_json::to_writer(&mut out, &frame).context("Failed to write solved frame")?;
        writeln!(out)?;
    }
    out.flush()?;

    info!(
        "Solve dump {}: {} frame(s), {} without any solved part",
        env!("GIT_VERSION"),
        frames.len(),
        empty
    );
    Ok(())
}
