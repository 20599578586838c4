use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use mbody_core::{CustomForces, RunRequest, RunResult, ScenarioLoader};

/// Run a multi-body simulation request and print the result as JSON.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Request file (.yaml, .yml or .json), or a scenario name with --scenarios
    request: String,

    /// Directory to look the request up in by name
    #[arg(long)]
    scenarios: Option<PathBuf>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON
    #[arg(long)]
    pretty: bool,

    /// Only print a one-line summary
    #[arg(long)]
    summary: bool,
}

fn load_request(args: &Args) -> Result<RunRequest> {
    let request = match &args.scenarios {
        Some(dir) => ScenarioLoader::new(dir)
            .load(&args.request)
            .with_context(|| {
                format!(
                    "loading scenario {:?} from {}",
                    args.request,
                    dir.display()
                )
            })?,
        None => RunRequest::from_path(&args.request)
            .with_context(|| format!("loading request {}", args.request))?,
    };
    log::info!(
        "loaded {} bodies, {} constraints, {} steps of {}s ({})",
        request.bodies.len(),
        request.constraints.len(),
        request.steps,
        request.timestep,
        request.method
    );
    Ok(request)
}

fn write_result(args: &Args, result: &RunResult) -> Result<()> {
    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if args.summary {
        let final_energy = result.energy_profile.last().copied().unwrap_or_default();
        writeln!(
            out,
            "steps={} total_time={} collisions={} final_energy={}",
            result.steps.len(),
            result.total_time,
            result.collision_count,
            final_energy
        )?;
    } else if args.pretty {
        serde_json::to_writer_pretty(&mut out, result)?;
        writeln!(out)?;
    } else {
        serde_json::to_writer(&mut out, result)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();
    let request = load_request(&args)?;
    let result = request
        .run(&CustomForces::new())
        .context("simulation failed")?;

    log::info!(
        "simulated {}s, {} collisions",
        result.total_time,
        result.collision_count
    );
    write_result(&args, &result)
}
