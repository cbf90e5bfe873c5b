//! `fixpt`: fixed-point FBBT at the root node of an MPS model.

mod driver;
mod mps;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{ensure, Result};
use clap::Parser;
use fixpt_mip::{FbbtSettings, PropagationPolicy};

use crate::driver::run_root;
use crate::mps::read_mps;

#[derive(Debug, Parser)]
#[command(author, version, about = "Fixed-point FBBT as a cutting plane at the root node")]
struct Cli {
    /// MPS model to read.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Add fixed-point FBBT cuts (default: off).
    #[arg(short = 'f', long = "fixpt")]
    fixpt: bool,

    /// Deepest node at which FBBT runs.
    #[arg(long, value_name = "INT", default_value = "0")]
    max_depth: usize,

    /// Treat row sides as variables of the propagation LP.
    #[arg(long)]
    extended: bool,

    /// Numeric tolerance for accepting a tightened bound.
    #[arg(long, value_name = "FLOAT", default_value = "1e-5")]
    tol: f64,

    /// Print the statistics as one CSV line.
    #[arg(long)]
    csv: bool,

    /// Log debug output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Cli::parse();

    simplelog::TermLogger::init(
        if args.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    let model = read_mps(&args.file)?;
    println!(
        "{}: {} rows, {} columns ({} integer)",
        model.name,
        model.num_rows(),
        model.num_cols(),
        model.num_integral()
    );

    let settings = args.fixpt.then(|| {
        FbbtSettings::default()
            .with_max_depth(args.max_depth)
            .with_policy(if args.extended {
                PropagationPolicy::ExtendedModel
            } else {
                PropagationPolicy::RhsConstant
            })
            .with_tolerance(args.tol)
    });

    let report = run_root(&model, settings)?;
    let relax = &report.relaxation;
    ensure!(
        relax.status.is_optimal(),
        "Failed to optimize root relaxation: {:?}",
        relax.status
    );

    println!("Solution value  = {:.6}", relax.objective);
    let nonzeros: Vec<String> = relax
        .x
        .iter()
        .enumerate()
        .filter(|(_, v)| v.abs() > 1e-6)
        .map(|(i, v)| format!("({},{})", i, v))
        .collect();
    for line in nonzeros.chunks(10) {
        println!("{}", line.join(" "));
    }

    if let Some(eval) = &report.evaluation {
        println!(
            "fixed-point FBBT at root: {:?}, {} cuts in {:.3} s",
            eval.outcome,
            eval.cuts_added(),
            eval.elapsed.as_secs_f64()
        );
    }
    if args.fixpt {
        for cut in &report.cuts {
            println!("cut {} ({})", cut, model.col_names[cut.column]);
        }
        if args.csv {
            println!("{}", report.stats.csv_row());
        } else {
            println!("{}", report.stats);
        }
    }

    println!("Done in {:.3} s", time_total.elapsed().as_secs_f64());
    Ok(())
}
