use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use ftlog::appender::FileAppender;
use ftlog::{LevelFilter, LoggerGuard};

use tinkertoy::physical_model::PhysicalModel;
use tinkertoy::{Integrator, SimConfig, Stepper, System};

/// Runs the cloth scene headless and reports energy and constraint drift.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
	/// 1 euler, 2 rk2, 3 symplectic euler, 4 rk4 (default on anything else)
	integrator: String,

	/// Viewer grid size, logged only
	#[arg(requires_all = ["dt", "d"])]
	n: Option<usize>,

	/// Time step
	dt: Option<f64>,

	/// Viewer parameter, logged only
	d: Option<f64>,

	#[arg(short('s'), long, default_value_t = 1000)]
	steps: usize,

	#[arg(short('r'), long, default_value_t = 100)]
	report_every: usize,

	/// Write logs here instead of stderr
	#[arg(short('l'), long)]
	log_file: Option<PathBuf>,

	/// Log every solve
	#[arg(short('v'), long, default_value_t = false)]
	verbose: bool,
}

fn configure_logger(args: &Args) -> Result<LoggerGuard, String> {
	let level = if args.verbose {
		LevelFilter::Debug
	} else {
		LevelFilter::Info
	};
	let builder = ftlog::Builder::new().max_log_level(level);
	let builder = match &args.log_file {
		Some(path) => builder.root(FileAppender::new(path)),
		// default root writes to stderr
		None => builder,
	};
	builder.try_init().map_err(|e| e.to_string())
}

fn report(sys: &System, step: usize) -> Result<(), String> {
	let (kinetic, potential) = sys.energy().map_err(|e| e.to_string())?;
	let drift = sys.max_violation().map_err(|e| e.to_string())?;
	ftlog::info!(
		"step {step}: kinetic {kinetic:.6e}, potential {potential:.6e}, total {:.6e}, max |C| {drift:.3e}",
		kinetic + potential
	);
	Ok(())
}

fn main() -> Result<(), String> {
	let args = Args::parse();
	let _guard = configure_logger(&args)?;

	let method = Integrator::from_code(&args.integrator);
	let (n, dt, d) = match (args.n, args.dt, args.d) {
		(Some(n), Some(dt), Some(d)) => (n, dt, d),
		_ => {
			let defaults = (64, 0.01, 5.0);
			ftlog::info!(
				"Using defaults : N={} dt={} d={}",
				defaults.0,
				defaults.1,
				defaults.2
			);
			defaults
		}
	};
	ftlog::info!(
		"integrator {} ({} evaluations per step), N={n} dt={dt} d={d}",
		method.name(),
		method.evaluations()
	);

	let mut sys = PhysicalModel::default()
		.into_system(SimConfig::default())
		.map_err(|e| e.to_string())?;
	ftlog::info!(
		"{} particles, {} springs, {} constraints",
		sys.len(),
		sys.get_forces().len(),
		sys.constraint_count()
	);
	let mut stepper = Stepper::new(method);

	report(&sys, 0)?;
	let start = Instant::now();
	for step in 1..=args.steps {
		stepper.step(&mut sys, dt).map_err(|e| format!("step {step}: {e}"))?;
		if args.report_every > 0 && step % args.report_every == 0 {
			report(&sys, step)?;
		}
	}
	let elapsed = start.elapsed().as_secs_f64();
	let simulated = args.steps as f64 * dt;
	if simulated > 0.0 {
		let evaluations = args.steps * method.evaluations();
		ftlog::info!(
			"{:.3}s wall for {simulated:.3}s simulated ({:.1}% of real time), {:.1}us per evaluation",
			elapsed,
			elapsed / simulated * 100.0,
			elapsed * 1e6 / evaluations as f64
		);
	}
	let model = sys.pr_model().map_err(|e| e.to_string())?;
	if let Some((min, max)) = model.bounds() {
		ftlog::info!(
			"final extent ({:.3}, {:.3}) .. ({:.3}, {:.3})",
			min[0],
			min[1],
			max[0],
			max[1]
		);
	}
	Ok(())
}
