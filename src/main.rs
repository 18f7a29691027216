use vsim::{Scenario, ScenarioConfig};
use vsim::{bench_update, bench_update_curve};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Headless Verlet circle simulation")]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "faucets.yaml")]
    file_name: String,

    /// Override the tick count from the scenario
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Print the final render extract, one circle per line
    #[arg(long)]
    dump: bool,

    /// Run the solver benchmark instead of a scenario
    #[arg(long)]
    bench: bool,

    /// Print the benchmark as CSV over a finer range of body counts
    #[arg(long)]
    bench_curve: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.bench {
        bench_update();
        return Ok(());
    }
    if args.bench_curve {
        bench_update_curve();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let mut scenario = Scenario::build_scenario(scenario_cfg).context("invalid scenario")?;
    let ticks = args.ticks.unwrap_or(scenario.ticks);

    info!("running {} for {} ticks", args.file_name, ticks);
    let started = Instant::now();

    for _ in 0..ticks {
        scenario.step()?;

        if scenario.tick() % 60 == 0 {
            let stats = scenario.solver.stats();
            info!(
                "tick {:5}: {:5} bodies, {:6} corrections, {:4} regions",
                scenario.tick(),
                stats.bodies,
                stats.corrections,
                stats.regions
            );
        }
    }

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        "done: {} bodies ({} spawned, {} culled) in {:.3} s, {:.3} ms/tick",
        scenario.bodies.len(),
        scenario.spawned(),
        scenario.culled(),
        elapsed,
        if ticks > 0 { elapsed * 1000.0 / ticks as f64 } else { 0.0 }
    );

    if args.dump {
        for c in scenario.render_frame() {
            println!("{} {} {} {} {} {} {}", c.x, c.y, c.radius, c.color.r, c.color.g, c.color.b, c.color.a);
        }
    }

    Ok(())
}
