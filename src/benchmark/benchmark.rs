use std::time::Instant;

use crate::simulation::params::{Execution, Parameters};
use crate::simulation::solver::Solver;
use crate::simulation::states::{Body, Vec2};

const DT: f32 = 1.0 / 60.0;

/// Time `Solver::update` in sequential and parallel mode for a range of n
pub fn bench_update() {
    // Different body counts to test
    let ns = [500, 1000, 2000, 4000, 6000];
    let steps = 20; // ticks per mode

    for n in ns {
        let seq = time_ticks(n, Execution::Sequential, steps, true);
        let par = time_ticks(n, Execution::Parallel, steps, true);

        println!(
            "N = {n:5}, sequential tick = {:8.6} s, parallel tick = {:8.6} s, speedup = {:5.2}x",
            seq,
            par,
            seq / par
        );
    }
}

/// Same as `bench_update` over a finer range, printed as CSV
/// Paste output directly into a spreadsheet to graph
pub fn bench_update_curve() {
    println!("N,sequential_ms,parallel_ms");

    for n in (250..=6000).step_by(250) {
        // small n: average over more ticks to smooth noise
        let steps = if n <= 1500 { 30 } else { 10 };

        let seq = time_ticks(n, Execution::Sequential, steps, false) * 1000.0;
        let par = time_ticks(n, Execution::Parallel, steps, false) * 1000.0;

        println!("{},{:.6},{:.6}", n, seq, par);
    }
}

/// Average seconds per tick
fn time_ticks(n: usize, execution: Execution, steps: u32, warm_up: bool) -> f64 {
    let params = Parameters {
        execution,
        ..Default::default()
    };
    let mut bodies = make_bodies(n, &params);
    let mut solver = match Solver::new(params) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("benchmark: {e}");
            return f64::NAN;
        }
    };

    if warm_up {
        solver.update(&mut bodies, DT);
    }

    let t0 = Instant::now();
    for _ in 0..steps {
        solver.update(&mut bodies, DT);
    }
    t0.elapsed().as_secs_f64() / steps as f64
}

/// Helper to build `n` bodies scattered inside the container
/// deterministic positions, no rand needed
fn make_bodies(n: usize, params: &Parameters) -> Vec<Body<()>> {
    let spread = params.container_radius * 0.9;

    (0..n)
        .filter_map(|i| {
            let i_f = i as f32;
            let r = spread * ((i_f * 0.618_034).fract()).sqrt();
            let angle = i_f * 2.399_963; // golden angle
            let position = params.container_center + Vec2::new(angle.cos(), angle.sin()) * r;
            Body::new(position, Vec2::zeros(), 3.0, ()).ok()
        })
        .collect()
}
