use vsim::{Body, Execution, Parameters, Scenario, ScenarioConfig, Solver, SpeedLimit, Vec2};
use vsim::{collide, is_colliding, RegionScheduler, SpatialHash};

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

const DT: f32 = 1.0 / 60.0;

/// `n` bodies of radius `r` scattered over a disc inside the default container
/// (golden-angle spiral, deterministic, no rand needed)
pub fn scattered_bodies(n: usize, r: f32) -> Vec<Body<usize>> {
    let p = Parameters::default();
    let spread = p.container_radius * 0.9;

    (0..n)
        .map(|i| {
            let i_f = i as f32;
            let dist = spread * ((i_f + 0.5) / n as f32).sqrt();
            let angle = i_f * 2.399_963;
            let x = p.container_center + Vec2::new(angle.cos(), angle.sin()) * dist;
            Body::new(x, Vec2::zeros(), r, i).unwrap()
        })
        .collect()
}

/// Default parameters with a given execution mode
pub fn test_params(execution: Execution) -> Parameters {
    Parameters {
        execution,
        ..Default::default()
    }
}

pub fn run(bodies: &mut Vec<Body<usize>>, params: Parameters, ticks: usize) {
    let mut solver = Solver::new(params).unwrap();
    for _ in 0..ticks {
        solver.update(bodies, DT);
    }
}

/// Allowed overshoot past the container: one integration step at the speed
/// cap plus a collision push-out after the constraint ran
fn container_tolerance(p: &Parameters, radius: f32) -> f32 {
    p.max_speed + 2.0 * radius
}

// ==================================================================================
// Body invariants
// ==================================================================================

#[test]
fn radius_is_immutable_across_ticks() {
    let mut bodies = scattered_bodies(300, 3.0);
    run(&mut bodies, test_params(Execution::Parallel), 30);

    assert!(bodies.iter().all(|b| b.radius() == 3.0));
}

#[test]
fn acceleration_is_zero_after_every_update() {
    let mut bodies = scattered_bodies(200, 3.0);
    let mut solver = Solver::new(test_params(Execution::Parallel)).unwrap();

    for _ in 0..5 {
        solver.update(&mut bodies, DT);
        for b in &bodies {
            assert_eq!(b.acceleration, Vec2::zeros());
        }
    }
}

#[test]
fn payload_is_carried_through() {
    let mut bodies = scattered_bodies(100, 3.0);
    run(&mut bodies, test_params(Execution::Parallel), 10);

    for (i, b) in bodies.iter().enumerate() {
        assert_eq!(*b.payload(), i);
    }
}

// ==================================================================================
// Collision tests
// ==================================================================================

#[test]
fn collide_increases_distance_by_exactly_the_overlap() {
    for (d, ra, rb) in [(4.0_f32, 3.0_f32, 3.0_f32), (0.5, 2.0, 5.0), (6.9, 3.5, 3.5)] {
        let mut a = Vec2::new(100.0, 100.0);
        let mut b = a + Vec2::new(d, 0.0);
        let (a0, b0) = (a, b);
        let overlap = ra + rb - d;

        assert!(collide(&mut a, ra, &mut b, rb));

        let after = (a - b).norm();
        assert!(after > d, "distance did not grow: {} -> {}", d, after);

        let moved = (a - a0).norm() + (b - b0).norm();
        assert!((moved - overlap).abs() < 1e-4, "moved {} expected {}", moved, overlap);
    }
}

#[test]
fn collide_on_separated_pair_is_noop() {
    let mut a = Vec2::new(10.0, 10.0);
    let mut b = Vec2::new(16.0, 10.0); // touching, not overlapping
    assert!(!is_colliding(&a, 3.0, &b, 3.0));
    assert!(!collide(&mut a, 3.0, &mut b, 3.0));
    assert_eq!(a, Vec2::new(10.0, 10.0));
    assert_eq!(b, Vec2::new(16.0, 10.0));
}

#[test]
fn one_pass_separates_overlapping_pair_symmetrically() {
    let mut positions = vec![Vec2::new(398.0, 300.0), Vec2::new(402.0, 300.0)];
    let radii = vec![3.0, 3.0];

    let mut hash = SpatialHash::new(8.0).unwrap();
    hash.build(&positions);
    let mut scheduler = RegionScheduler::new(8).unwrap();
    scheduler.plan(&hash);

    scheduler.resolve(&hash, &mut positions, &radii, Execution::Parallel);

    assert!(((positions[0] - positions[1]).norm() - 6.0).abs() < 1e-4);
    assert!((positions[0].x - 397.0).abs() < 1e-4);
    assert!((positions[1].x - 403.0).abs() < 1e-4);
    assert_eq!(positions[0].y, 300.0);
}

#[test]
fn body_level_overlap_check() {
    let a = Body::new(Vec2::new(0.0, 0.0), Vec2::zeros(), 3.0, 0).unwrap();
    let b = Body::new(Vec2::new(5.0, 0.0), Vec2::zeros(), 3.0, 1).unwrap();
    let c = Body::new(Vec2::new(7.0, 0.0), Vec2::zeros(), 3.0, 2).unwrap();
    assert!(a.is_colliding(&b));
    assert!(!a.is_colliding(&c));
}

// ==================================================================================
// Solver scenarios
// ==================================================================================

#[test]
fn single_body_falls_and_stays_inside() {
    let params = Parameters {
        gravity: Vec2::new(0.0, 1500.0),
        substeps: 8,
        ..Default::default()
    };
    let container = params.container_center;
    let radius = params.container_radius;

    let mut bodies = vec![Body::new(Vec2::new(400.0, 100.0), Vec2::zeros(), 3.0, 0).unwrap()];
    let mut solver = Solver::new(params).unwrap();
    solver.update(&mut bodies, DT);

    let p = bodies[0].current_position;
    assert!(p.y > 100.0, "body did not fall: {:?}", p);
    assert!((p.x - 400.0).abs() < 1e-5);
    assert!((p - container).norm() <= radius - 3.0);
}

#[test]
fn thousand_bodies_stay_finite_and_contained() {
    let params = test_params(Execution::Parallel);
    let center = params.container_center;
    let eps = container_tolerance(&params, 3.0);
    let limit = params.container_radius - 3.0 + eps;

    let mut bodies = scattered_bodies(1000, 3.0);
    let mut solver = Solver::new(params).unwrap();

    // 60 ticks x 8 substeps = 480 substeps
    for tick in 0..60 {
        solver.update(&mut bodies, DT);

        for b in &bodies {
            let p = b.current_position;
            assert!(p.x.is_finite() && p.y.is_finite(), "tick {}: non-finite {:?}", tick, p);
            assert!(
                (p - center).norm() <= limit,
                "tick {}: body {} escaped to {:?}",
                tick,
                b.payload(),
                p
            );
        }
    }
    assert_eq!(solver.stats().substeps, 8);
}

#[test]
fn sequential_runs_are_identical() {
    let mut a = scattered_bodies(500, 3.0);
    let mut b = scattered_bodies(500, 3.0);
    run(&mut a, test_params(Execution::Sequential), 20);
    run(&mut b, test_params(Execution::Sequential), 20);

    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.current_position, y.current_position);
        assert_eq!(x.previous_position, y.previous_position);
    }
}

#[test]
fn parallel_run_matches_sequential_reference() {
    let mut reference = scattered_bodies(800, 3.0);
    let mut parallel = scattered_bodies(800, 3.0);
    run(&mut reference, test_params(Execution::Sequential), 20);
    run(&mut parallel, Parameters { worker_threads: Some(4), ..test_params(Execution::Parallel) }, 20);

    for (x, y) in reference.iter().zip(&parallel) {
        assert!((x.current_position - y.current_position).norm() < 1e-3);
    }
}

#[test]
fn growing_and_shrinking_collections_are_tolerated() {
    let mut solver = Solver::new(test_params(Execution::Parallel)).unwrap();
    let mut bodies = scattered_bodies(50, 3.0);

    solver.update(&mut bodies, DT);
    bodies.extend(scattered_bodies(120, 2.0));
    solver.update(&mut bodies, DT);
    bodies.retain(|b| b.payload() % 3 != 0);
    solver.update(&mut bodies, DT);
    bodies.clear();
    solver.update(&mut bodies, DT);

    assert_eq!(solver.stats().bodies, 0);
}

#[test]
fn clamp_policy_keeps_speed_under_cap() {
    let params = Parameters {
        speed_limit: SpeedLimit::Clamp,
        ..test_params(Execution::Parallel)
    };
    let max_speed = params.max_speed;

    let mut bodies = scattered_bodies(400, 3.0);
    run(&mut bodies, params, 30);

    for b in &bodies {
        assert!(b.velocity().norm() <= max_speed + 1e-4);
    }
}

// ==================================================================================
// Scenario files
// ==================================================================================

fn load(name: &str) -> ScenarioConfig {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(name);
    let reader = BufReader::new(File::open(path).unwrap());
    serde_yaml::from_reader(reader).unwrap()
}

#[test]
fn bundled_scenarios_build() {
    for name in ["faucets.yaml", "pile.yaml"] {
        assert!(Scenario::build_scenario(load(name)).is_ok(), "{} failed to build", name);
    }
}

#[test]
fn pile_scenario_settles_inside_container() {
    let mut scenario = Scenario::build_scenario(load("pile.yaml")).unwrap();
    scenario.run(120).unwrap();

    let container = *scenario.solver.container();
    let eps = container_tolerance(scenario.solver.parameters(), 3.0);
    assert_eq!(scenario.render_frame().len(), 5);
    for b in &scenario.bodies {
        assert!(container.contains(b, eps));
    }
}

#[test]
fn faucets_fill_over_time() {
    let mut scenario = Scenario::build_scenario(load("faucets.yaml")).unwrap();
    scenario.run(40).unwrap();

    // three emitters every 4th tick
    assert_eq!(scenario.spawned(), 30);
    assert_eq!(scenario.bodies.len() + scenario.culled(), 30);
}
