use std::hint::black_box;
use std::time::Instant;

use fieldwalk_common::{CameraConfig, Obstacle};
use fieldwalk_input::{Action, HeldActions};
use fieldwalk_kernel::{PlayerState, SceneState, camera_frame};

fn make_scene(obstacle_count: usize) -> SceneState {
    let obstacles = (0..obstacle_count)
        .map(|i| {
            let angle = i as f32 * 0.37;
            Obstacle::new(
                glam::Vec3::new(angle.cos() * 120.0, 0.0, angle.sin() * 120.0),
                4.0,
            )
        })
        .collect();
    SceneState::new(PlayerState::default(), obstacles, 250.0)
}

fn bench_step(obstacle_count: usize, iterations: usize) {
    let mut scene = make_scene(obstacle_count);
    let held: HeldActions = [Action::MoveForward, Action::TurnLeft].into_iter().collect();

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(scene.step(black_box(held)));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!(
        "  step ({obstacle_count} obstacles, {iterations} iters): {per_iter:?}/iter, total {elapsed:?}"
    );
}

fn bench_camera(iterations: usize) {
    let scene = make_scene(2);
    let config = CameraConfig::default();

    let start = Instant::now();
    for _ in 0..iterations {
        black_box(camera_frame(black_box(scene.player()), &config));
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / iterations as u32;
    println!("  camera_frame ({iterations} iters): {per_iter:?}/iter, total {elapsed:?}");
}

fn main() {
    println!("=== Simulation step benchmarks ===");
    for count in [2, 64, 1024] {
        bench_step(count, 100_000);
    }
    bench_camera(100_000);
}
