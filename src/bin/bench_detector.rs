use anyhow::Result;
use std::time::Instant;

use pose_rep_counter::config::Config;
use pose_rep_counter::exercise::{ExerciseKind, ExerciseSession};
use pose_rep_counter::pose::{Joint, Keypoint, KeypointIndex, Pose, Side};

const CONFIG_PATH: &str = "config.toml";
/// 1回のスクワットを何フレームで描くか
const FRAMES_PER_REP: usize = 30;
const REPS: usize = 1000;

/// 膝角度を指定した合成フレーム
fn synthetic_pose(knee_deg: f32) -> Pose {
    let mut keypoints = [Keypoint::new(0.5, 0.5, 0.9); KeypointIndex::COUNT];
    let theta = knee_deg.to_radians();
    for (side, cx) in [(Side::Left, 0.45), (Side::Right, 0.55)] {
        let [hip, knee, ankle] = Joint::Knee.landmarks(side);
        keypoints[hip as usize] = Keypoint::new(cx, 0.4, 0.9);
        keypoints[knee as usize] = Keypoint::new(cx, 0.6, 0.9);
        keypoints[ankle as usize] =
            Keypoint::new(cx + 0.2 * theta.sin(), 0.6 - 0.2 * theta.cos(), 0.9);
    }
    Pose::new(keypoints)
}

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);

    // 175° → 85° → 175° を1周期
    let cycle: Vec<Pose> = (0..FRAMES_PER_REP)
        .map(|i| {
            let phase = i as f32 / FRAMES_PER_REP as f32 * std::f32::consts::TAU;
            synthetic_pose(130.0 + 45.0 * phase.cos())
        })
        .collect();

    let mut session = ExerciseSession::with_exercise(config.exercise.clone(), Some(ExerciseKind::Squat));

    let start = Instant::now();
    for _ in 0..REPS {
        for pose in &cycle {
            session.analyze_frame(Some(pose));
        }
    }
    let elapsed = start.elapsed();

    let frames = REPS * FRAMES_PER_REP;
    let avg_us = elapsed.as_secs_f64() * 1_000_000.0 / frames as f64;
    println!(
        "analyze_frame: {:.3}us/frame = {:.0} frames/s ({} frames, {} reps counted)",
        avg_us,
        1_000_000.0 / avg_us,
        frames,
        session.repetition_count()
    );

    Ok(())
}
