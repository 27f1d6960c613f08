//! Replay: 記録済みの姿勢フレーム (JSON lines) を流して回数を数える
//!
//! usage: replay <frames.jsonl> [squat|pushup]

use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::BufReader;
use std::time::Instant;

use pose_rep_counter::config::Config;
use pose_rep_counter::exercise::{parse_selection, ExerciseKind, ExerciseSession};
use pose_rep_counter::log;
use pose_rep_counter::logging::open_log_file;
use pose_rep_counter::replay::{read_frames, replay};

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: {} <frames.jsonl> [squat|pushup]", args[0]);
    }
    let path = &args[1];

    let config = Config::load_or_default(CONFIG_PATH);
    let kind: Option<ExerciseKind> = match args.get(2) {
        Some(name) => Some(name.parse()?),
        None => parse_selection(&config.app.exercise)?,
    };
    let Some(kind) = kind else {
        bail!("no exercise selected (config app.exercise = \"none\")");
    };

    let logfile = open_log_file("replay")?;
    log!(logfile, "Replay ({})", env!("GIT_VERSION"));
    log!(logfile, "[replay] file={}, exercise={}", path, kind);

    let file = File::open(path).with_context(|| format!("failed to open {}", path))?;
    let frames = read_frames(BufReader::new(file)).with_context(|| format!("failed to read {}", path))?;
    log!(logfile, "[replay] loaded {} frames", frames.len());

    let mut session = ExerciseSession::with_exercise(config.exercise.clone(), Some(kind));
    let start = Instant::now();
    let summary = replay(&mut session, &frames);
    let elapsed = start.elapsed();

    for frame in &summary.completions {
        log!(logfile, "[replay] rep completed at frame {}", frame);
    }
    log!(logfile,
        "[replay] frames={}, skipped={}, repetitions={}, elapsed={:.3}ms",
        summary.frames, summary.skipped, summary.repetitions,
        elapsed.as_secs_f64() * 1000.0
    );

    Ok(())
}
