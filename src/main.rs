use anyhow::Result;
use std::io::{self, BufRead, Write};

use pose_rep_counter::config::Config;
use pose_rep_counter::exercise::{parse_selection, ExerciseSession, PhaseSignal};
use pose_rep_counter::log;
use pose_rep_counter::logging::open_log_file;
use pose_rep_counter::replay::{format_angle, parse_input, Input};

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);
    let logfile = open_log_file("session")?;

    log!(logfile, "=== Pose Rep Counter ({}) ===", env!("GIT_VERSION"));
    log!(logfile,
        "[config] confidence_threshold={}, hysteresis={}, squat={}/{}, pushup={}/{}",
        config.exercise.confidence_threshold, config.exercise.hysteresis,
        config.exercise.squat.extended, config.exercise.squat.flexed,
        config.exercise.pushup.extended, config.exercise.pushup.flexed
    );
    println!();
    println!("入力:");
    println!("  {{\"keypoints\": [[x, y, c], ...]}}  - 1フレーム分の姿勢 (17点)");
    println!("  null                            - 人物なしフレーム");
    println!("  squat | pushup | none           - 種目を切り替え");
    println!("  reset                           - カウントをリセット");
    println!("  s                               - 現在の状態を表示");
    println!("  q                               - 終了");
    println!();

    let mut session = ExerciseSession::with_exercise(
        config.exercise.clone(),
        parse_selection(&config.app.exercise)?,
    );
    log!(logfile, "[session] exercise={}", exercise_label(&session));

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut frame_index = 0u64;

    loop {
        print!("> ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };

        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(e) => {
                println!("不正な入力: {:#}", e);
                continue;
            }
        };

        match input {
            Input::Empty => continue,
            Input::Frame(pose) => {
                let signal = session.analyze_frame(pose.as_ref());
                if signal == PhaseSignal::Completed || config.app.verbose {
                    log!(logfile,
                        "[frame {}] {} count={} angle={}",
                        frame_index, signal, session.repetition_count(),
                        format_angle(session.current_angle())
                    );
                } else {
                    println!("{} count={}", signal, session.repetition_count());
                }
                frame_index += 1;
            }
            Input::Select(kind) => {
                session.set_exercise(kind);
                log!(logfile, "[session] exercise={}", exercise_label(&session));
            }
            Input::Reset => {
                session.reset();
                log!(logfile, "[session] reset");
            }
            Input::Status => {
                println!("  種目: {}", exercise_label(&session));
                println!("  状態: {:?}", session.state());
                println!("  回数: {}", session.repetition_count());
                println!("  角度: {}", format_angle(session.current_angle()));
            }
            Input::Quit => break,
        }
    }

    log!(logfile,
        "[session] end exercise={} count={} frames={}",
        exercise_label(&session), session.repetition_count(), frame_index
    );
    Ok(())
}

fn exercise_label(session: &ExerciseSession) -> String {
    session
        .exercise()
        .map_or_else(|| "none".to_string(), |k| k.to_string())
}
