//! 記録済みの姿勢フレームの読み込みとコンソール入力
//!
//! 1行1フレームのJSON。人物が検出されなかったフレームは `null`。

use anyhow::{Context, Result};
use std::io::BufRead;

use crate::exercise::{parse_selection, ExerciseKind, ExerciseSession, PhaseSignal};
use crate::pose::Pose;

/// 1フレーム分をパース
pub fn parse_frame(line: &str) -> Result<Option<Pose>> {
    let frame: Option<Pose> = serde_json::from_str(line).context("invalid pose frame")?;
    Ok(frame)
}

/// 空行と `#` で始まる行は読み飛ばす
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<Option<Pose>>> {
    let mut frames = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", i + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let frame = parse_frame(line).with_context(|| format!("line {}", i + 1))?;
        frames.push(frame);
    }
    Ok(frames)
}

/// コンソール入力
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Frame(Option<Pose>),
    Select(Option<ExerciseKind>),
    Reset,
    Status,
    Quit,
    Empty,
}

pub fn parse_input(line: &str) -> Result<Input> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Input::Empty);
    }
    if line.starts_with('{') || line == "null" {
        return Ok(Input::Frame(parse_frame(line)?));
    }
    match line {
        "reset" => Ok(Input::Reset),
        "status" | "s" => Ok(Input::Status),
        "q" | "quit" => Ok(Input::Quit),
        other => Ok(Input::Select(parse_selection(other)?)),
    }
}

/// 表示用の角度。角度なしは "-" (0.0と区別する)
pub fn format_angle(angle: Option<f32>) -> String {
    match angle {
        Some(a) => format!("{:.1}", a),
        None => "-".to_string(),
    }
}

/// リプレイ結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: usize,
    /// 人物なし・角度なしで飛ばしたフレーム数
    pub skipped: usize,
    pub repetitions: u32,
    /// 回数が増えたフレーム番号 (0始まり)
    pub completions: Vec<usize>,
}

pub fn replay(session: &mut ExerciseSession, frames: &[Option<Pose>]) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (i, frame) in frames.iter().enumerate() {
        let pose = frame.as_ref();
        let has_angle = session
            .detector()
            .and_then(|d| d.frame_angle(pose))
            .is_some();
        if !has_angle {
            summary.skipped += 1;
        }
        if session.analyze_frame(pose) == PhaseSignal::Completed {
            summary.completions.push(i);
        }
        summary.frames += 1;
    }
    summary.repetitions = session.repetition_count();
    summary
}
