use anyhow::{bail, Result};
use std::str::FromStr;

use super::phase::{MotionState, PhaseSignal, Thresholds};
use crate::config::ExerciseConfig;
use crate::pose::{AngleCalculator, Joint, Pose};

/// 種目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseKind {
    /// 膝角度（左右平均）
    Squat,
    /// 肘角度（左右平均）
    PushUp,
}

impl ExerciseKind {
    /// 監視する関節
    pub fn joint(self) -> Joint {
        match self {
            ExerciseKind::Squat => Joint::Knee,
            ExerciseKind::PushUp => Joint::Elbow,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ExerciseKind::Squat => "squat",
            ExerciseKind::PushUp => "pushup",
        }
    }

    pub fn thresholds(self, config: &ExerciseConfig) -> Thresholds {
        let t = match self {
            ExerciseKind::Squat => config.squat,
            ExerciseKind::PushUp => config.pushup,
        };
        Thresholds::new(t.extended, t.flexed, config.hysteresis)
    }
}

impl FromStr for ExerciseKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "squat" => Ok(ExerciseKind::Squat),
            "pushup" | "push-up" | "push_up" => Ok(ExerciseKind::PushUp),
            other => bail!("unknown exercise: {}", other),
        }
    }
}

impl std::fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// "none" を含む種目選択をパース
pub fn parse_selection(s: &str) -> Result<Option<ExerciseKind>> {
    if s.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    s.parse().map(Some)
}

/// 1種目分の回数カウンタ
///
/// フレームは時系列順に渡すこと。インスタンスへのアクセスは呼び出し側で直列化する。
#[derive(Debug, Clone)]
pub struct ExerciseDetector {
    kind: ExerciseKind,
    thresholds: Thresholds,
    calculator: AngleCalculator,
    state: MotionState,
    count: u32,
    last_angle: Option<f32>,
}

impl ExerciseDetector {
    pub fn new(kind: ExerciseKind, thresholds: Thresholds, calculator: AngleCalculator) -> Self {
        Self {
            kind,
            thresholds,
            calculator,
            state: MotionState::default(),
            count: 0,
            last_angle: None,
        }
    }

    pub fn from_config(kind: ExerciseKind, config: &ExerciseConfig) -> Self {
        Self::new(
            kind,
            kind.thresholds(config),
            AngleCalculator::new(config.confidence_threshold),
        )
    }

    pub fn kind(&self) -> ExerciseKind {
        self.kind
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// 1フレームを処理
    ///
    /// 人物なし・角度なしのフレームは状態を変えずにIdleを返す。
    pub fn analyze_frame(&mut self, pose: Option<&Pose>) -> PhaseSignal {
        match self.frame_angle(pose) {
            Some(angle) => self.analyze_angle(angle),
            None => PhaseSignal::Idle,
        }
    }

    /// このフレームで監視する角度（状態は変えない）
    pub fn frame_angle(&self, pose: Option<&Pose>) -> Option<f32> {
        pose.and_then(|p| self.calculator.bilateral_angle(p, self.kind.joint()))
    }

    /// 角度を直接与えて遷移させる
    pub fn analyze_angle(&mut self, angle: f32) -> PhaseSignal {
        let (next, signal) = self.state.next(angle, &self.thresholds);
        if signal == PhaseSignal::Completed {
            self.count += 1;
        }
        self.state = next;
        self.last_angle = Some(angle);
        signal
    }

    pub fn repetition_count(&self) -> u32 {
        self.count
    }

    /// 最後に計算できた角度
    pub fn current_angle(&self) -> Option<f32> {
        self.last_angle
    }

    /// 表示用: 角度なしを0.0として返す
    pub fn current_angle_or_zero(&self) -> f32 {
        self.last_angle.unwrap_or(0.0)
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = MotionState::default();
        self.count = 0;
        self.last_angle = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::{Keypoint, KeypointIndex, Side};

    fn squat() -> ExerciseDetector {
        ExerciseDetector::from_config(ExerciseKind::Squat, &ExerciseConfig::default())
    }

    fn feed(detector: &mut ExerciseDetector, angles: &[f32]) -> Vec<PhaseSignal> {
        angles.iter().map(|a| detector.analyze_angle(*a)).collect()
    }

    /// 両側の関節を指定角度にした姿勢
    fn pose_with(joint: Joint, angle_deg: f32, confidence: f32) -> Pose {
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];
        let theta = angle_deg.to_radians();
        for (side, cx) in [(Side::Left, 0.4), (Side::Right, 0.6)] {
            let [proximal, vertex, distal] = joint.landmarks(side);
            keypoints[proximal as usize] = Keypoint::new(cx, 0.3, confidence);
            keypoints[vertex as usize] = Keypoint::new(cx, 0.5, confidence);
            keypoints[distal as usize] =
                Keypoint::new(cx + 0.2 * theta.sin(), 0.5 - 0.2 * theta.cos(), confidence);
        }
        Pose::new(keypoints)
    }

    #[test]
    fn test_thresholds_from_config() {
        let config = ExerciseConfig::default();
        assert_eq!(ExerciseKind::Squat.thresholds(&config), Thresholds::new(160.0, 100.0, 10.0));
        assert_eq!(ExerciseKind::PushUp.thresholds(&config), Thresholds::new(155.0, 100.0, 10.0));
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("squat".parse::<ExerciseKind>().unwrap(), ExerciseKind::Squat);
        assert_eq!("Push-Up".parse::<ExerciseKind>().unwrap(), ExerciseKind::PushUp);
        assert!("plank".parse::<ExerciseKind>().is_err());
        assert_eq!(parse_selection("none").unwrap(), None);
        assert_eq!(parse_selection("pushup").unwrap(), Some(ExerciseKind::PushUp));
    }

    #[test]
    fn test_initial_state() {
        let d = squat();
        assert_eq!(d.state(), MotionState::Extended);
        assert_eq!(d.repetition_count(), 0);
        assert_eq!(d.current_angle(), None);
        assert_eq!(d.current_angle_or_zero(), 0.0);
    }

    #[test]
    fn test_full_repetition() {
        let mut d = squat();
        let signals = feed(&mut d, &[170.0, 95.0, 95.0, 165.0, 165.0]);
        assert_eq!(
            signals,
            vec![
                PhaseSignal::Idle,
                PhaseSignal::Starting,
                PhaseSignal::InMotion,
                PhaseSignal::InMotion,
                PhaseSignal::Completed,
            ]
        );
        assert_eq!(d.repetition_count(), 1);
        assert_eq!(d.state(), MotionState::Extended);
        assert_eq!(d.current_angle(), Some(165.0));
    }

    /// 1フレーム1段なので、4フレームでは伸ばし戻し中で止まる
    #[test]
    fn test_four_frame_walkthrough_stops_in_extending() {
        let mut d = squat();
        let signals = feed(&mut d, &[170.0, 95.0, 95.0, 165.0]);
        assert_eq!(
            signals,
            vec![
                PhaseSignal::Idle,
                PhaseSignal::Starting,
                PhaseSignal::InMotion,
                PhaseSignal::InMotion,
            ]
        );
        assert_eq!(d.state(), MotionState::Extending);
        assert_eq!(d.repetition_count(), 0);

        assert_eq!(d.analyze_angle(165.0), PhaseSignal::Completed);
        assert_eq!(d.repetition_count(), 1);
    }

    #[test]
    fn test_bounce_rejected() {
        let mut d = squat();
        let signals = feed(&mut d, &[170.0, 155.0, 170.0]);
        assert!(signals.iter().all(|s| *s == PhaseSignal::Idle));
        assert_eq!(d.state(), MotionState::Extended);
        assert_eq!(d.repetition_count(), 0);
    }

    #[test]
    fn test_shallow_dip_returns_without_count() {
        let mut d = squat();
        feed(&mut d, &[170.0, 105.0, 130.0, 155.0]);
        assert_eq!(d.state(), MotionState::Extended);
        assert_eq!(d.repetition_count(), 0);
    }

    #[test]
    fn test_jitter_near_flexed_threshold_counts_once() {
        let mut d = squat();
        feed(&mut d, &[170.0, 105.0, 99.0, 104.0, 98.0, 111.0, 99.0, 112.0, 140.0, 159.0, 161.0]);
        assert_eq!(d.repetition_count(), 1);
        // 伸展位でのジッタは数えない
        feed(&mut d, &[158.0, 162.0, 158.0, 162.0]);
        assert_eq!(d.repetition_count(), 1);
    }

    #[test]
    fn test_multiple_repetitions_monotonic() {
        let mut d = squat();
        let cycle = [170.0, 105.0, 95.0, 120.0, 165.0];
        let mut prev = 0;
        for _ in 0..5 {
            for a in cycle {
                d.analyze_angle(a);
                assert!(d.repetition_count() >= prev);
                prev = d.repetition_count();
            }
        }
        assert_eq!(d.repetition_count(), 5);
    }

    #[test]
    fn test_missing_frame_is_skipped() {
        let mut d = squat();
        feed(&mut d, &[170.0, 105.0]);
        assert_eq!(d.analyze_frame(None), PhaseSignal::Idle);
        assert_eq!(d.state(), MotionState::Flexing);
        assert_eq!(d.current_angle(), Some(105.0));
    }

    #[test]
    fn test_low_confidence_frame_is_skipped() {
        let mut d = squat();
        let pose = pose_with(Joint::Knee, 90.0, 0.1);
        assert_eq!(d.analyze_frame(Some(&pose)), PhaseSignal::Idle);
        assert_eq!(d.state(), MotionState::Extended);
        assert_eq!(d.current_angle(), None);
    }

    #[test]
    fn test_squat_from_poses() {
        let mut d = squat();
        for angle in [175.0, 130.0, 90.0, 90.0, 140.0, 170.0] {
            d.analyze_frame(Some(&pose_with(Joint::Knee, angle, 0.9)));
        }
        assert_eq!(d.repetition_count(), 1);
        assert!((d.current_angle().unwrap() - 170.0).abs() < 1e-2);
    }

    #[test]
    fn test_pushup_watches_elbows() {
        let mut d = ExerciseDetector::from_config(ExerciseKind::PushUp, &ExerciseConfig::default());
        // 膝だけ動いても腕立ては進まない
        for angle in [175.0, 90.0, 90.0, 175.0] {
            d.analyze_frame(Some(&pose_with(Joint::Knee, angle, 0.9)));
        }
        assert_eq!(d.repetition_count(), 0);
        assert_eq!(d.current_angle(), None);

        for angle in [170.0, 105.0, 95.0, 130.0, 156.0] {
            d.analyze_frame(Some(&pose_with(Joint::Elbow, angle, 0.9)));
        }
        assert_eq!(d.repetition_count(), 1);
    }

    #[test]
    fn test_pushup_extended_threshold() {
        let mut d = ExerciseDetector::from_config(ExerciseKind::PushUp, &ExerciseConfig::default());
        feed(&mut d, &[170.0, 105.0, 95.0, 130.0]);
        assert_eq!(d.analyze_angle(155.0), PhaseSignal::Completed);
    }

    #[test]
    fn test_reset() {
        let mut d = squat();
        feed(&mut d, &[170.0, 105.0, 95.0, 130.0, 165.0, 105.0, 95.0]);
        assert_eq!(d.repetition_count(), 1);
        assert_eq!(d.state(), MotionState::Flexed);

        d.reset();
        assert_eq!(d.repetition_count(), 0);
        assert_eq!(d.state(), MotionState::Extended);
        assert_eq!(d.current_angle(), None);

        d.reset();
        assert_eq!(d.repetition_count(), 0);
        assert_eq!(d.state(), MotionState::Extended);
        assert_eq!(d.current_angle(), None);
    }
}
