use super::detector::{ExerciseDetector, ExerciseKind};
use super::phase::{MotionState, PhaseSignal};
use crate::config::ExerciseConfig;
use crate::pose::Pose;

/// 選択中の種目とそのカウンタを保持する
///
/// 同時に有効なカウンタは1つだけ。種目を切り替えると前の状態は破棄される。
pub struct ExerciseSession {
    config: ExerciseConfig,
    detector: Option<ExerciseDetector>,
}

impl ExerciseSession {
    pub fn new(config: ExerciseConfig) -> Self {
        Self {
            config,
            detector: None,
        }
    }

    pub fn with_exercise(config: ExerciseConfig, kind: Option<ExerciseKind>) -> Self {
        let mut session = Self::new(config);
        session.set_exercise(kind);
        session
    }

    /// 種目を設定（同じ種目でも作り直す）。Noneで破棄。
    pub fn set_exercise(&mut self, kind: Option<ExerciseKind>) {
        self.detector = kind.map(|k| ExerciseDetector::from_config(k, &self.config));
    }

    pub fn exercise(&self) -> Option<ExerciseKind> {
        self.detector.as_ref().map(|d| d.kind())
    }

    pub fn detector(&self) -> Option<&ExerciseDetector> {
        self.detector.as_ref()
    }

    pub fn analyze_frame(&mut self, pose: Option<&Pose>) -> PhaseSignal {
        match self.detector.as_mut() {
            Some(detector) => detector.analyze_frame(pose),
            None => PhaseSignal::Idle,
        }
    }

    pub fn repetition_count(&self) -> u32 {
        self.detector.as_ref().map_or(0, |d| d.repetition_count())
    }

    pub fn current_angle(&self) -> Option<f32> {
        self.detector.as_ref().and_then(|d| d.current_angle())
    }

    pub fn state(&self) -> Option<MotionState> {
        self.detector.as_ref().map(|d| d.state())
    }

    pub fn reset(&mut self) {
        if let Some(detector) = self.detector.as_mut() {
            detector.reset();
        }
    }
}
