//! 4状態の屈伸ステートマシン
//!
//! EXTENDED → FLEXING → FLEXED → EXTENDING → EXTENDED で1回。
//! ヒステリシス幅により閾値付近のジッタで誤カウントしない。

/// デフォルトのヒステリシス幅（度）
pub const DEFAULT_HYSTERESIS: f32 = 10.0;

/// 内部状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    /// 関節が伸びている（立位 / 腕伸展）
    #[default]
    Extended,
    /// 曲げ始め
    Flexing,
    /// 下限閾値を越えて曲がっている
    Flexed,
    /// 伸ばし戻し中
    Extending,
}

/// フレームごとに外部へ出す動作フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseSignal {
    Idle,
    Starting,
    InMotion,
    Completed,
}

impl PhaseSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            PhaseSignal::Idle => "IDLE",
            PhaseSignal::Starting => "STARTING",
            PhaseSignal::InMotion => "IN_MOTION",
            PhaseSignal::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for PhaseSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 角度閾値（度）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// これ以上で伸展 (U)
    pub extended: f32,
    /// これ以下で屈曲 (D)
    pub flexed: f32,
    /// ヒステリシス幅 (H)
    pub hysteresis: f32,
}

impl Thresholds {
    pub fn new(extended: f32, flexed: f32, hysteresis: f32) -> Self {
        Self {
            extended,
            flexed,
            hysteresis,
        }
    }
}

impl MotionState {
    /// 1フレーム分の遷移。1回の呼び出しで進むのは1段だけ。
    pub fn next(self, angle: f32, t: &Thresholds) -> (MotionState, PhaseSignal) {
        let up = t.extended;
        let down = t.flexed;
        let h = t.hysteresis;

        match self {
            MotionState::Extended => {
                if angle < down + h {
                    (MotionState::Flexing, PhaseSignal::Starting)
                } else {
                    (MotionState::Extended, PhaseSignal::Idle)
                }
            }
            MotionState::Flexing => {
                if angle <= down {
                    (MotionState::Flexed, PhaseSignal::InMotion)
                } else if angle > up - h {
                    // 下まで行かずに戻った
                    (MotionState::Extended, PhaseSignal::Idle)
                } else {
                    (MotionState::Flexing, PhaseSignal::InMotion)
                }
            }
            MotionState::Flexed => {
                if angle > down + h {
                    (MotionState::Extending, PhaseSignal::InMotion)
                } else {
                    (MotionState::Flexed, PhaseSignal::InMotion)
                }
            }
            MotionState::Extending => {
                if angle >= up {
                    (MotionState::Extended, PhaseSignal::Completed)
                } else if angle < down {
                    (MotionState::Flexed, PhaseSignal::InMotion)
                } else {
                    (MotionState::Extending, PhaseSignal::InMotion)
                }
            }
        }
    }
}
