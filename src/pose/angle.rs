use nalgebra::Vector2;

use super::keypoint::{KeypointIndex, Pose};

/// 関節角度を採用する最低信頼度
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.3;

/// 3点がなす角度 (度)
///
/// `middle` を頂点として `first - middle` と `last - middle` の角度を返す。
/// 結果は 0〜180。どちらかのベクトル長が0なら0を返す。
pub fn angle_between(first: Vector2<f32>, middle: Vector2<f32>, last: Vector2<f32>) -> f32 {
    let a = first - middle;
    let b = last - middle;

    let mag_a = a.norm();
    let mag_b = b.norm();
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    let cos = a.dot(&b) / (mag_a * mag_b);
    // NaN座標はclampを素通りする
    if !cos.is_finite() {
        return 0.0;
    }

    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// 計測対象の関節
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Joint {
    /// 腰-膝-足首
    Knee,
    /// 肩-肘-手首
    Elbow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Joint {
    /// (近位, 頂点, 遠位) のキーポイント
    pub fn landmarks(self, side: Side) -> [KeypointIndex; 3] {
        use KeypointIndex::*;
        match (self, side) {
            (Joint::Knee, Side::Left) => [LeftHip, LeftKnee, LeftAnkle],
            (Joint::Knee, Side::Right) => [RightHip, RightKnee, RightAnkle],
            (Joint::Elbow, Side::Left) => [LeftShoulder, LeftElbow, LeftWrist],
            (Joint::Elbow, Side::Right) => [RightShoulder, RightElbow, RightWrist],
        }
    }
}

/// 信頼度ゲート付きの関節角度計算
#[derive(Debug, Clone, Copy)]
pub struct AngleCalculator {
    confidence_threshold: f32,
}

impl AngleCalculator {
    pub fn new(confidence_threshold: f32) -> Self {
        Self { confidence_threshold }
    }

    pub fn confidence_threshold(&self) -> f32 {
        self.confidence_threshold
    }

    /// 片側の関節角度
    ///
    /// 3点のいずれかが閾値未満ならNone（重み付けではなく欠損扱い）。
    /// 近位点か遠位点が頂点と同じ位置（長さ0の肢）でもNone。
    pub fn joint_angle(&self, pose: &Pose, joint: Joint, side: Side) -> Option<f32> {
        let [proximal, vertex, distal] = joint.landmarks(side);
        let proximal = pose.get(proximal);
        let vertex = pose.get(vertex);
        let distal = pose.get(distal);

        if !proximal.is_valid(self.confidence_threshold)
            || !vertex.is_valid(self.confidence_threshold)
            || !distal.is_valid(self.confidence_threshold)
        {
            return None;
        }
        if proximal.position() == vertex.position() || distal.position() == vertex.position() {
            return None;
        }

        Some(angle_between(
            proximal.position(),
            vertex.position(),
            distal.position(),
        ))
    }

    /// 左右平均の関節角度
    ///
    /// 両側あれば平均、片側のみならその値、どちらもなければNone。
    pub fn bilateral_angle(&self, pose: &Pose, joint: Joint) -> Option<f32> {
        let left = self.joint_angle(pose, joint, Side::Left);
        let right = self.joint_angle(pose, joint, Side::Right);
        match (left, right) {
            (Some(l), Some(r)) => Some((l + r) / 2.0),
            (Some(angle), None) | (None, Some(angle)) => Some(angle),
            (None, None) => None,
        }
    }

    pub fn average_knee_angle(&self, pose: &Pose) -> Option<f32> {
        self.bilateral_angle(pose, Joint::Knee)
    }

    pub fn average_elbow_angle(&self, pose: &Pose) -> Option<f32> {
        self.bilateral_angle(pose, Joint::Elbow)
    }
}

impl Default for AngleCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIDENCE_THRESHOLD)
    }
}
