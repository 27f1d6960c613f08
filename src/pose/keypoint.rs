use nalgebra::Vector2;
use serde::Deserialize;

/// COCO 17 キーポイントインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

/// インデックス順のラベル表
const NAMES: [&str; KeypointIndex::COUNT] = [
    "nose",
    "left_eye",
    "right_eye",
    "left_ear",
    "right_ear",
    "left_shoulder",
    "right_shoulder",
    "left_elbow",
    "right_elbow",
    "left_wrist",
    "right_wrist",
    "left_hip",
    "right_hip",
    "left_knee",
    "right_knee",
    "left_ankle",
    "right_ankle",
];

impl KeypointIndex {
    pub const COUNT: usize = 17;

    pub const ALL: [KeypointIndex; KeypointIndex::COUNT] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// ラベル文字列から引く (例: "left_knee")
    pub fn from_name(name: &str) -> Option<Self> {
        NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| Self::ALL[i])
    }

    /// ラベル文字列
    pub fn name(self) -> &'static str {
        NAMES[self as usize]
    }
}

/// 単一キーポイント
///
/// JSONでは `[x, y, score]` または `{"x":.., "y":.., "score":..}`
/// (`score` は `confidence` とも書ける)
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Keypoint {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 信頼度スコア (0.0〜1.0)
    #[serde(alias = "score")]
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    /// 信頼度が閾値以上か
    pub fn is_valid(&self, threshold: f32) -> bool {
        self.confidence >= threshold
    }

    pub fn position(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }
}

impl Default for Keypoint {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            confidence: 0.0,
        }
    }
}

/// 17キーポイントからなる姿勢 (1フレーム1人分)
///
/// フレーム間の同一性は持たない。欠損キーポイントは信頼度0で表す。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "PoseRecord")]
pub struct Pose {
    pub keypoints: [Keypoint; KeypointIndex::COUNT],
    /// 検出全体の信頼度
    pub score: f32,
}

/// 姿勢ソースが出力するJSONレコード
///
/// - 17個: インデックス順。`null` は欠損、`label` があればインデックスと照合
/// - 17個未満: 全要素に `label` が必要。ラベルの位置に置き、残りは欠損
#[derive(Deserialize)]
struct PoseRecord {
    keypoints: Vec<Option<KeypointRecord>>,
    #[serde(default)]
    score: Option<f32>,
}

#[derive(Deserialize)]
struct KeypointRecord {
    x: f32,
    y: f32,
    #[serde(alias = "score")]
    confidence: f32,
    #[serde(default)]
    label: Option<String>,
}

impl KeypointRecord {
    fn keypoint(&self) -> Keypoint {
        Keypoint::new(self.x, self.y, self.confidence)
    }
}

impl TryFrom<PoseRecord> for Pose {
    type Error = String;

    fn try_from(record: PoseRecord) -> Result<Self, Self::Error> {
        let count = record.keypoints.len();
        let mut keypoints = [Keypoint::default(); KeypointIndex::COUNT];

        if count == KeypointIndex::COUNT {
            for (i, entry) in record.keypoints.iter().enumerate() {
                let Some(entry) = entry else { continue };
                if let Some(label) = &entry.label {
                    if label != NAMES[i] {
                        return Err(format!(
                            "keypoint {} labelled {:?}, expected {:?}",
                            i, label, NAMES[i]
                        ));
                    }
                }
                keypoints[i] = entry.keypoint();
            }
        } else if count < KeypointIndex::COUNT {
            let mut seen = [false; KeypointIndex::COUNT];
            for entry in record.keypoints.iter().flatten() {
                let label = entry.label.as_deref().ok_or_else(|| {
                    format!(
                        "{} keypoints without labels (expected {})",
                        count,
                        KeypointIndex::COUNT
                    )
                })?;
                let index = KeypointIndex::from_name(label)
                    .ok_or_else(|| format!("unknown keypoint label {:?}", label))?;
                if seen[index as usize] {
                    return Err(format!("duplicate keypoint label {:?}", label));
                }
                seen[index as usize] = true;
                keypoints[index as usize] = entry.keypoint();
            }
        } else {
            return Err(format!(
                "{} keypoints (expected at most {})",
                count,
                KeypointIndex::COUNT
            ));
        }

        Ok(match record.score {
            Some(score) => Self::with_score(keypoints, score),
            None => Self::new(keypoints),
        })
    }
}

impl Pose {
    /// scoreはキーポイントの平均信頼度
    pub fn new(keypoints: [Keypoint; KeypointIndex::COUNT]) -> Self {
        let mut pose = Self {
            keypoints,
            score: 0.0,
        };
        pose.score = pose.average_confidence();
        pose
    }

    pub fn with_score(keypoints: [Keypoint; KeypointIndex::COUNT], score: f32) -> Self {
        Self { keypoints, score }
    }

    /// インデックスでキーポイントを取得
    pub fn get(&self, index: KeypointIndex) -> &Keypoint {
        &self.keypoints[index as usize]
    }

    /// 全キーポイントの平均信頼度
    pub fn average_confidence(&self) -> f32 {
        let sum: f32 = self.keypoints.iter().map(|k| k.confidence).sum();
        sum / KeypointIndex::COUNT as f32
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            keypoints: [Keypoint::default(); KeypointIndex::COUNT],
            score: 0.0,
        }
    }
}
