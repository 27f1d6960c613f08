use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::exercise::DEFAULT_HYSTERESIS;
use crate::pose::DEFAULT_CONFIDENCE_THRESHOLD;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub exercise: ExerciseConfig,
    #[serde(default)]
    pub app: AppConfig,
}

/// 角度閾値（度）
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    /// これ以上で伸展
    pub extended: f32,
    /// これ以下で屈曲
    pub flexed: f32,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ExerciseConfig {
    /// キーポイント信頼度の閾値（未満は欠損扱い）
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,
    /// ヒステリシス幅（度）
    #[serde(default = "default_hysteresis")]
    pub hysteresis: f32,
    /// スクワット（膝角度）
    #[serde(default = "default_squat")]
    pub squat: ThresholdConfig,
    /// 腕立て伏せ（肘角度）
    #[serde(default = "default_pushup")]
    pub pushup: ThresholdConfig,
}

fn default_confidence_threshold() -> f32 { DEFAULT_CONFIDENCE_THRESHOLD }
fn default_hysteresis() -> f32 { DEFAULT_HYSTERESIS }
fn default_squat() -> ThresholdConfig { ThresholdConfig { extended: 160.0, flexed: 100.0 } }
fn default_pushup() -> ThresholdConfig { ThresholdConfig { extended: 155.0, flexed: 100.0 } }

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            hysteresis: default_hysteresis(),
            squat: default_squat(),
            pushup: default_pushup(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// 起動時の種目 ("squat" | "pushup" | "none")
    #[serde(default = "default_exercise")]
    pub exercise: String,
    /// フレームごとの結果を表示
    #[serde(default)]
    pub verbose: bool,
}

fn default_exercise() -> String { "squat".to_string() }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            exercise: default_exercise(),
            verbose: false,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("failed to parse config")?;
        Ok(config)
    }

    /// 読めなければデフォルト
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Config: {:#} (using defaults)", e);
                Self::default()
            }
        }
    }
}
