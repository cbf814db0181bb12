use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::solver::BodyPart;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub parts: PartTable,
    #[serde(default)]
    pub expression: ExpressionConfig,
    #[serde(default)]
    pub talk: TalkConfig,
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolverConfig {
    /// 入力映像の横幅（ピクセル）。顔ランドマークをピクセル空間に戻すのに使う
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    /// 入力映像の縦幅（ピクセル）
    #[serde(default = "default_image_height")]
    pub image_height: u32,
}

fn default_image_width() -> u32 { 640 }
fn default_image_height() -> u32 { 480 }

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            image_width: default_image_width(),
            image_height: default_image_height(),
        }
    }
}

/// 部位ごとの減衰係数とslerp係数
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PartTuning {
    /// 生の回転角に掛ける倍率 (0.0〜1.0)
    pub dampener: f32,
    /// 1フレームで目標へ寄せる割合 (0.0〜1.0)
    #[serde(default = "default_part_lerp")]
    pub lerp: f32,
}

fn default_part_lerp() -> f32 { 0.3 }

impl PartTuning {
    pub const fn new(dampener: f32, lerp: f32) -> Self {
        Self { dampener, lerp }
    }

    fn sanitized(self) -> Self {
        Self {
            dampener: clamp_unit(self.dampener),
            lerp: clamp_unit(self.lerp),
        }
    }
}

/// 部位 → (dampener, lerp) のテーブル
///
/// 左右の腕・手は同じ設定を共有する。
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct PartTable {
    #[serde(default = "default_hips")]
    pub hips: PartTuning,
    #[serde(default = "default_chest")]
    pub chest: PartTuning,
    #[serde(default = "default_spine")]
    pub spine: PartTuning,
    #[serde(default = "default_neck")]
    pub neck: PartTuning,
    #[serde(default = "default_limb")]
    pub upper_arm: PartTuning,
    #[serde(default = "default_limb")]
    pub lower_arm: PartTuning,
    #[serde(default = "default_limb")]
    pub hand: PartTuning,
}

fn default_hips() -> PartTuning { PartTuning::new(0.7, 0.3) }
fn default_chest() -> PartTuning { PartTuning::new(0.25, 0.3) }
fn default_spine() -> PartTuning { PartTuning::new(0.45, 0.3) }
fn default_neck() -> PartTuning { PartTuning::new(0.7, 0.3) }
fn default_limb() -> PartTuning { PartTuning::new(1.0, 0.3) }

impl Default for PartTable {
    fn default() -> Self {
        Self {
            hips: default_hips(),
            chest: default_chest(),
            spine: default_spine(),
            neck: default_neck(),
            upper_arm: default_limb(),
            lower_arm: default_limb(),
            hand: default_limb(),
        }
    }
}

impl PartTable {
    pub fn get(&self, part: BodyPart) -> PartTuning {
        use BodyPart::*;
        match part {
            Hips => self.hips,
            Spine => self.spine,
            Chest => self.chest,
            Neck => self.neck,
            LeftUpperArm | RightUpperArm => self.upper_arm,
            LeftLowerArm | RightLowerArm => self.lower_arm,
            LeftHand | RightHand => self.hand,
        }
    }

    /// 全係数を [0, 1] に収める（NaN は 0）
    pub(crate) fn sanitized(self) -> Self {
        Self {
            hips: self.hips.sanitized(),
            chest: self.chest.sanitized(),
            spine: self.spine.sanitized(),
            neck: self.neck.sanitized(),
            upper_arm: self.upper_arm.sanitized(),
            lower_arm: self.lower_arm.sanitized(),
            hand: self.hand.sanitized(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ExpressionConfig {
    /// ビセーム重みの線形補間係数
    #[serde(default = "default_expression_lerp")]
    pub lerp: f32,
}

fn default_expression_lerp() -> f32 { 0.5 }

impl Default for ExpressionConfig {
    fn default() -> Self {
        Self { lerp: default_expression_lerp() }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct TalkConfig {
    /// idle → talking のクロスフェード時間（秒）
    #[serde(default = "default_blend_in")]
    pub blend_in_secs: f32,
    /// talking → idle のクロスフェード時間（秒）
    #[serde(default = "default_blend_out")]
    pub blend_out_secs: f32,
    /// 発話終了からidleクリップを先頭に戻すまでの遅延（秒）
    #[serde(default = "default_idle_reset_delay")]
    pub idle_reset_delay_secs: f32,
}

fn default_blend_in() -> f32 { 0.6 }
fn default_blend_out() -> f32 { 1.0 }
fn default_idle_reset_delay() -> f32 { 0.8 }

impl Default for TalkConfig {
    fn default() -> Self {
        Self {
            blend_in_secs: default_blend_in(),
            blend_out_secs: default_blend_out(),
            idle_reset_delay_secs: default_idle_reset_delay(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct ReplayConfig {
    /// 記録ファイルを配信する速度（ランドマークの推論レート相当）
    #[serde(default = "default_source_fps")]
    pub source_fps: u32,
    /// フレームドライバの描画レート
    #[serde(default = "default_render_fps")]
    pub render_fps: u32,
    /// 末尾まで再生したら先頭に戻る
    #[serde(default)]
    pub loop_recording: bool,
}

fn default_source_fps() -> u32 { 30 }
fn default_render_fps() -> u32 { 60 }

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            source_fps: default_source_fps(),
            render_fps: default_render_fps(),
            loop_recording: false,
        }
    }
}

pub(crate) fn clamp_unit(v: f32) -> f32 {
    if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.parts = config.parts.sanitized();
        config.expression.lerp = clamp_unit(config.expression.lerp);
        Ok(config)
    }

    /// 読み込みに失敗したらデフォルト設定で続行する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{:#}; using default config", e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_part_table() {
        let table = PartTable::default();
        assert_eq!(table.get(BodyPart::Chest), PartTuning::new(0.25, 0.3));
        assert_eq!(table.get(BodyPart::Spine), PartTuning::new(0.45, 0.3));
        assert_eq!(table.get(BodyPart::Neck), PartTuning::new(0.7, 0.3));
        assert_eq!(table.get(BodyPart::LeftUpperArm), PartTuning::new(1.0, 0.3));
        assert_eq!(table.get(BodyPart::RightHand), PartTuning::new(1.0, 0.3));
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.solver.image_width, 640);
        assert_eq!(config.solver.image_height, 480);
        assert_eq!(config.parts, PartTable::default());
        assert_eq!(config.expression.lerp, 0.5);
        assert_eq!(config.talk.blend_in_secs, 0.6);
        assert_eq!(config.replay.source_fps, 30);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml(
            r#"
            [parts.spine]
            dampener = 0.3

            [parts.hand]
            dampener = 0.8
            lerp = 0.6
            "#,
        )
        .unwrap();
        assert_eq!(config.parts.spine, PartTuning::new(0.3, 0.3));
        assert_eq!(config.parts.hand, PartTuning::new(0.8, 0.6));
        assert_eq!(config.parts.chest, PartTuning::new(0.25, 0.3));
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let config = Config::from_toml(
            r#"
            [parts.chest]
            dampener = 2.5
            lerp = -1.0

            [expression]
            lerp = 3.0
            "#,
        )
        .unwrap();
        assert_eq!(config.parts.chest, PartTuning::new(1.0, 0.0));
        assert_eq!(config.expression.lerp, 1.0);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        assert!(Config::from_toml("[solver\nimage_width = ").is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/puppet-tracker.toml");
        assert_eq!(config.parts, PartTable::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[solver]\nimage_width = 1280\nimage_height = 720\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.solver.image_width, 1280);
        assert_eq!(config.solver.image_height, 720);
    }
}
