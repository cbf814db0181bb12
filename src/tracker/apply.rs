use tracing::trace;

use super::rotation::{euler_to_quaternion, slerp};
use crate::config::{clamp_unit, Config, PartTable};
use crate::rig::{ExpressionName, HumanBone, Rig};
use crate::solver::{MouthShape, SolvedFrame, SolvedPose};

/// 1回の適用で何が起きたか
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyStats {
    pub bones_updated: usize,
    /// リグに存在しなかったボーン
    pub bones_missing: usize,
    pub expressions_updated: usize,
}

/// SolvedFrame をリグに反映する
///
/// 回転は現在の向きから目標へ部位ごとの係数で slerp、口形は線形補間して [0, 1] にクランプする。
/// 今フレームに値のない部位には触らない（前の姿勢を保持）。
#[derive(Debug, Clone)]
pub struct PoseApplicator {
    parts: PartTable,
    expression_lerp: f32,
}

impl PoseApplicator {
    pub fn new(config: &Config) -> Self {
        Self::with_tuning(config.parts, config.expression.lerp)
    }

    pub fn with_tuning(parts: PartTable, expression_lerp: f32) -> Self {
        Self {
            parts: parts.sanitized(),
            expression_lerp: clamp_unit(expression_lerp),
        }
    }

    pub fn apply<R: Rig + ?Sized>(&self, frame: &SolvedFrame, rig: &mut R) -> ApplyStats {
        let mut stats = self.apply_pose(&frame.pose, rig);
        if let Some(mouth) = &frame.mouth {
            stats.expressions_updated = self.apply_mouth(mouth, rig);
        }
        stats
    }

    pub fn apply_pose<R: Rig + ?Sized>(&self, pose: &SolvedPose, rig: &mut R) -> ApplyStats {
        let mut stats = ApplyStats::default();
        for (part, euler) in pose.iter() {
            if !euler.is_finite() {
                continue;
            }
            let bone = HumanBone::from(part);
            let Some(node) = rig.resolve_bone(bone) else {
                trace!("{:?}: bone not present in rig", bone);
                stats.bones_missing += 1;
                continue;
            };
            let target = euler_to_quaternion(euler);
            node.rotation = slerp(&node.rotation, &target, self.parts.get(part).lerp);
            stats.bones_updated += 1;
        }
        stats
    }

    /// 口形の重みを更新し、最後に一度だけ `update_expressions` を呼ぶ
    pub fn apply_mouth<R: Rig + ?Sized>(&self, mouth: &MouthShape, rig: &mut R) -> usize {
        let mut updated = 0;
        for (viseme, target) in mouth.iter() {
            if !target.is_finite() {
                continue;
            }
            let Some(slot) = rig.resolve_expression(ExpressionName::from(viseme)) else {
                continue;
            };
            let current = if slot.weight.is_finite() { slot.weight } else { 0.0 };
            slot.weight = lerp(current, target, self.expression_lerp).clamp(0.0, 1.0);
            updated += 1;
        }
        rig.update_expressions();
        updated
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
