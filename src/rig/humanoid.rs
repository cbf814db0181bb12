use nalgebra::UnitQuaternion;
use std::collections::HashMap;
use tracing::debug;

use super::bone::{ExpressionName, HumanBone};

/// リグ上の 1 ボーンの状態（親に対するローカル回転）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneNode {
    pub rotation: UnitQuaternion<f32>,
}

impl Default for BoneNode {
    fn default() -> Self {
        Self {
            rotation: UnitQuaternion::identity(),
        }
    }
}

/// 表情 1 つ分の重み
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExpressionSlot {
    /// 目標の重み (0.0〜1.0)
    pub weight: f32,
    /// 0/1 でしか表示できない表情（しきい値 0.5）
    pub is_binary: bool,
    /// 直近の `update_expressions` で反映された値
    pub applied: f32,
}

impl ExpressionSlot {
    pub fn new(is_binary: bool) -> Self {
        Self {
            is_binary,
            ..Default::default()
        }
    }

    fn resolve(&mut self) {
        self.applied = if self.is_binary {
            if self.weight > 0.5 { 1.0 } else { 0.0 }
        } else {
            self.weight
        };
    }
}

/// アバターのボーン・表情へのアクセス
///
/// モデルに存在しないボーンや表情は None を返し、呼び出し側は黙って読み飛ばす。
pub trait Rig {
    fn resolve_bone(&mut self, bone: HumanBone) -> Option<&mut BoneNode>;
    fn resolve_expression(&mut self, name: ExpressionName) -> Option<&mut ExpressionSlot>;
    /// 表情の重みをメッシュへ反映する。1フレームに1回呼ぶ
    fn update_expressions(&mut self);
}

/// メモリ上のヒューマノイドリグ
#[derive(Debug, Clone, Default)]
pub struct HumanoidRig {
    bones: HashMap<HumanBone, BoneNode>,
    expressions: HashMap<ExpressionName, ExpressionSlot>,
    expression_updates: u64,
}

impl HumanoidRig {
    pub fn new<B, E>(bones: B, expressions: E) -> Self
    where
        B: IntoIterator<Item = HumanBone>,
        E: IntoIterator<Item = ExpressionName>,
    {
        let bones: HashMap<_, _> = bones.into_iter().map(|b| (b, BoneNode::default())).collect();
        let expressions: HashMap<_, _> = expressions
            .into_iter()
            .map(|e| (e, ExpressionSlot::new(false)))
            .collect();
        debug!("Rig with {} bone(s), {} expression(s)", bones.len(), expressions.len());
        Self {
            bones,
            expressions,
            expression_updates: 0,
        }
    }

    /// 全ボーン・全口形を持つリグ
    pub fn full() -> Self {
        Self::new(HumanBone::ALL, ExpressionName::ALL)
    }

    pub fn set_binary(&mut self, name: ExpressionName, is_binary: bool) {
        if let Some(slot) = self.expressions.get_mut(&name) {
            slot.is_binary = is_binary;
        }
    }

    pub fn bone_rotation(&self, bone: HumanBone) -> Option<UnitQuaternion<f32>> {
        self.bones.get(&bone).map(|b| b.rotation)
    }

    pub fn expression(&self, name: ExpressionName) -> Option<&ExpressionSlot> {
        self.expressions.get(&name)
    }

    pub fn expression_weight(&self, name: ExpressionName) -> Option<f32> {
        self.expressions.get(&name).map(|s| s.weight)
    }

    /// `update_expressions` が呼ばれた回数
    pub fn expression_updates(&self) -> u64 {
        self.expression_updates
    }
}

impl Rig for HumanoidRig {
    fn resolve_bone(&mut self, bone: HumanBone) -> Option<&mut BoneNode> {
        self.bones.get_mut(&bone)
    }

    fn resolve_expression(&mut self, name: ExpressionName) -> Option<&mut ExpressionSlot> {
        self.expressions.get_mut(&name)
    }

    fn update_expressions(&mut self) {
        for slot in self.expressions.values_mut() {
            slot.resolve();
        }
        self.expression_updates += 1;
    }
}
