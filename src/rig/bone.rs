use serde::Serialize;

use crate::solver::{BodyPart, Viseme};

/// ヒューマノイドリグのボーン（VRM humanoid の名前）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HumanBone {
    Hips,
    Spine,
    Chest,
    Neck,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
}

impl HumanBone {
    pub const ALL: [HumanBone; 10] = [
        HumanBone::Hips,
        HumanBone::Spine,
        HumanBone::Chest,
        HumanBone::Neck,
        HumanBone::LeftUpperArm,
        HumanBone::RightUpperArm,
        HumanBone::LeftLowerArm,
        HumanBone::RightLowerArm,
        HumanBone::LeftHand,
        HumanBone::RightHand,
    ];

    pub fn name(self) -> &'static str {
        match self {
            HumanBone::Hips => "hips",
            HumanBone::Spine => "spine",
            HumanBone::Chest => "chest",
            HumanBone::Neck => "neck",
            HumanBone::LeftUpperArm => "leftUpperArm",
            HumanBone::RightUpperArm => "rightUpperArm",
            HumanBone::LeftLowerArm => "leftLowerArm",
            HumanBone::RightLowerArm => "rightLowerArm",
            HumanBone::LeftHand => "leftHand",
            HumanBone::RightHand => "rightHand",
        }
    }
}

impl From<BodyPart> for HumanBone {
    /// 頭部回転は首ボーンに入れる
    fn from(part: BodyPart) -> Self {
        match part {
            BodyPart::Hips => HumanBone::Hips,
            BodyPart::Spine => HumanBone::Spine,
            BodyPart::Chest => HumanBone::Chest,
            BodyPart::Neck => HumanBone::Neck,
            BodyPart::LeftUpperArm => HumanBone::LeftUpperArm,
            BodyPart::RightUpperArm => HumanBone::RightUpperArm,
            BodyPart::LeftLowerArm => HumanBone::LeftLowerArm,
            BodyPart::RightLowerArm => HumanBone::RightLowerArm,
            BodyPart::LeftHand => HumanBone::LeftHand,
            BodyPart::RightHand => HumanBone::RightHand,
        }
    }
}

/// 口形のプリセット表情（VRM 1.0 の aa / ih / ou / ee / oh）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpressionName {
    Aa,
    Ih,
    Ou,
    Ee,
    Oh,
}

impl ExpressionName {
    pub const ALL: [ExpressionName; 5] = [
        ExpressionName::Aa,
        ExpressionName::Ih,
        ExpressionName::Ou,
        ExpressionName::Ee,
        ExpressionName::Oh,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ExpressionName::Aa => "aa",
            ExpressionName::Ih => "ih",
            ExpressionName::Ou => "ou",
            ExpressionName::Ee => "ee",
            ExpressionName::Oh => "oh",
        }
    }
}

impl From<Viseme> for ExpressionName {
    fn from(viseme: Viseme) -> Self {
        match viseme {
            Viseme::A => ExpressionName::Aa,
            Viseme::I => ExpressionName::Ih,
            Viseme::U => ExpressionName::Ou,
            Viseme::E => ExpressionName::Ee,
            Viseme::O => ExpressionName::Oh,
        }
    }
}
