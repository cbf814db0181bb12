use tracing::trace;

use super::body::{self, BodySolve};
use super::face::{self, ImageSize};
use super::hand;
use super::solved::{BodyPart, Euler, Side, SolvedFrame};
use crate::config::{Config, PartTable};
use crate::pose::{LandmarkSet, Region};

/// 胸・背骨・腕・頭はソルバ座標系と x, z の向きが逆
const FLIP_XZ: [f32; 3] = [-1.0, 1.0, -1.0];

/// 顔・ポーズ・両手をまとめて解き、リグに渡せる部位回転にする
///
/// 符号の補正と部位ごとの減衰までをここで行う。
#[derive(Debug, Clone)]
pub struct HolisticSolver {
    parts: PartTable,
    image: ImageSize,
}

impl HolisticSolver {
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            config.parts,
            ImageSize::new(config.solver.image_width, config.solver.image_height),
        )
    }

    pub fn with_parts(parts: PartTable, image: ImageSize) -> Self {
        Self { parts, image }
    }

    pub fn solve(&self, set: &LandmarkSet) -> SolvedFrame {
        let mut frame = SolvedFrame::default();

        if let Some(face) = set.region(Region::Face).and_then(|lm| face::solve(lm, self.image)) {
            self.put(&mut frame, BodyPart::Neck, face.head.signed(FLIP_XZ));
            frame.mouth = Some(face.mouth);
        }

        // 2D と 3D が揃ったフレームだけポーズを解く
        let body = match (set.region(Region::PoseWorld), set.region(Region::Pose)) {
            (Some(world), Some(image)) => body::solve(world, image),
            _ => None,
        };
        if let Some(body) = &body {
            self.put_body(&mut frame, body);
        }

        // 推定器の left_hand は被写体の右手
        let hands = [(Region::LeftHand, Side::Right), (Region::RightHand, Side::Left)];
        for (region, side) in hands {
            let Some(wrist) = set.region(region).and_then(|lm| hand::solve(lm, side)) else {
                continue;
            };
            let roll = body.as_ref().map_or(0.0, |b| b.arm(side).hand.z);
            self.put(&mut frame, side.hand(), Euler::new(wrist.x, wrist.y, roll));
        }

        frame
    }

    fn put_body(&self, frame: &mut SolvedFrame, body: &BodySolve) {
        self.put(frame, BodyPart::Hips, body.hips);
        let spine = body.spine.signed(FLIP_XZ);
        self.put(frame, BodyPart::Chest, spine);
        self.put(frame, BodyPart::Spine, spine);

        for side in [Side::Left, Side::Right] {
            let arm = body.arm(side);
            self.put(frame, side.upper_arm(), arm.upper.signed(FLIP_XZ));
            self.put(frame, side.lower_arm(), arm.lower.signed(FLIP_XZ));
        }
    }

    /// 減衰を掛けて登録する。NaN / inf を含む部位はこのフレームでは更新しない
    fn put(&self, frame: &mut SolvedFrame, part: BodyPart, rotation: Euler) {
        let rotation = rotation.scale(self.parts.get(part).dampener);
        if rotation.is_finite() {
            frame.pose.set(part, rotation);
        } else {
            trace!("{:?}: non-finite rotation dropped", part);
        }
    }
}
