use std::f32::consts::PI;

use super::solved::{Euler, Side};
use super::vector::{angle_between, clamp, find_rotation, lerp_vec, remap, roll_pitch_yaw, Vec3};
use crate::pose::{pose_index, Landmark, Region};

/// 腕を下ろした状態の上腕 z（左右で符号が逆）
const RESTING_UPPER_ARM_Z: f32 = 1.25;
/// 手首がこれより下（腰基準、メートル）なら画面外扱い
const OFFSCREEN_WRIST_Y: f32 = 0.1;
const OFFSCREEN_VISIBILITY: f32 = 0.23;
const OFFSCREEN_IMAGE_Y: f32 = 0.995;

/// 片腕の回転（ラジアン、ソルバ座標系）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ArmSolve {
    pub upper: Euler,
    pub lower: Euler,
    pub hand: Euler,
}

impl ArmSolve {
    fn resting(side: Side) -> Self {
        Self {
            upper: Euler::new(0.0, 0.0, -RESTING_UPPER_ARM_Z * side.invert()),
            lower: Euler::ZERO,
            hand: Euler::ZERO,
        }
    }
}

/// 胴体・腕の解析結果
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodySolve {
    pub hips: Euler,
    pub spine: Euler,
    pub left_arm: ArmSolve,
    pub right_arm: ArmSolve,
}

impl BodySolve {
    pub fn arm(&self, side: Side) -> &ArmSolve {
        match side {
            Side::Left => &self.left_arm,
            Side::Right => &self.right_arm,
        }
    }
}

/// 3D（ワールド）と 2D（画像）のポーズから胴体と腕の回転を求める
///
/// 2D は画面外判定にだけ使う。どちらかが欠けていれば None。
pub fn solve(world: &[Landmark], image: &[Landmark]) -> Option<BodySolve> {
    if !Region::PoseWorld.accepts(world.len()) || !Region::Pose.accepts(image.len()) {
        return None;
    }
    let points: Vec<Vec3> = world.iter().map(Landmark::to_vector).collect();

    let (hips, spine) = torso(&points);

    // 鏡像映像: 推定器の左側の関節列がアバターの右腕になる
    let mut right_arm = arm(&points, Side::Right);
    let mut left_arm = arm(&points, Side::Left);

    if wrist_offscreen(world, image, pose_index::LEFT_WRIST) {
        right_arm = ArmSolve::resting(Side::Right);
    }
    if wrist_offscreen(world, image, pose_index::RIGHT_WRIST) {
        left_arm = ArmSolve::resting(Side::Left);
    }

    Some(BodySolve {
        hips,
        spine,
        left_arm,
        right_arm,
    })
}

/// 腰と背骨の向き（ラジアン）
fn torso(points: &[Vec3]) -> (Euler, Euler) {
    use pose_index::*;
    let hips = fold_torso(roll_pitch_yaw(&points[LEFT_HIP], &points[RIGHT_HIP]));
    let spine = fold_torso(roll_pitch_yaw(&points[LEFT_SHOULDER], &points[RIGHT_SHOULDER]));
    (hips.scale(PI), spine.scale(PI))
}

/// 左右の点を結ぶ線の向きを胴体の回転に直す（正規化角のまま）
fn fold_torso(r: Vec3) -> Euler {
    let mut y = r.y;
    if y > 0.5 {
        y -= 2.0;
    }
    y += 0.5;

    let mut z = r.z;
    if z > 0.0 {
        z = 1.0 - z;
    } else if z < 0.0 {
        z = -1.0 - z;
    }
    // 横を向くほど傾きの推定が不安定になるので弱める
    let turn_around = remap(y.abs(), 0.2, 0.4);
    z *= 1.0 - turn_around;

    Euler::new(0.0, y, z)
}

/// アバターの side 側の腕。関節番号は鏡像なので逆側を使う
fn arm(points: &[Vec3], side: Side) -> ArmSolve {
    use pose_index::*;
    let (shoulder, other_shoulder, elbow, wrist, pinky, index) = match side {
        Side::Right => (LEFT_SHOULDER, RIGHT_SHOULDER, LEFT_ELBOW, LEFT_WRIST, LEFT_PINKY, LEFT_INDEX),
        Side::Left => (RIGHT_SHOULDER, LEFT_SHOULDER, RIGHT_ELBOW, RIGHT_WRIST, RIGHT_PINKY, RIGHT_INDEX),
    };

    let mut upper = find_rotation(&points[shoulder], &points[elbow]);
    upper.y = angle_between(&points[other_shoulder], &points[shoulder], &points[elbow]);

    let mut lower = find_rotation(&points[elbow], &points[wrist]);
    lower.y = angle_between(&points[shoulder], &points[elbow], &points[wrist]);
    lower.z = clamp(lower.z, -2.14, 0.0);

    let knuckles = lerp_vec(&points[pinky], &points[index], 0.5);
    let hand = find_rotation(&points[wrist], &knuckles);

    rig_arm(
        Euler::new(upper.x, upper.y, upper.z),
        Euler::new(lower.x, lower.y, lower.z),
        Euler::new(hand.x, hand.y, hand.z),
        side,
    )
}

/// 正規化角を関節の可動域に合わせたラジアンに直す
fn rig_arm(mut upper: Euler, mut lower: Euler, mut hand: Euler, side: Side) -> ArmSolve {
    let invert = side.invert();

    upper.z *= -2.3 * invert;
    upper.y *= PI * invert;
    upper.y -= lower.x;
    upper.y -= -invert * lower.z.max(0.0);
    upper.x -= 0.3 * invert;

    lower.z *= -2.14 * invert;
    lower.y *= 2.14 * invert;
    lower.x *= 2.14 * invert;

    upper.x = clamp(upper.x, -0.5, PI);
    lower.x = clamp(lower.x, -0.3, 0.3);

    hand.y = clamp(hand.z * 2.0, -0.6, 0.6);
    hand.z *= -2.3 * invert;

    ArmSolve { upper, lower, hand }
}

/// 手首が画面外（または腰より下）に出ているか
fn wrist_offscreen(world: &[Landmark], image: &[Landmark], wrist: usize) -> bool {
    let w = &world[wrist];
    // visibility を出さない推定器では見えているものとして扱う
    let visibility = w.visibility.or(image[wrist].visibility).unwrap_or(1.0);
    w.y > OFFSCREEN_WRIST_Y || visibility < OFFSCREEN_VISIBILITY || image[wrist].y > OFFSCREEN_IMAGE_Y
}
