use super::solved::{Euler, Side};
use super::vector::{clamp, plane_roll_pitch_yaw};
use crate::pose::{hand_index, Landmark};

/// 手首の回転（ラジアン）
///
/// `side` は被写体から見た左右。手のひらの平面（手首・人差し指付け根・小指付け根）から求める。
pub fn solve(landmarks: &[Landmark], side: Side) -> Option<Euler> {
    if landmarks.len() != hand_index::COUNT {
        return None;
    }
    let wrist = landmarks[hand_index::WRIST].to_vector();
    let index = landmarks[hand_index::INDEX_MCP].to_vector();
    let pinky = landmarks[hand_index::PINKY_MCP].to_vector();

    // 法線が手の甲側を向くよう左右で巻き順を変える
    let rotate = match side {
        Side::Right => plane_roll_pitch_yaw(&wrist, &pinky, &index),
        Side::Left => plane_roll_pitch_yaw(&wrist, &index, &pinky),
    };

    let invert = side.invert();
    let (y_min, y_max) = match side {
        Side::Right => (-1.2, 0.6),
        Side::Left => (-0.6, 1.6),
    };
    let y = rotate.z - 0.4;

    Some(Euler::new(
        clamp(rotate.x * 2.0 * invert, -0.3, 0.3),
        clamp(y * 2.3, y_min, y_max),
        rotate.z * -2.3 * invert,
    ))
}
