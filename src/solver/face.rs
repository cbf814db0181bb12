use std::f32::consts::PI;

use super::solved::{Euler, MouthShape};
use super::vector::{clamp, finite_or_zero, lerp_vec, plane_roll_pitch_yaw, remap, Vec3};
use crate::pose::{face_index, Landmark, Region};

/// 入力映像サイズ。Face Mesh の正規化座標をピクセル比に戻すのに使う
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageSize {
    pub width: f32,
    pub height: f32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }
}

/// 顔の解析結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceSolve {
    /// 頭部回転（ラジアン）。x: pitch, y: yaw, z: roll
    pub head: Euler,
    pub mouth: MouthShape,
}

/// 顔ランドマークから頭部回転と口形を求める
pub fn solve(landmarks: &[Landmark], image: ImageSize) -> Option<FaceSolve> {
    if !Region::Face.accepts(landmarks.len()) {
        return None;
    }
    // z も横幅基準でスケールする（Face Mesh の z は x と同じ単位）
    let points: Vec<Vec3> = landmarks
        .iter()
        .map(|lm| Vec3::new(lm.x * image.width, lm.y * image.height, lm.z * image.width))
        .collect();

    Some(FaceSolve {
        head: head_rotation(&points),
        mouth: mouth_shape(&points),
    })
}

fn head_rotation(points: &[Vec3]) -> Euler {
    use face_index::*;
    let top_left = &points[HEAD_TOP_LEFT];
    let top_right = &points[HEAD_TOP_RIGHT];
    let jaw_mid = lerp_vec(&points[JAW_RIGHT], &points[JAW_LEFT], 0.5);

    let rotate = plane_roll_pitch_yaw(top_left, top_right, &jaw_mid);
    Euler::new(-rotate.x * PI, rotate.y * PI, -rotate.z * PI)
}

fn mouth_shape(points: &[Vec3]) -> MouthShape {
    use face_index::*;
    let eye_inner_distance = (points[EYE_INNER_LEFT] - points[EYE_INNER_RIGHT]).norm();
    let eye_outer_distance = (points[EYE_OUTER_LEFT] - points[EYE_OUTER_RIGHT]).norm();

    let mouth_open = (points[UPPER_INNER_LIP] - points[LOWER_INNER_LIP]).norm();
    let mouth_width = (points[MOUTH_CORNER_LEFT] - points[MOUTH_CORNER_RIGHT]).norm();

    // 口の幅は目尻間、開きは目頭間の距離で正規化
    let ratio_x = remap(mouth_width / eye_outer_distance, 0.45, 0.9);
    let mouth_x = (ratio_x - 0.3) * 2.0;
    let mouth_y = remap(mouth_open / eye_inner_distance, 0.17, 0.5);

    let ratio_i = clamp(remap(mouth_x, 0.0, 1.0) * 2.0 * remap(mouth_y, 0.2, 0.7), 0.0, 1.0);
    let ratio_a = mouth_y * 0.4 + mouth_y * (1.0 - ratio_i) * 0.6;
    let ratio_u = mouth_y * remap(1.0 - ratio_i, 0.0, 0.3) * 0.1;
    let ratio_e = remap(ratio_u, 0.2, 1.0) * (1.0 - ratio_i) * 0.3;
    let ratio_o = (1.0 - ratio_i) * remap(mouth_y, 0.3, 1.0) * 0.4;

    MouthShape {
        a: finite_or_zero(ratio_a),
        i: finite_or_zero(ratio_i),
        u: finite_or_zero(ratio_u),
        e: finite_or_zero(ratio_e),
        o: finite_or_zero(ratio_o),
    }
}
