//! 幾何ヘルパ
//!
//! 角度はすべて「ラジアン / π」に正規化して返す（-1.0〜1.0 付近）。
//! 呼び出し側で π を掛けてラジアンに戻す。

use nalgebra::Vector3;
use std::f32::consts::{PI, TAU};

pub type Vec3 = Vector3<f32>;

pub fn clamp(v: f32, min: f32, max: f32) -> f32 {
    v.max(min).min(max)
}

/// [min, max] を [0, 1] に写す
pub fn remap(v: f32, min: f32, max: f32) -> f32 {
    (clamp(v, min, max) - min) / (max - min)
}

/// 点 c から点 e への 2D 方向角
pub fn find_2d_angle(cx: f32, cy: f32, ex: f32, ey: f32) -> f32 {
    f32::atan2(ey - cy, ex - cx)
}

/// 関節角向けの正規化。±π/2 を越えた角を折り返す
pub fn normalize_radians(radians: f32) -> f32 {
    let mut r = radians;
    if r >= PI / 2.0 {
        r -= TAU;
    }
    if r <= -PI / 2.0 {
        r += TAU;
        r = PI - r;
    }
    r / PI
}

/// (-π, π] に畳んでから π で割る
pub fn normalize_angle(radians: f32) -> f32 {
    let a = radians % TAU;
    let a = if a > PI {
        a - TAU
    } else if a < -PI {
        TAU + a
    } else {
        a
    };
    a / PI
}

/// a → b の向きを 3 平面それぞれの角で表す（関節用）
pub fn find_rotation(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(
        normalize_radians(find_2d_angle(a.z, a.x, b.z, b.x)),
        normalize_radians(find_2d_angle(a.z, a.y, b.z, b.y)),
        normalize_radians(find_2d_angle(a.x, a.y, b.x, b.y)),
    )
}

/// 2 点を結ぶ線分の roll / pitch / yaw
pub fn roll_pitch_yaw(a: &Vec3, b: &Vec3) -> Vec3 {
    Vec3::new(
        normalize_angle(find_2d_angle(a.z, a.y, b.z, b.y)),
        normalize_angle(find_2d_angle(a.z, a.x, b.z, b.x)),
        normalize_angle(find_2d_angle(a.x, a.y, b.x, b.y)),
    )
}

/// 3 点が張る平面の roll / pitch / yaw
///
/// 平面が縮退している場合（3 点が一直線）は該当成分が 0 になる。
pub fn plane_roll_pitch_yaw(a: &Vec3, b: &Vec3, c: &Vec3) -> Vec3 {
    let qb = b - a;
    let qc = c - a;
    let n = qb.cross(&qc);

    let unit_z = n.normalize();
    let unit_x = qb.normalize();
    let unit_y = unit_z.cross(&unit_x);

    let beta = finite_or_zero(unit_z.x.asin());
    let alpha = finite_or_zero(f32::atan2(-unit_z.y, unit_z.z));
    let gamma = finite_or_zero(f32::atan2(-unit_y.x, unit_x.x));

    Vec3::new(
        normalize_angle(alpha),
        normalize_angle(beta),
        normalize_angle(gamma),
    )
}

/// b を頂点とする角 a-b-c
///
/// a か c が b と重なっていると NaN を返す（呼び出し側でその部位を捨てる）。
pub fn angle_between(a: &Vec3, b: &Vec3, c: &Vec3) -> f32 {
    let v1 = (a - b).normalize();
    let v2 = (c - b).normalize();
    // 丸め誤差で |dot| > 1 になると acos が NaN になる
    normalize_radians(v1.dot(&v2).clamp(-1.0, 1.0).acos())
}

pub fn lerp_vec(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

pub fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}
