use nalgebra::{Quaternion, UnitQuaternion, Vector3};

use crate::solver::Euler;

/// slerp が不安定になる角度差（sin 値）のしきい値
const SLERP_EPSILON: f32 = 1e-6;

/// X → Y → Z の内因性回転（three.js の Euler 'XYZ' と同じ）
pub fn euler_to_quaternion(e: Euler) -> UnitQuaternion<f32> {
    let qx = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), e.x);
    let qy = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), e.y);
    let qz = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), e.z);
    qx * qy * qz
}

/// 最短経路の球面線形補間。t は 0.0..=1.0 にクランプ（NaN は 0.0）
///
/// 2つの回転がほぼ同じで slerp が定義できないときは nlerp で代用する。
pub fn slerp(from: &UnitQuaternion<f32>, to: &UnitQuaternion<f32>, t: f32) -> UnitQuaternion<f32> {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let q = from
        .try_slerp(to, t, SLERP_EPSILON)
        .unwrap_or_else(|| nlerp(from, to, t));
    // f32 の acos は小角で誤差が大きく、try_slerp の結果は単位長とは限らない
    UnitQuaternion::new_normalize(q.into_inner())
}

/// 正規化線形補間
pub fn nlerp(from: &UnitQuaternion<f32>, to: &UnitQuaternion<f32>, t: f32) -> UnitQuaternion<f32> {
    // shortest path: dot < 0 なら to を反転
    let a = from.coords;
    let b = if a.dot(&to.coords) < 0.0 { -to.coords } else { to.coords };
    let q = Quaternion::from(a * (1.0 - t) + b * t);
    if q.norm() > 0.0 {
        UnitQuaternion::new_normalize(q)
    } else {
        *from
    }
}
