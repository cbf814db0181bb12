//! リグ側の名前解決と状態
pub mod bone;
pub mod humanoid;

pub use bone::{ExpressionName, HumanBone};
pub use humanoid::{BoneNode, ExpressionSlot, HumanoidRig, Rig};
