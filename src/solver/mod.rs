//! ランドマーク → 部位回転・口形
//!
//! すべて純粋関数。欠けた領域や壊れた入力はその部位を出さないだけで、エラーにはしない。

pub mod body;
pub mod face;
pub mod hand;
pub mod holistic;
pub mod solved;
pub mod vector;

pub use face::ImageSize;
pub use holistic::HolisticSolver;
pub use solved::{BodyPart, Euler, MouthShape, Side, SolvedFrame, SolvedPose, Viseme};
