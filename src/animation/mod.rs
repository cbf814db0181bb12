//! リターゲット以外のアニメーション状態
pub mod mode;
pub mod talk;

pub use mode::{DriveMode, ModeSwitch};
pub use talk::{talk_duration, TalkAnimator, TalkEvent, TalkPhase};
