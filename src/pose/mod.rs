pub mod landmark;
pub mod source;

pub use landmark::{face_index, hand_index, pose_index, Landmark, LandmarkSet, Region};
pub use source::{LandmarkSource, ReplayFrames, ReplaySource, SnapshotSlot, ThreadedSource};
