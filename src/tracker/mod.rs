pub mod apply;
pub mod rotation;
pub mod session;

pub use apply::{ApplyStats, PoseApplicator};
pub use rotation::{euler_to_quaternion, nlerp, slerp};
pub use session::{RetargetSession, TickOutcome, TickReport};
