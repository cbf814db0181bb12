pub mod animation;
pub mod config;
pub mod pose;
pub mod rig;
pub mod solver;
pub mod tracker;
