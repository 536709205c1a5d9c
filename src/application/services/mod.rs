//! Application services

pub mod renamer;
pub mod stress;

pub use renamer::CollisionAvoidingRenamer;
pub use stress::{StressReport, StressRunner};
