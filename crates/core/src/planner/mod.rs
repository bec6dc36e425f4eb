//! Planner module for deciding what has to be converted, and into what.
//!
//! Images are judged by extension, audio and video by extension plus probed
//! codecs. Every non-canonical file becomes a [`PlanEntry`]; the finished
//! [`Plan`] is then checked for collisions before anything is applied.

mod builder;
mod types;

pub use builder::Planner;
pub use types::{Collision, Plan, PlanEntry};
