//! Configuration data
//!
//! Pure data consumed by the composer: package lists, pinned versions and
//! commits, and upstream URLs. Nothing in here contains branching logic.

pub mod defaults;
pub mod urls;
