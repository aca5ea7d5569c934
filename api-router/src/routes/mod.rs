pub mod ask;
pub mod content;
pub mod liveness;
pub mod readiness;
