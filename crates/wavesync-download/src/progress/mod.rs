//! Progress helpers.

mod throttle;

pub use throttle::ProgressThrottle;
