#![forbid(unsafe_code)]

pub mod content;
pub mod exam;
pub mod lesson;
pub mod model;
pub mod progress;
pub mod review_pool;
pub mod scoring;
pub mod time;

pub use time::Clock;
