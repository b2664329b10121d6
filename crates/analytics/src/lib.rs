mod aggregate;
mod config;
mod dwell;
mod segment;
mod window;

pub use aggregate::{Aggregates, aggregate, chains, interests};
pub use config::{AnalyticsConfig, SegmentConfig};
pub use dwell::{seconds_to_minutes, visit_dwell};
pub use segment::{collapsed_path, dominant_category, segment};
pub use window::{Window, analyze_window, visits_in};
