mod paths;
mod reader;
mod snapshot;
mod types;

pub use paths::{HISTORY_PATHS_ENV, default_history_candidates, locate_history};
pub use reader::{
    DEFAULT_BATCH_SIZE, VisitStream, chrome_time_to_utc, probe_history, read_history,
    utc_to_chrome_time,
};
pub use types::{IngestError, IngestStats, Result, SourceProbe};
