// Analyzer module: daily aggregation, cycle segmentation and statistics.

pub mod biomarker_notes;
pub mod cycle_stats;
pub mod daily;
pub mod flags;
pub mod segmenter;

// Re-export the main entry points for ease of use.
pub use cycle_stats::{CycleAnalyzer, CycleAnalyzerImpl, cycle_summary, overall_summary};
pub use daily::{collapse_raw_to_daily, collapse_to_daily, valid_readings};
pub use segmenter::{detect_cycle_starts, rebuild_cycles, segment};
