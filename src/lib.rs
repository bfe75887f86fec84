// Menstrual flow tracking: cycle detection, cycle statistics and biomarker risk scoring.

pub mod analyzer;
pub mod config;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod report;
pub mod risk;
pub mod source;
pub mod storage;
pub mod utils;
