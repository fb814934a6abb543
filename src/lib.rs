pub mod models;
pub mod out_models;
pub mod tokenize;
pub mod clean;
pub mod signals;
pub mod insights;
pub mod report;
pub mod budget;
pub mod scrape;
pub mod render;
pub mod renderer;
pub mod pdf;
pub mod font_pdf;
pub mod prompts;
pub mod api_types;
pub mod api_renderer;
pub mod export;
pub mod config;
pub mod error;
pub mod orchestrator;

pub use models::{CleanedRecord, RawRecord};
pub use out_models::{AnalysisResult, AssembledReport};
pub use report::{AnalysisOptions, Analyzer};
