pub mod config;
pub mod engine;
pub mod error;
pub mod stage;
pub mod table;

pub use config::EngineConfig;
pub use engine::{Engine, ProcessEngine, RecordingEngine};
pub use error::{EngineError, StagingError};
pub use stage::{DataStager, StagedTable, TempFileStager};
pub use table::Table;
