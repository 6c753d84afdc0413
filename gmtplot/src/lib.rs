pub mod alias;
pub mod args;
pub mod error;
pub mod figure;
pub mod histogram;

pub use alias::{ModuleSpec, OptionAlias, OptionKind};
pub use args::{build_arg_string, Options};
pub use error::GmtPlotError;
pub use figure::Figure;
pub use histogram::{HistogramOptions, HISTOGRAM};

pub use gmtplot_common::{OptionValue, Scalar};
pub use gmtplot_session::{EngineConfig, Table};
