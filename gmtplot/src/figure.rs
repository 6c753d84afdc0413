use std::sync::Arc;

use gmtplot_session::{DataStager, Engine, EngineConfig, ProcessEngine, Table, TempFileStager};
use tracing::{debug, info_span};

use crate::alias::ModuleSpec;
use crate::args::{build_arg_string, Options};
use crate::error::GmtPlotError;

/// Issues module calls against an engine, staging input tables as needed.
///
/// A `Figure` keeps no state between calls; the plot itself lives in the engine.
#[derive(Clone)]
pub struct Figure {
    engine: Arc<dyn Engine>,
    stager: Arc<dyn DataStager>,
}

impl Figure {
    pub fn new(engine: Arc<dyn Engine>, stager: Arc<dyn DataStager>) -> Self {
        Self { engine, stager }
    }

    /// A figure backed by the `gmt` executable and temporary-file staging.
    pub fn from_config(config: &EngineConfig) -> Self {
        let stager = match &config.temp_dir {
            Some(dir) => TempFileStager::in_dir(dir.clone()),
            None => TempFileStager::new(),
        };
        Self::new(
            Arc::new(ProcessEngine::from_config(config)),
            Arc::new(stager),
        )
    }

    /// Translate `options`, stage `table`, and run `module` with the result.
    ///
    /// Option errors are raised before the table is staged. The staged table is
    /// released when this returns, whether or not the engine call succeeded.
    pub fn call_module(
        &self,
        module: &ModuleSpec,
        table: &Table,
        options: &Options,
    ) -> Result<(), GmtPlotError> {
        let _span = info_span!("call_module", module = module.name).entered();
        let flags = build_arg_string(module, options)?;

        let staged = self.stager.stage(table)?;
        let args = if flags.is_empty() {
            staged.reference().to_string()
        } else {
            format!("{} {flags}", staged.reference())
        };
        debug!("Invoking {} {args}", module.name);

        self.engine.call_module(module.name, &args)?;
        Ok(())
    }
}

impl Default for Figure {
    fn default() -> Self {
        Self::from_config(&EngineConfig::from_env())
    }
}
