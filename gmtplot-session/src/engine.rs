use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::EngineError;

/// Entry point into the external plotting engine.
pub trait Engine: Send + Sync {
    /// Run `module` with a space-separated argument string, blocking until it returns.
    fn call_module(&self, module: &str, args: &str) -> Result<(), EngineError>;
}

/// Runs each module as `<program> <module> <args...>` in a child process.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    program: PathBuf,
}

impl ProcessEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.program.clone())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ProcessEngine {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl Engine for ProcessEngine {
    #[tracing::instrument(skip_all, fields(module = module))]
    fn call_module(&self, module: &str, args: &str) -> Result<(), EngineError> {
        let argv = split_args(args)?;
        info!("{} {module} {args}", self.program.display());

        let output = Command::new(&self.program)
            .arg(module)
            .args(&argv)
            .output()
            .map_err(|source| EngineError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        for line in stderr.lines() {
            debug!("{module}: {line}");
        }

        if !output.status.success() {
            return Err(EngineError::ModuleFailed {
                module: module.to_string(),
                code: output.status.code(),
                stderr,
            });
        }
        Ok(())
    }
}

/// Records calls instead of running them.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: Mutex<Vec<(String, String)>>,
    failure: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that records each call and then fails it with `stderr`.
    pub fn failing(stderr: impl Into<String>) -> Self {
        Self {
            calls: Mutex::default(),
            failure: Some(stderr.into()),
        }
    }

    /// Every `(module, args)` pair received so far, in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Engine for RecordingEngine {
    fn call_module(&self, module: &str, args: &str) -> Result<(), EngineError> {
        debug!("Recording call: {module} {args}");
        let mut calls = self
            .calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        calls.push((module.to_string(), args.to_string()));

        match &self.failure {
            Some(stderr) => Err(EngineError::ModuleFailed {
                module: module.to_string(),
                code: Some(1),
                stderr: stderr.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Split an argument string on whitespace. Quoted runs keep their whitespace and
/// lose the quotes, so `-B+t"Bar counts"` is a single argument.
pub fn split_args(args: &str) -> Result<Vec<String>, EngineError> {
    let mut argv = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote: Option<char> = None;

    for c in args.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_token = true;
            }
            None if c.is_whitespace() => {
                if in_token {
                    argv.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            None => {
                current.push(c);
                in_token = true;
            }
        }
    }

    if let Some(q) = quote {
        return Err(EngineError::InvalidArguments(format!(
            "unterminated {q} quote in '{args}'"
        )));
    }
    if in_token {
        argv.push(current);
    }
    Ok(argv)
}
