//! Scripting hook and process-level runtime lifecycle.
//!
//! The engine does not embed an interpreter. Hosts plug one in through
//! [`ScriptContext`]; `<script>` elements hand their source to it when a
//! document is loaded.

use crate::error::Result;

/// An interpreter the document's scripts run in.
pub trait ScriptContext {
    /// Run a piece of script source.
    fn evaluate(&mut self, source: &str) -> Result<()>;
}

/// Accepts and discards every script.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScriptContext;

impl ScriptContext for NullScriptContext {
    fn evaluate(&mut self, source: &str) -> Result<()> {
        log::trace!("Discarding script ({} bytes)", source.len());
        Ok(())
    }
}

/// Keeps every evaluated source, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingScriptContext {
    pub evaluated: Vec<String>,
}

impl ScriptContext for RecordingScriptContext {
    fn evaluate(&mut self, source: &str) -> Result<()> {
        self.evaluated.push(source.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Install `env_logger` as the global logger on initialization.
    pub init_logging: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { init_logging: true }
    }
}

/// Process-wide engine state, created once by the host and torn down with
/// [`Runtime::finalize`].
pub struct Runtime {
    config: RuntimeConfig,
    context: Box<dyn ScriptContext>,
}

impl Runtime {
    /// Initialize the engine with a script context that discards scripts.
    pub fn initialize(config: RuntimeConfig) -> Self {
        Self::with_context(config, Box::new(NullScriptContext))
    }

    pub fn with_context(config: RuntimeConfig, context: Box<dyn ScriptContext>) -> Self {
        if config.init_logging {
            // A host may already have installed a logger.
            if env_logger::try_init().is_err() {
                log::debug!("Logger already initialized");
            }
        }
        log::info!("Runtime initialized");
        Self { config, context }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn context_mut(&mut self) -> &mut dyn ScriptContext {
        &mut *self.context
    }

    /// Tear the runtime down, returning its script context.
    pub fn finalize(self) -> Box<dyn ScriptContext> {
        log::info!("Runtime finalized");
        self.context
    }
}
