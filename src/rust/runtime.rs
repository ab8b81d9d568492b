use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::Result as OrtResult;
use std::sync::Mutex;

static INITIALIZED: Mutex<bool> = Mutex::new(false);

#[derive(Debug)]
pub struct RuntimeConfig {
    pub inter_threads: usize,
    pub intra_threads: usize,
    pub optimization_level: GraphOptimizationLevel,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            inter_threads: 0, // Let ONNX Runtime decide
            intra_threads: 0, // Let ONNX Runtime decide
            optimization_level: GraphOptimizationLevel::Level3,
        }
    }
}

impl Clone for RuntimeConfig {
    fn clone(&self) -> Self {
        Self {
            inter_threads: self.inter_threads,
            intra_threads: self.intra_threads,
            optimization_level: optimization_level_from_u8(optimization_level_to_u8(&self.optimization_level)),
        }
    }
}

/// Maps a numeric level (0 = disabled, 1-3) onto the runtime's optimization level.
/// Values above 3 saturate to the highest level.
pub fn optimization_level_from_u8(level: u8) -> GraphOptimizationLevel {
    match level {
        0 => GraphOptimizationLevel::Disable,
        1 => GraphOptimizationLevel::Level1,
        2 => GraphOptimizationLevel::Level2,
        _ => GraphOptimizationLevel::Level3,
    }
}

fn optimization_level_to_u8(level: &GraphOptimizationLevel) -> u8 {
    match level {
        GraphOptimizationLevel::Disable => 0,
        GraphOptimizationLevel::Level1 => 1,
        GraphOptimizationLevel::Level2 => 2,
        GraphOptimizationLevel::Level3 => 3,
    }
}

fn init_onnx_environment() -> OrtResult<()> {
    ort::init()
        .with_name("signsight")
        .commit()?;
    Ok(())
}

/// Commits the process-wide ONNX Runtime environment exactly once.
/// The lock is held across initialization so concurrent callers wait for it.
pub fn ensure_initialized() -> OrtResult<()> {
    let mut initialized = INITIALIZED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if !*initialized {
        init_onnx_environment()?;
        *initialized = true;
    }
    Ok(())
}

pub fn create_session_builder(config: &RuntimeConfig) -> OrtResult<SessionBuilder> {
    ensure_initialized()?;
    let mut builder = Session::builder()?;

    // Configure threading
    if config.inter_threads > 0 {
        builder = builder.with_inter_threads(config.inter_threads)?;
    }
    if config.intra_threads > 0 {
        builder = builder.with_intra_threads(config.intra_threads)?;
    }

    let opt_level = optimization_level_from_u8(optimization_level_to_u8(&config.optimization_level));
    builder = builder.with_optimization_level(opt_level)?;

    Ok(builder)
}
