//! Runtime engine selection with enum-based dispatch.
//!
//! [`Engine`] wraps every concrete engine in one type so a [`Simulator`]
//! can be built from an [`EngineType`] chosen at runtime. Hook calls are
//! forwarded with a macro that expands to a `match`, so no vtable is
//! involved.
//!
//! [`Simulator`]: crate::sim::Simulator

use crate::sim::fbl::FblState;
use crate::sim::{
    FblBasicEngine, FblParallelEngine, InitialConditions, ProgramOptions, SimulatorImpl,
};
use crate::Result;

/// Engine implementation selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineType {
    /// Single-threaded reference implementation
    #[default]
    Basic,
    /// Multi-threaded implementation
    Parallel,
}

/// Any concrete engine.
#[derive(Debug)]
pub enum Engine {
    /// Single-threaded FBL
    Basic(FblBasicEngine),
    /// Multi-threaded FBL
    Parallel(FblParallelEngine),
}

macro_rules! dispatch_engine {
    ($self:expr, $method:ident($($args:expr),*)) => {
        match $self {
            Engine::Basic(e) => e.$method($($args),*),
            Engine::Parallel(e) => e.$method($($args),*),
        }
    };
}

impl Engine {
    /// Create an uninitialized engine of the given type.
    pub fn new(engine_type: EngineType) -> Self {
        match engine_type {
            EngineType::Basic => Engine::Basic(FblBasicEngine::new()),
            EngineType::Parallel => Engine::Parallel(FblParallelEngine::new()),
        }
    }

    /// Create the engine selected by `options`.
    pub fn for_options(options: &ProgramOptions) -> Self {
        Self::new(options.engine_type())
    }

    /// Get the engine type.
    pub fn engine_type(&self) -> EngineType {
        match self {
            Engine::Basic(_) => EngineType::Basic,
            Engine::Parallel(_) => EngineType::Parallel,
        }
    }

    /// FBL state, once initialized.
    pub fn fbl_state(&self) -> Option<&FblState> {
        dispatch_engine!(self, state())
    }
}

impl SimulatorImpl for Engine {
    fn name(&self) -> &str {
        dispatch_engine!(self, name())
    }

    fn init(&mut self, options: &ProgramOptions, init_cond: &InitialConditions) -> Result<()> {
        dispatch_engine!(self, init(options, init_cond))
    }

    #[inline]
    fn next_step(&self) -> u64 {
        dispatch_engine!(self, next_step())
    }

    #[inline]
    fn final_step(&self) -> u64 {
        dispatch_engine!(self, final_step())
    }

    #[inline]
    fn exec_next_step(&mut self) {
        dispatch_engine!(self, exec_next_step())
    }

    fn results(&self) -> Vec<f32> {
        dispatch_engine!(self, results())
    }

    fn print_status(&self) {
        dispatch_engine!(self, print_status())
    }
}
