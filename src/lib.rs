//! This crate provides the core logic for composable Turing machines.
//! It includes modules for parsing machine configurations, running single-tape machines,
//! chaining them through composition, conditional branching and iteration, and managing a
//! collection of embedded sample configurations.

pub mod analyzer;
pub mod composition;
pub mod conditional;
pub mod factory;
pub mod iteration;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod types;
pub mod visualizer;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
pub use composition::CompositionMachine;
pub use conditional::{Branch, ConditionalMachine};
pub use factory::{MachineFactory, TuringMachine};
pub use iteration::IterationMachine;
/// Re-exports the `ConfigLoader` struct from the loader module.
pub use loader::ConfigLoader;
pub use machine::{RegularMachine, TransitionTable};
pub use parser::{parse, parse_program, MachineConfig};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Direction, Halt, Limits, MachineKind, Program, Status, Step, Transition, TuringMachineError,
    BLANK_SYMBOL, HEAD_MARKER, MAX_PROGRAM_SIZE,
};
pub use visualizer::render_dot;
