//! This module provides the `TuringMachine` sum type over every machine kind, and the
//! `MachineFactory` that builds one from a parsed configuration.

use crate::composition::CompositionMachine;
use crate::conditional::ConditionalMachine;
use crate::iteration::IterationMachine;
use crate::machine::RegularMachine;
use crate::parser::{parse, MachineConfig};
use crate::tape::Tape;
use crate::types::{Limits, MachineKind, Program, Status, TuringMachineError};
use std::io::Write;
use tracing::debug;

/// Any runnable machine.
#[derive(Debug, Clone)]
pub enum TuringMachine {
    Regular(RegularMachine),
    Composition(CompositionMachine),
    Conditional(ConditionalMachine),
    Iteration(IterationMachine),
}

impl TuringMachine {
    pub fn kind(&self) -> MachineKind {
        match self {
            TuringMachine::Regular(_) => MachineKind::Regular,
            TuringMachine::Composition(_) => MachineKind::Composition,
            TuringMachine::Conditional(_) => MachineKind::Conditional,
            TuringMachine::Iteration(_) => MachineKind::Iteration,
        }
    }

    /// Runs the machine to a terminal status without producing output.
    pub fn execute(&mut self) -> Result<Status, TuringMachineError> {
        match self {
            TuringMachine::Regular(machine) => Ok(machine.execute().clone()),
            TuringMachine::Composition(machine) => machine.execute().cloned(),
            TuringMachine::Conditional(machine) => machine.execute().cloned(),
            TuringMachine::Iteration(machine) => machine.execute().cloned(),
        }
    }

    /// Runs the machine and writes its final tape to `out`, whether it halted or errored.
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Status, TuringMachineError> {
        match self {
            TuringMachine::Regular(machine) => machine.run(out),
            TuringMachine::Composition(machine) => machine.run(out),
            TuringMachine::Conditional(machine) => machine.run(out),
            TuringMachine::Iteration(machine) => machine.run(out),
        }
    }

    pub fn status(&self) -> &Status {
        match self {
            TuringMachine::Regular(machine) => machine.status(),
            TuringMachine::Composition(machine) => machine.status(),
            TuringMachine::Conditional(machine) => machine.status(),
            TuringMachine::Iteration(machine) => machine.status(),
        }
    }

    /// The child whose tape is written as output.
    pub fn output(&self) -> &RegularMachine {
        match self {
            TuringMachine::Regular(machine) => machine,
            TuringMachine::Composition(machine) => machine.output(),
            TuringMachine::Conditional(machine) => machine.output(),
            TuringMachine::Iteration(machine) => machine.output(),
        }
    }

    pub fn tape(&self) -> &Tape {
        self.output().tape()
    }

    /// Total transitions applied by every child over the whole run, every loop pass included.
    pub fn step_count(&self) -> usize {
        match self {
            TuringMachine::Regular(machine) => machine.total_step_count(),
            TuringMachine::Composition(machine) => {
                machine.first().total_step_count() + machine.second().total_step_count()
            }
            TuringMachine::Conditional(machine) => {
                machine.condition().total_step_count()
                    + machine.on_match().total_step_count()
                    + machine.otherwise().total_step_count()
            }
            TuringMachine::Iteration(machine) => {
                machine.body().total_step_count() + machine.post().total_step_count()
            }
        }
    }
}

/// Builds machines from configurations, applying the same limits to every child.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineFactory {
    limits: Limits,
}

impl MachineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Parses configuration text and builds the machine its type tag names.
    pub fn create(&self, input: &str) -> Result<TuringMachine, TuringMachineError> {
        self.build(parse(input)?)
    }

    /// Builds the machine for an already parsed configuration.
    ///
    /// A composite's input tape is moved onto the child that runs first and checked against
    /// that child's alphabet.
    ///
    /// # Errors
    ///
    /// * `TuringMachineError::MissingMachine` if a composite lacks a child block.
    /// * Any error raised while building a child, see [`RegularMachine::new`].
    pub fn build(&self, mut config: MachineConfig) -> Result<TuringMachine, TuringMachineError> {
        debug!(kind = %config.kind(), limits = ?self.limits, "Building machine");
        config.stage_input();

        let machine = match config {
            MachineConfig::Regular(program) => TuringMachine::Regular(self.regular(program)?),
            MachineConfig::Composition { first, second } => {
                TuringMachine::Composition(CompositionMachine::from_children(
                    self.child(first)?,
                    self.child(second)?,
                )?)
            }
            MachineConfig::Conditional {
                condition,
                on_match,
                otherwise,
                branch_symbols,
            } => TuringMachine::Conditional(ConditionalMachine::from_children(
                self.child(condition)?,
                self.child(on_match)?,
                self.child(otherwise)?,
                branch_symbols,
            )?),
            MachineConfig::Iteration {
                body,
                post,
                condition,
            } => TuringMachine::Iteration(
                IterationMachine::from_children(self.child(body)?, self.child(post)?, condition)?
                    .with_max_passes(self.limits.max_passes),
            ),
        };

        Ok(machine)
    }

    fn regular(&self, program: Program) -> Result<RegularMachine, TuringMachineError> {
        Ok(RegularMachine::new(program)?.with_limits(self.limits))
    }

    fn child(&self, program: Option<Program>) -> Result<Option<RegularMachine>, TuringMachineError> {
        program.map(|program| self.regular(program)).transpose()
    }
}
