//! This module defines the `RegularMachine`, the atomic single-tape interpreter, together with
//! the `TransitionTable` it executes. Composite machines are built by handing tapes between
//! regular machines, see [`RegularMachine::hand_off`].

use crate::analyzer::analyze;
use crate::tape::Tape;
use crate::types::{Halt, Limits, Program, Status, Step, Transition, TuringMachineError};
use std::collections::{BTreeSet, HashMap};
use std::io::Write;
use tracing::{debug, trace, warn};

/// Maps `(state, symbol)` to the transition that fires for it.
///
/// Built once when a machine is constructed and never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionTable {
    rules: HashMap<String, HashMap<char, Transition>>,
    len: usize,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transition, returning the one it replaced for the same `(state, symbol)` key.
    pub fn insert(&mut self, transition: Transition) -> Option<Transition> {
        let replaced = self
            .rules
            .entry(transition.state.clone())
            .or_default()
            .insert(transition.read, transition);

        if replaced.is_none() {
            self.len += 1;
        }

        replaced
    }

    /// Finds the transition for the given state and symbol under the head.
    pub fn get(&self, state: &str, symbol: char) -> Option<&Transition> {
        self.rules.get(state)?.get(&symbol)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.rules.values().flat_map(|by_symbol| by_symbol.values())
    }
}

/// Later transitions win over earlier ones with the same key.
impl FromIterator<Transition> for TransitionTable {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        let mut table = TransitionTable::new();

        for transition in iter {
            if let Some(previous) = table.insert(transition) {
                warn!(%previous, "Duplicate transition key, keeping the later definition");
            }
        }

        table
    }
}

/// A deterministic single-tape Turing machine.
///
/// The machine owns its tape exclusively. It runs until its current state is a halting state
/// (`Status::Halted`) or no transition matches (`Status::Errored`); both are terminal until the
/// machine is re-armed with [`RegularMachine::set_current_state`].
#[derive(Debug, Clone)]
pub struct RegularMachine {
    table: TransitionTable,
    halting_states: BTreeSet<String>,
    states: BTreeSet<String>,
    alphabet: BTreeSet<char>,
    initial_state: String,
    state: String,
    tape: Tape,
    status: Status,
    step_count: usize,
    total_steps: usize,
    limits: Limits,
}

impl RegularMachine {
    /// Creates a machine from a parsed block.
    ///
    /// The block is analyzed first, so a tape holding symbols outside the alphabet is rejected
    /// before any step executes.
    ///
    /// # Errors
    ///
    /// * `TuringMachineError::InvalidTapeSymbols`, `EmptyInput`, `PositionOutOfRange` or
    ///   `InvalidStartState` when the block fails analysis.
    pub fn new(program: Program) -> Result<Self, TuringMachineError> {
        analyze(&program)?;

        let mut tape = Tape::new(&program.tape)?;
        tape.set_position(program.head)?;

        Ok(Self {
            table: program.transitions.into_iter().collect(),
            halting_states: program.halting_states,
            states: program.states,
            alphabet: program.alphabet,
            state: program.initial_state.clone(),
            initial_state: program.initial_state,
            tape,
            status: Status::Running,
            step_count: 0,
            total_steps: 0,
            limits: Limits::default(),
        })
    }

    /// Applies execution caps to this machine. Only `max_steps` concerns a regular machine.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition fired.
    /// * `Step::Halt(Halt::Ok)` if the current state is a halting state.
    /// * `Step::Halt(Halt::Err(_))` if no transition is defined for the current state and
    ///   symbol, or the step limit is used up.
    pub fn step(&mut self) -> Step {
        match &self.status {
            Status::Halted => return Step::Halt(Halt::Ok),
            Status::Errored(error) => return Step::Halt(Halt::Err(error.clone())),
            Status::Running => {}
        }

        if self.halting_states.contains(&self.state) {
            self.status = Status::Halted;
            return Step::Halt(Halt::Ok);
        }

        if let Some(max_steps) = self.limits.max_steps {
            if self.step_count >= max_steps {
                return self.fail(TuringMachineError::StepLimitExceeded(max_steps));
            }
        }

        let symbol = self.tape.read();
        let Some(transition) = self.table.get(&self.state, symbol) else {
            let error = TuringMachineError::UndefinedTransition {
                state: self.state.clone(),
                symbol,
            };
            return self.fail(error);
        };

        trace!(
            step = self.step_count,
            position = self.tape.position(),
            %transition,
            "Applying transition"
        );

        self.tape.write(transition.write);
        self.tape.shift(transition.direction);
        self.state.clone_from(&transition.next_state);
        self.step_count += 1;
        self.total_steps += 1;

        Step::Continue
    }

    fn fail(&mut self, error: TuringMachineError) -> Step {
        self.status = Status::Errored(error.clone());
        Step::Halt(Halt::Err(error))
    }

    /// Runs the machine until it reaches a terminal status, without producing output.
    ///
    /// Calling this on a machine that already halted or errored does nothing.
    pub fn execute(&mut self) -> &Status {
        if self.status.is_terminal() {
            return &self.status;
        }

        debug!(
            state = %self.state,
            position = self.tape.position(),
            "Running machine"
        );

        while let Step::Continue = self.step() {}

        match &self.status {
            Status::Errored(error) => warn!(
                %error,
                steps = self.step_count,
                tape = %self.tape,
                "Machine stopped on an error"
            ),
            _ => debug!(
                state = %self.state,
                steps = self.step_count,
                "Machine halted"
            ),
        }

        &self.status
    }

    /// Runs the machine to a terminal status and writes the final tape to `out`.
    ///
    /// The tape is written whether the machine halted or errored. Runtime errors are reported
    /// through the returned status; `Err` means only that writing to `out` failed.
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Status, TuringMachineError> {
        let status = self.execute().clone();
        self.write_tape(out)?;
        Ok(status)
    }

    /// Writes the tape verbatim, without delimiters.
    pub fn write_tape<W: Write + ?Sized>(&self, out: &mut W) -> Result<(), TuringMachineError> {
        write!(out, "{}", self.tape)
            .and_then(|_| out.flush())
            .map_err(|e| TuringMachineError::OutputError(e.to_string()))
    }

    /// Copies this machine's tape and head position into `next`.
    ///
    /// The tape travels as a string, so the two machines never share storage.
    pub fn hand_off(&self, next: &mut RegularMachine) -> Result<(), TuringMachineError> {
        next.set_tape(&self.tape.to_string())?;
        next.set_position(self.position())
    }

    /// Replaces the tape, placing the cursor on the first cell.
    ///
    /// # Errors
    ///
    /// * `TuringMachineError::EmptyInput` if `content` is empty.
    pub fn set_tape(&mut self, content: &str) -> Result<(), TuringMachineError> {
        self.tape = Tape::new(content)?;
        Ok(())
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Returns the 0-based head position.
    pub fn position(&self) -> usize {
        self.tape.position()
    }

    pub fn set_position(&mut self, position: usize) -> Result<(), TuringMachineError> {
        self.tape.set_position(position)
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> char {
        self.tape.read()
    }

    /// Moves the machine to `state` and re-arms it for a fresh run.
    ///
    /// Unknown states are ignored with a warning; the machine is left untouched.
    pub fn set_current_state(&mut self, state: &str) {
        if !self.states.contains(state) && !self.halting_states.contains(state) {
            warn!(state, "Invalid state, keeping {}", self.state);
            return;
        }

        self.state = state.to_string();
        self.status = Status::Running;
        self.step_count = 0;
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the state this machine was configured to start in.
    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status.is_halted()
    }

    /// Returns the number of transitions applied since the machine was built or last re-armed.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the number of transitions applied over the machine's whole life, re-arms included.
    pub fn total_step_count(&self) -> usize {
        self.total_steps
    }

    pub fn transitions(&self) -> &TransitionTable {
        &self.table
    }

    pub fn halting_states(&self) -> &BTreeSet<String> {
        &self.halting_states
    }

    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }
}
