//! This module defines the core data structures and types used throughout the simulator,
//! including parsed machine blocks, transitions, execution outcomes, limits and error types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The blank symbol written into freshly grown tape cells.
pub const BLANK_SYMBOL: char = ' ';
/// The symbol conventionally placed at the start of every tape, left of the head.
pub const HEAD_MARKER: char = '>';
/// Head position every freshly configured machine starts from: the cell right after the marker.
pub const INITIAL_HEAD_POSITION: usize = 1;
/// The maximum allowed size for a machine configuration in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// One parsed machine block: everything needed to build a single regular machine.
///
/// Blocks are produced by the parser, but can just as well be assembled in memory and
/// handed straight to [`crate::machine::RegularMachine::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Transition lines in declaration order.
    pub transitions: Vec<Transition>,
    /// States that stop execution once entered.
    pub halting_states: BTreeSet<String>,
    /// Every state mentioned by a transition, on either side.
    pub states: BTreeSet<String>,
    /// Every symbol mentioned by a transition, plus the blank and the head marker.
    pub alphabet: BTreeSet<char>,
    /// The state the machine starts (and restarts) in.
    pub initial_state: String,
    /// Initial tape content, one symbol per character.
    pub tape: String,
    /// Initial head position, 0-based from the left end of the tape.
    pub head: usize,
}

impl Program {
    /// Builds a program from its transitions, inferring the state set, the alphabet and the
    /// initial state (the source state of the first transition).
    pub fn new<I, S>(transitions: Vec<Transition>, halting_states: I, tape: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut states = BTreeSet::new();
        let mut alphabet = BTreeSet::from([BLANK_SYMBOL, HEAD_MARKER]);

        for transition in &transitions {
            states.insert(transition.state.clone());
            states.insert(transition.next_state.clone());
            alphabet.insert(transition.read);
            alphabet.insert(transition.write);
        }

        let initial_state = transitions
            .first()
            .map(|t| t.state.clone())
            .unwrap_or_default();

        Self {
            transitions,
            halting_states: halting_states.into_iter().map(Into::into).collect(),
            states,
            alphabet,
            initial_state,
            tape: tape.to_string(),
            head: INITIAL_HEAD_POSITION,
        }
    }

    /// Returns `true` if `state` stops execution.
    pub fn is_halting(&self, state: &str) -> bool {
        self.halting_states.contains(state)
    }
}

/// A single transition rule: `(state, read) -> (write, next_state, direction)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state the machine must be in for this rule to fire.
    pub state: String,
    /// The symbol that must be under the head.
    pub read: char,
    /// The symbol written in place of `read`.
    pub write: char,
    /// The state the machine moves to.
    pub next_state: String,
    /// Where the head goes after writing.
    pub direction: Direction,
}

impl Transition {
    pub fn new(
        state: impl Into<String>,
        read: char,
        write: char,
        next_state: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            state: state.into(),
            read,
            write,
            next_state: next_state.into(),
            direction,
        }
    }
}

/// Formats the transition back into its configuration line, e.g. `0{q0}->1{halt}S`.
impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{{{}}}->{}{{{}}}{}",
            self.read,
            self.state,
            self.write,
            self.next_state,
            self.direction.code()
        )
    }
}

/// Represents the possible directions a head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// The move code used in configuration files.
    pub fn code(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::Stay => 'S',
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = TuringMachineError;

    fn try_from(code: char) -> Result<Self, Self::Error> {
        match code {
            'L' => Ok(Direction::Left),
            'R' => Ok(Direction::Right),
            'S' => Ok(Direction::Stay),
            other => Err(TuringMachineError::Configuration(format!(
                "Unsupported move code: {other:?}"
            ))),
        }
    }
}

/// The machine kinds a configuration's first line can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MachineKind {
    Regular,
    Composition,
    Conditional,
    Iteration,
}

impl MachineKind {
    /// The type tag used on the first line of a configuration.
    pub fn tag(self) -> &'static str {
        match self {
            MachineKind::Regular => "REGULAR",
            MachineKind::Composition => "COMPOSITION",
            MachineKind::Conditional => "CONDITIONAL",
            MachineKind::Iteration => "LOOP",
        }
    }
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.tag())
    }
}

impl FromStr for MachineKind {
    type Err = TuringMachineError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "REGULAR" => Ok(MachineKind::Regular),
            "COMPOSITION" => Ok(MachineKind::Composition),
            "CONDITIONAL" => Ok(MachineKind::Conditional),
            "LOOP" => Ok(MachineKind::Iteration),
            other => Err(TuringMachineError::UnknownMachineType(other.to_string())),
        }
    }
}

/// Lifecycle of a machine: it runs until it halts or errors, and both outcomes are terminal.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Running,
    Halted,
    /// Execution stopped on a runtime error; the tape is still intact for inspection.
    Errored(TuringMachineError),
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Running)
    }

    pub fn is_halted(&self) -> bool {
        matches!(self, Status::Halted)
    }

    pub fn error(&self) -> Option<&TuringMachineError> {
        match self {
            Status::Errored(error) => Some(error),
            _ => None,
        }
    }

    /// Folds the status of a later phase into this one. The first error wins, otherwise the
    /// later status stands.
    pub fn then(self, next: Status) -> Status {
        match self {
            Status::Errored(_) => self,
            _ => next,
        }
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The machine performed a transition and can continue.
    Continue,
    /// The machine is in a terminal status.
    Halt(Halt),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Halt {
    /// Halted in one of the halting states.
    Ok,

    Err(TuringMachineError),
}

/// Optional execution caps. The default is unbounded.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum number of transitions a regular machine performs per run.
    pub max_steps: Option<usize>,
    /// Maximum number of loop-machine passes an iteration machine performs.
    pub max_passes: Option<usize>,
}

impl Limits {
    pub fn unbounded() -> Self {
        Self::default()
    }
}

/// Represents various errors that can occur while loading or running machines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuringMachineError {
    /// The configuration is unreadable or structurally incomplete.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The first line names a machine type this crate does not build.
    #[error("Unknown machine type: {0}")]
    UnknownMachineType(String),
    /// A composite was assembled without one of its children.
    #[error("Configuration error: missing {0} machine")]
    MissingMachine(&'static str),
    /// A line could not be read as a transition.
    #[error("Malformed transition on line {line}: {content:?} ({reason})")]
    MalformedTransition {
        line: usize,
        content: String,
        reason: String,
    },
    /// No rule is defined for the current state and the symbol under the head.
    #[error("No rule defined for state {state} and symbol {symbol:?}")]
    UndefinedTransition { state: String, symbol: char },
    /// The initial tape uses symbols outside the machine's alphabet.
    #[error("Initial tape contains symbols outside the alphabet: {0:?}")]
    InvalidTapeSymbols(Vec<char>),
    /// A tape was created from an empty string.
    #[error("Tape content must not be empty")]
    EmptyInput,
    /// A head position lies beyond the end of the tape.
    #[error("Position {position} is out of range for a tape of length {len}")]
    PositionOutOfRange { position: usize, len: usize },
    /// The initial state is not part of the machine.
    #[error("Invalid start state: {0}")]
    InvalidStartState(String),
    #[error("Step limit of {0} exceeded")]
    StepLimitExceeded(usize),
    #[error("Loop pass limit of {0} exceeded")]
    PassLimitExceeded(usize),
    /// Indicates an error related to reading configuration files.
    #[error("File error: {0}")]
    FileError(String),
    /// Writing the final tape to the output sink failed.
    #[error("Output error: {0}")]
    OutputError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left = Direction::Left;
        let right = Direction::Right;

        let left_json = serde_json::to_string(&left).unwrap();
        let right_json = serde_json::to_string(&right).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(right_json, "\"Right\"");

        let left_deserialized: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, left_deserialized);
    }

    #[test]
    fn test_direction_codes() {
        assert_eq!(Direction::try_from('L').unwrap(), Direction::Left);
        assert_eq!(Direction::try_from('R').unwrap(), Direction::Right);
        assert_eq!(Direction::try_from('S').unwrap(), Direction::Stay);
        assert!(Direction::try_from('X').is_err());
    }

    #[test]
    fn test_transition_display_matches_config_syntax() {
        let transition = Transition::new("q0", '0', '1', "halt", Direction::Stay);
        assert_eq!(transition.to_string(), "0{q0}->1{halt}S");

        let blank = Transition::new("r", ' ', ' ', "c", Direction::Left);
        assert_eq!(blank.to_string(), " {r}-> {c}L");
    }

    #[test]
    fn test_program_infers_states_and_alphabet() {
        let program = Program::new(
            vec![
                Transition::new("q0", 'a', 'b', "q1", Direction::Right),
                Transition::new("q1", 'b', 'c', "halt", Direction::Stay),
            ],
            ["halt"],
            ">ab",
        );

        assert_eq!(program.initial_state, "q0");
        assert_eq!(program.head, INITIAL_HEAD_POSITION);
        assert!(program.is_halting("halt"));
        assert_eq!(
            program.states,
            BTreeSet::from(["q0".to_string(), "q1".to_string(), "halt".to_string()])
        );
        assert_eq!(
            program.alphabet,
            BTreeSet::from([' ', '>', 'a', 'b', 'c'])
        );
    }

    #[test]
    fn test_machine_kind_tags() {
        assert_eq!("LOOP".parse::<MachineKind>().unwrap(), MachineKind::Iteration);
        assert_eq!(MachineKind::Conditional.to_string(), "CONDITIONAL");
        assert_eq!(
            "MULTITAPE".parse::<MachineKind>(),
            Err(TuringMachineError::UnknownMachineType("MULTITAPE".into()))
        );
    }

    #[test]
    fn test_status_then_keeps_first_error() {
        let error = Status::Errored(TuringMachineError::StepLimitExceeded(3));
        assert_eq!(error.clone().then(Status::Halted), error);
        assert_eq!(Status::Halted.then(error.clone()), error);
        assert_eq!(Status::Halted.then(Status::Halted), Status::Halted);
    }

    #[test]
    fn test_error_display() {
        let error = TuringMachineError::UndefinedTransition {
            state: "q0".to_string(),
            symbol: 'x',
        };

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("No rule defined"));
        assert!(error_msg.contains("q0"));
        assert!(error_msg.contains("'x'"));
    }
}
