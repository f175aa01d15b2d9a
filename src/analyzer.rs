//! This module provides functions for analyzing machine blocks before execution. Fatal checks
//! (tape symbols outside the alphabet, an out-of-range head, an unknown start state) reject the
//! block; softer findings such as unreachable states are only reported as warnings.

use crate::types::{Program, TuringMachineError};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Represents the findings of analyzing a machine block.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The initial tape is empty.
    EmptyTape,
    /// The initial head position lies beyond the initial tape.
    InvalidHead { position: usize, len: usize },
    /// The initial state is neither used by a transition nor a halting state.
    InvalidStartState(String),
    /// The initial tape contains symbols outside the alphabet.
    InvalidTapeSymbols(Vec<char>),
    /// States used by transitions that cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
    /// Halting states that no transition leads to.
    UnusedHaltingStates(Vec<String>),
}

impl From<AnalysisError> for TuringMachineError {
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::EmptyTape => TuringMachineError::EmptyInput,
            AnalysisError::InvalidHead { position, len } => {
                TuringMachineError::PositionOutOfRange { position, len }
            }
            AnalysisError::InvalidStartState(state) => TuringMachineError::InvalidStartState(state),
            AnalysisError::InvalidTapeSymbols(symbols) => {
                TuringMachineError::InvalidTapeSymbols(symbols)
            }
            AnalysisError::UnreachableStates(states) => TuringMachineError::Configuration(
                format!("Unreachable states detected: {:?}", states),
            ),
            AnalysisError::UnusedHaltingStates(states) => TuringMachineError::Configuration(
                format!("Halting states never entered: {:?}", states),
            ),
        }
    }
}

/// Analyzes a machine block, returning the first fatal problem found.
///
/// Non-fatal findings are logged through [`lint`] and never fail the analysis.
///
/// # Returns
///
/// * `Ok(())` if the block can be executed.
/// * `Err(TuringMachineError)` for the first failed check.
pub fn analyze(program: &Program) -> Result<(), TuringMachineError> {
    let error = [check_tape, check_head, check_start_state, check_tape_symbols]
        .iter()
        .find_map(|check| check(program).err());

    if let Some(error) = error {
        return Err(error.into());
    }

    for finding in lint(program) {
        warn!(initial_state = %program.initial_state, "{}", TuringMachineError::from(finding));
    }

    Ok(())
}

/// Collects the non-fatal findings for a machine block.
pub fn lint(program: &Program) -> Vec<AnalysisError> {
    [check_unreachable_states, check_unused_halting_states]
        .iter()
        .filter_map(|check| check(program).err())
        .collect()
}

fn check_tape(program: &Program) -> Result<(), AnalysisError> {
    if program.tape.is_empty() {
        return Err(AnalysisError::EmptyTape);
    }

    Ok(())
}

/// The head may sit one past the last cell; the tape grows a blank to meet it.
fn check_head(program: &Program) -> Result<(), AnalysisError> {
    let len = program.tape.chars().count();
    if program.head > len {
        return Err(AnalysisError::InvalidHead {
            position: program.head,
            len,
        });
    }

    Ok(())
}

/// Blocks without transitions are accepted with any start state; they error on their first step
/// unless that state halts.
fn check_start_state(program: &Program) -> Result<(), AnalysisError> {
    if program.states.is_empty() || program.is_halting(&program.initial_state) {
        return Ok(());
    }

    if !program.states.contains(&program.initial_state) {
        return Err(AnalysisError::InvalidStartState(
            program.initial_state.clone(),
        ));
    }

    Ok(())
}

fn check_tape_symbols(program: &Program) -> Result<(), AnalysisError> {
    let invalid: BTreeSet<char> = program
        .tape
        .chars()
        .filter(|symbol| !program.alphabet.contains(symbol))
        .collect();

    if !invalid.is_empty() {
        return Err(AnalysisError::InvalidTapeSymbols(invalid.into_iter().collect()));
    }

    Ok(())
}

/// Walks the transition graph from the initial state and reports every state it never reaches.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for transition in &program.transitions {
        edges
            .entry(transition.state.as_str())
            .or_default()
            .push(transition.next_state.as_str());
    }

    let mut visited = BTreeSet::new();
    let mut queue = vec![program.initial_state.as_str()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        if let Some(next_states) = edges.get(state) {
            queue.extend(next_states.iter().filter(|next| !visited.contains(*next)));
        }
    }

    let unreachable: Vec<String> = program
        .states
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect();

    if !unreachable.is_empty() {
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

fn check_unused_halting_states(program: &Program) -> Result<(), AnalysisError> {
    let unused: Vec<String> = program
        .halting_states
        .iter()
        .filter(|state| {
            **state != program.initial_state
                && !program.transitions.iter().any(|t| &t.next_state == *state)
        })
        .cloned()
        .collect();

    if !unused.is_empty() {
        return Err(AnalysisError::UnusedHaltingStates(unused));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Transition};

    fn program(tape: &str) -> Program {
        Program::new(
            vec![
                Transition::new("q0", '0', '1', "q1", Direction::Right),
                Transition::new("q1", ' ', ' ', "halt", Direction::Stay),
            ],
            ["halt"],
            tape,
        )
    }

    #[test]
    fn test_valid_program() {
        assert!(analyze(&program(">0")).is_ok());
        assert!(lint(&program(">0")).is_empty());
    }

    #[test]
    fn test_invalid_tape_symbols() {
        let result = analyze(&program(">0x2x"));
        assert_eq!(
            result,
            Err(TuringMachineError::InvalidTapeSymbols(vec!['2', 'x']))
        );
    }

    #[test]
    fn test_empty_tape() {
        assert_eq!(analyze(&program("")), Err(TuringMachineError::EmptyInput));
    }

    #[test]
    fn test_head_position() {
        let mut p = program(">");
        assert!(analyze(&p).is_ok());

        p.head = 3;
        assert_eq!(
            analyze(&p),
            Err(TuringMachineError::PositionOutOfRange {
                position: 3,
                len: 1
            })
        );
    }

    #[test]
    fn test_invalid_start_state() {
        let mut p = program(">0");
        p.initial_state = "nowhere".to_string();
        assert_eq!(
            analyze(&p),
            Err(TuringMachineError::InvalidStartState("nowhere".to_string()))
        );

        // A halting start state is fine: the machine halts immediately.
        p.initial_state = "halt".to_string();
        assert!(analyze(&p).is_ok());
    }

    #[test]
    fn test_lint_reports_unreachable_and_unused_states() {
        let p = Program::new(
            vec![
                Transition::new("q0", '0', '0', "done", Direction::Stay),
                Transition::new("island", '1', '1', "island", Direction::Right),
            ],
            ["done", "never"],
            ">0",
        );

        let findings = lint(&p);
        assert!(findings.contains(&AnalysisError::UnreachableStates(vec!["island".into()])));
        assert!(findings.contains(&AnalysisError::UnusedHaltingStates(vec!["never".into()])));

        // Lints never fail the analysis.
        assert!(analyze(&p).is_ok());
    }
}
