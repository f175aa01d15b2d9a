//! Sequential composition: run one machine, then continue on its tape with another.

use crate::machine::RegularMachine;
use crate::types::{Status, TuringMachineError};
use std::io::Write;
use tracing::debug;

/// Runs `first` to termination, then `second` starting from `first`'s final tape and head
/// position. The handoff is unconditional.
#[derive(Debug, Clone)]
pub struct CompositionMachine {
    first: RegularMachine,
    second: RegularMachine,
    status: Status,
}

impl CompositionMachine {
    pub fn new(first: RegularMachine, second: RegularMachine) -> Self {
        Self {
            first,
            second,
            status: Status::Running,
        }
    }

    /// Assembles a composition from children that may not have been built.
    ///
    /// # Errors
    ///
    /// * `TuringMachineError::MissingMachine` naming the first absent child.
    pub fn from_children(
        first: Option<RegularMachine>,
        second: Option<RegularMachine>,
    ) -> Result<Self, TuringMachineError> {
        let first = first.ok_or(TuringMachineError::MissingMachine("first"))?;
        let second = second.ok_or(TuringMachineError::MissingMachine("second"))?;

        Ok(Self::new(first, second))
    }

    /// Runs both phases. A finished composition is not run again.
    pub fn execute(&mut self) -> Result<&Status, TuringMachineError> {
        if self.status.is_terminal() {
            return Ok(&self.status);
        }

        debug!(phase = "first", "Running composition");
        let first = self.first.execute().clone();

        self.first.hand_off(&mut self.second)?;

        debug!(
            phase = "second",
            position = self.second.position(),
            "Running composition"
        );
        let second = self.second.execute().clone();

        self.status = first.then(second);
        Ok(&self.status)
    }

    /// Runs the composition and writes the second machine's final tape to `out`.
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Status, TuringMachineError> {
        let status = self.execute()?.clone();
        self.second.write_tape(out)?;
        Ok(status)
    }

    pub fn first(&self) -> &RegularMachine {
        &self.first
    }

    pub fn second(&self) -> &RegularMachine {
        &self.second
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The machine whose tape is the composition's output.
    pub fn output(&self) -> &RegularMachine {
        &self.second
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Program, Transition};

    fn replace_a_with_b(tape: &str) -> RegularMachine {
        RegularMachine::new(Program::new(
            vec![
                Transition::new("s", 'a', 'B', "s", Direction::Right),
                Transition::new("s", ' ', ' ', "done", Direction::Stay),
            ],
            ["done"],
            tape,
        ))
        .unwrap()
    }

    fn append_two_bs() -> RegularMachine {
        RegularMachine::new(Program::new(
            vec![
                Transition::new("t", ' ', ' ', "u", Direction::Right),
                Transition::new("u", ' ', 'B', "v", Direction::Right),
                Transition::new("v", ' ', 'B', "end", Direction::Stay),
            ],
            ["end"],
            ">",
        ))
        .unwrap()
    }

    #[test]
    fn test_composition_runs_both_machines() {
        let mut machine = CompositionMachine::new(replace_a_with_b(">aaa"), append_two_bs());

        let mut out = Vec::new();
        let status = machine.run(&mut out).unwrap();

        assert_eq!(status, Status::Halted);
        assert_eq!(String::from_utf8(out).unwrap(), ">BBB BB");
    }

    #[test]
    fn test_second_machine_starts_where_first_stopped() {
        let mut machine = CompositionMachine::new(replace_a_with_b(">aa"), append_two_bs());
        machine.execute().unwrap();

        // The first machine stopped on the blank after the last 'a'
        assert_eq!(machine.first().tape().to_string(), ">BB ");
        assert_eq!(machine.first().position(), 3);
        assert_eq!(machine.second().tape().to_string(), ">BB BB");
        assert_eq!(machine.second().position(), 5);
    }

    #[test]
    fn test_handoff_matches_first_machine_exactly() {
        let mut first = replace_a_with_b(">a");
        first.execute();

        let mut second = append_two_bs();
        first.hand_off(&mut second).unwrap();

        assert_eq!(second.tape().to_string(), first.tape().to_string());
        assert_eq!(second.position(), first.position());
    }

    #[test]
    fn test_missing_child_is_a_configuration_error() {
        let result = CompositionMachine::from_children(Some(replace_a_with_b(">a")), None);
        assert_eq!(
            result.unwrap_err(),
            TuringMachineError::MissingMachine("second")
        );

        let result = CompositionMachine::from_children(None, Some(append_two_bs()));
        assert_eq!(
            result.unwrap_err(),
            TuringMachineError::MissingMachine("first")
        );
    }

    #[test]
    fn test_first_machine_error_is_reported_but_handoff_proceeds() {
        let mut first = replace_a_with_b(">a");
        // Handed-in tapes skip alphabet validation; 'z' has no rule.
        first.set_tape(">az").unwrap();
        first.set_position(1).unwrap();

        let mut machine = CompositionMachine::new(first, append_two_bs());
        let mut out = Vec::new();
        let status = machine.run(&mut out).unwrap();

        assert_eq!(
            status,
            Status::Errored(TuringMachineError::UndefinedTransition {
                state: "s".into(),
                symbol: 'z',
            })
        );
        // The second machine also ran into an undefined transition on 'z'
        assert_eq!(String::from_utf8(out).unwrap(), ">Bz");
        assert!(machine.second().status().error().is_some());
    }

    #[test]
    fn test_rerun_writes_same_output() {
        let mut machine = CompositionMachine::new(replace_a_with_b(">aaa"), append_two_bs());

        let mut first = Vec::new();
        machine.run(&mut first).unwrap();
        let mut second = Vec::new();
        machine.run(&mut second).unwrap();

        assert_eq!(first, second);
    }
}
