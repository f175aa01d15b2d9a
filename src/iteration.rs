//! Iteration: repeat a loop machine while it stops on a given symbol, running a post-loop machine
//! between passes.

use crate::machine::RegularMachine;
use crate::types::{Status, TuringMachineError};
use std::io::Write;
use tracing::{debug, warn};

/// Runs `body` from its initial state; while the symbol under its final head position equals
/// `condition`, hands the tape to `post`, runs it, hands the result back and starts another pass.
///
/// Every pass (of either machine) starts from that machine's initial state. The output is always
/// the tape of `body`, which holds the post-loop result after each handback.
#[derive(Debug, Clone)]
pub struct IterationMachine {
    body: RegularMachine,
    post: RegularMachine,
    condition: char,
    max_passes: Option<usize>,
    passes: usize,
    post_passes: usize,
    status: Status,
}

impl IterationMachine {
    pub fn new(body: RegularMachine, post: RegularMachine, condition: char) -> Self {
        Self {
            body,
            post,
            condition,
            max_passes: None,
            passes: 0,
            post_passes: 0,
            status: Status::Running,
        }
    }

    /// Caps the number of loop-machine passes. `None` leaves the loop unbounded.
    pub fn with_max_passes(mut self, max_passes: Option<usize>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// Assembles an iteration machine from children that may not have been built.
    ///
    /// # Errors
    ///
    /// * `TuringMachineError::MissingMachine` naming the first absent child.
    pub fn from_children(
        body: Option<RegularMachine>,
        post: Option<RegularMachine>,
        condition: char,
    ) -> Result<Self, TuringMachineError> {
        let body = body.ok_or(TuringMachineError::MissingMachine("loop"))?;
        let post = post.ok_or(TuringMachineError::MissingMachine("post-loop"))?;

        Ok(Self::new(body, post, condition))
    }

    /// Runs passes until the loop machine stops on a symbol other than the condition, errors, or
    /// the pass limit is used up. A finished machine is not run again.
    pub fn execute(&mut self) -> Result<&Status, TuringMachineError> {
        if self.status.is_terminal() {
            return Ok(&self.status);
        }

        // First error raised by a post-loop pass; the loop keeps going after one.
        let mut post_error = Status::Running;

        let body = loop {
            if let Some(max_passes) = self.max_passes {
                if self.passes >= max_passes {
                    warn!(passes = self.passes, "Loop pass limit reached");
                    break Status::Errored(TuringMachineError::PassLimitExceeded(max_passes));
                }
            }

            rearm(&mut self.body);
            self.passes += 1;
            let status = self.body.execute().clone();
            if status.error().is_some() {
                break status;
            }

            let symbol = self.body.symbol();
            if symbol != self.condition {
                debug!(passes = self.passes, ?symbol, "Loop condition no longer holds");
                break status;
            }

            self.body.hand_off(&mut self.post)?;
            rearm(&mut self.post);
            self.post_passes += 1;
            let status = self.post.execute().clone();
            if post_error.error().is_none() && status.error().is_some() {
                post_error = status;
            }
            self.post.hand_off(&mut self.body)?;
        };

        self.status = post_error.then(body);
        Ok(&self.status)
    }

    /// Runs the machine and writes the loop machine's final tape to `out`.
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Status, TuringMachineError> {
        let status = self.execute()?.clone();
        self.body.write_tape(out)?;
        Ok(status)
    }

    /// The symbol that keeps the loop going.
    pub fn condition(&self) -> char {
        self.condition
    }

    /// Number of times the loop machine has run.
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// Number of times the post-loop machine has run.
    pub fn post_passes(&self) -> usize {
        self.post_passes
    }

    pub fn max_passes(&self) -> Option<usize> {
        self.max_passes
    }

    pub fn body(&self) -> &RegularMachine {
        &self.body
    }

    pub fn post(&self) -> &RegularMachine {
        &self.post
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn output(&self) -> &RegularMachine {
        &self.body
    }
}

fn rearm(machine: &mut RegularMachine) {
    let initial_state = machine.initial_state().to_string();
    machine.set_current_state(&initial_state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, Program, Transition};

    /// Skips '0' and '1', turns the first 'c' into '0' and stops just after it.
    fn zero_next_c(tape: &str) -> RegularMachine {
        RegularMachine::new(Program::new(
            vec![
                Transition::new("q0", '0', '0', "q0", Direction::Right),
                Transition::new("q0", '1', '1', "q0", Direction::Right),
                Transition::new("q0", 'c', '0', "done", Direction::Right),
            ],
            ["done"],
            tape,
        ))
        .unwrap()
    }

    fn one_for_c() -> RegularMachine {
        RegularMachine::new(Program::new(
            vec![Transition::new("p0", 'c', '1', "end", Direction::Right)],
            ["end"],
            ">",
        ))
        .unwrap()
    }

    fn run(machine: &mut IterationMachine) -> (Status, String) {
        let mut out = Vec::new();
        let status = machine.run(&mut out).unwrap();
        (status, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_loop_alternates_until_condition_fails() {
        let mut machine = IterationMachine::new(zero_next_c(">ccccc"), one_for_c(), 'c');

        let (status, output) = run(&mut machine);
        assert_eq!(status, Status::Halted);
        assert_eq!(output, ">01010 ");
        assert_eq!(machine.passes(), 3);
        assert_eq!(machine.post_passes(), 2);
    }

    #[test]
    fn test_single_pass_when_condition_never_holds() {
        let mut machine = IterationMachine::new(zero_next_c(">c"), one_for_c(), 'c');

        let (status, output) = run(&mut machine);
        assert_eq!(status, Status::Halted);
        assert_eq!(output, ">0 ");
        assert_eq!(machine.passes(), 1);
        assert_eq!(machine.post_passes(), 0);
        assert_eq!(machine.post().status(), &Status::Running);
    }

    #[test]
    fn test_loop_machine_error_stops_iteration() {
        let mut machine = IterationMachine::new(zero_next_c("> c"), one_for_c(), 'c');

        let (status, output) = run(&mut machine);
        assert_eq!(
            status,
            Status::Errored(TuringMachineError::UndefinedTransition {
                state: "q0".into(),
                symbol: ' ',
            })
        );
        assert_eq!(output, "> c");
        assert_eq!(machine.passes(), 1);
        assert_eq!(machine.post_passes(), 0);
    }

    #[test]
    fn test_post_loop_error_is_reported_but_loop_continues() {
        let post = RegularMachine::new(Program::new(
            vec![Transition::new("p0", 'x', '1', "end", Direction::Right)],
            ["end"],
            ">",
        ))
        .unwrap();
        let mut machine = IterationMachine::new(zero_next_c(">cc"), post, 'c');

        let (status, output) = run(&mut machine);
        assert_eq!(
            status,
            Status::Errored(TuringMachineError::UndefinedTransition {
                state: "p0".into(),
                symbol: 'c',
            })
        );
        assert_eq!(output, ">00 ");
        assert_eq!(machine.passes(), 2);
        assert_eq!(machine.post_passes(), 1);
    }

    #[test]
    fn test_pass_limit() {
        let mut machine =
            IterationMachine::new(zero_next_c(">ccccc"), one_for_c(), 'c').with_max_passes(Some(2));

        let (status, output) = run(&mut machine);
        assert_eq!(
            status,
            Status::Errored(TuringMachineError::PassLimitExceeded(2))
        );
        assert_eq!(output, ">0101c");
        assert_eq!(machine.passes(), 2);
    }

    #[test]
    fn test_rerun_is_a_no_op() {
        let mut machine = IterationMachine::new(zero_next_c(">ccc"), one_for_c(), 'c');
        let (_, first) = run(&mut machine);
        let (_, second) = run(&mut machine);

        assert_eq!(first, second);
        assert_eq!(machine.passes(), 2);
    }

    #[test]
    fn test_missing_post_loop_machine() {
        let result = IterationMachine::from_children(Some(zero_next_c(">c")), None, 'c');
        assert_eq!(
            result.unwrap_err(),
            TuringMachineError::MissingMachine("post-loop")
        );
    }
}
