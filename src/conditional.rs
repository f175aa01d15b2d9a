//! Conditional composition: run one machine, then pick its successor by the symbol it stopped on.

use crate::machine::RegularMachine;
use crate::types::{Status, TuringMachineError};
use std::collections::BTreeSet;
use std::io::Write;
use tracing::debug;

/// Which successor a conditional machine handed off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// The final symbol was one of the branch symbols.
    Matched,
    Otherwise,
}

/// Runs `condition`, then hands its tape to `on_match` when the symbol under the final head
/// position is a branch symbol, and to `otherwise` when it is not.
#[derive(Debug, Clone)]
pub struct ConditionalMachine {
    condition: RegularMachine,
    on_match: RegularMachine,
    otherwise: RegularMachine,
    branch_symbols: BTreeSet<char>,
    branch: Option<Branch>,
    status: Status,
}

impl ConditionalMachine {
    pub fn new(
        condition: RegularMachine,
        on_match: RegularMachine,
        otherwise: RegularMachine,
        branch_symbols: BTreeSet<char>,
    ) -> Self {
        Self {
            condition,
            on_match,
            otherwise,
            branch_symbols,
            branch: None,
            status: Status::Running,
        }
    }

    /// Assembles a conditional machine from children that may not have been built.
    ///
    /// # Errors
    ///
    /// * `TuringMachineError::MissingMachine` naming the first absent child.
    pub fn from_children(
        condition: Option<RegularMachine>,
        on_match: Option<RegularMachine>,
        otherwise: Option<RegularMachine>,
        branch_symbols: BTreeSet<char>,
    ) -> Result<Self, TuringMachineError> {
        Ok(Self::new(
            condition.ok_or(TuringMachineError::MissingMachine("first"))?,
            on_match.ok_or(TuringMachineError::MissingMachine("second"))?,
            otherwise.ok_or(TuringMachineError::MissingMachine("third"))?,
            branch_symbols,
        ))
    }

    /// Runs the condition machine and the chosen successor. A finished machine is not run again.
    pub fn execute(&mut self) -> Result<&Status, TuringMachineError> {
        if self.status.is_terminal() {
            return Ok(&self.status);
        }

        let first = self.condition.execute().clone();

        let symbol = self.condition.symbol();
        let branch = if self.branch_symbols.contains(&symbol) {
            Branch::Matched
        } else {
            Branch::Otherwise
        };
        debug!(?symbol, ?branch, "Selected branch");

        let next = match branch {
            Branch::Matched => &mut self.on_match,
            Branch::Otherwise => &mut self.otherwise,
        };
        self.condition.hand_off(next)?;
        let second = next.execute().clone();

        self.branch = Some(branch);
        self.status = first.then(second);
        Ok(&self.status)
    }

    /// Runs the machine and writes the chosen successor's final tape to `out`.
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<Status, TuringMachineError> {
        let status = self.execute()?.clone();
        self.output().write_tape(out)?;
        Ok(status)
    }

    /// The branch taken, once the machine has run.
    pub fn branch(&self) -> Option<Branch> {
        self.branch
    }

    pub fn branch_symbols(&self) -> &BTreeSet<char> {
        &self.branch_symbols
    }

    pub fn condition(&self) -> &RegularMachine {
        &self.condition
    }

    pub fn on_match(&self) -> &RegularMachine {
        &self.on_match
    }

    pub fn otherwise(&self) -> &RegularMachine {
        &self.otherwise
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// The machine whose tape is the output: the chosen successor, or the condition machine
    /// before anything ran.
    pub fn output(&self) -> &RegularMachine {
        match self.branch {
            Some(Branch::Matched) => &self.on_match,
            Some(Branch::Otherwise) => &self.otherwise,
            None => &self.condition,
        }
    }
}
