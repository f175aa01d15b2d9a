//! This module provides the parser for machine configurations. Single transition lines are
//! matched with the `pest` grammar in `grammar.pest`; the surrounding line-oriented layout
//! (type tag, machine blocks, composite trailers) is walked by hand.
//!
//! Composite configurations are split into one [`Program`] per child in memory, so every child
//! can be built independently by the factory.

use crate::types::{
    Direction, MachineKind, Program, Transition, TuringMachineError, BLANK_SYMBOL, HEAD_MARKER,
    MAX_PROGRAM_SIZE,
};
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Derives a `PestParser` for the transition grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TransitionParser;

/// A parsed configuration: the machine kind plus one block per child machine.
///
/// Children are optional. A configuration that ends before all of its blocks were seen still
/// parses; building it reports the first missing child.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MachineConfig {
    Regular(Program),
    Composition {
        first: Option<Program>,
        second: Option<Program>,
    },
    Conditional {
        condition: Option<Program>,
        on_match: Option<Program>,
        otherwise: Option<Program>,
        branch_symbols: BTreeSet<char>,
    },
    Iteration {
        body: Option<Program>,
        post: Option<Program>,
        condition: char,
    },
}

impl MachineConfig {
    pub fn kind(&self) -> MachineKind {
        match self {
            MachineConfig::Regular(_) => MachineKind::Regular,
            MachineConfig::Composition { .. } => MachineKind::Composition,
            MachineConfig::Conditional { .. } => MachineKind::Conditional,
            MachineConfig::Iteration { .. } => MachineKind::Iteration,
        }
    }

    /// The block whose tape line holds the machine's input. Composites read their input from
    /// the last block, the one whose tape line closes the configuration.
    pub fn entry(&self) -> Option<&Program> {
        match self {
            MachineConfig::Regular(program) => Some(program),
            MachineConfig::Composition { second, .. } => second.as_ref(),
            MachineConfig::Conditional { otherwise, .. } => otherwise.as_ref(),
            MachineConfig::Iteration { post, .. } => post.as_ref(),
        }
    }

    fn entry_mut(&mut self) -> Option<&mut Program> {
        match self {
            MachineConfig::Regular(program) => Some(program),
            MachineConfig::Composition { second, .. } => second.as_mut(),
            MachineConfig::Conditional { otherwise, .. } => otherwise.as_mut(),
            MachineConfig::Iteration { post, .. } => post.as_mut(),
        }
    }

    /// Moves the input tape onto the block that runs first.
    ///
    /// Every other child starts from a handed-off tape, so its own tape line is replaced by a lone
    /// head marker and never checked against its alphabet. Nothing moves while the input block
    /// is missing.
    pub(crate) fn stage_input(&mut self) {
        let Some(input) = self.input().map(str::to_string) else {
            return;
        };

        let (first, later) = match self {
            MachineConfig::Regular(_) => return,
            MachineConfig::Composition { first, second } => (first.as_mut(), vec![second]),
            MachineConfig::Conditional {
                condition,
                on_match,
                otherwise,
                ..
            } => (condition.as_mut(), vec![on_match, otherwise]),
            MachineConfig::Iteration { body, post, .. } => (body.as_mut(), vec![post]),
        };

        for program in later.into_iter().flatten() {
            program.tape = HEAD_MARKER.to_string();
        }
        if let Some(first) = first {
            first.tape = input;
        }
    }

    /// Returns the input tape, if the block holding it is present.
    pub fn input(&self) -> Option<&str> {
        self.entry().map(|program| program.tape.as_str())
    }

    /// Replaces the input tape. The head goes back to its initial position.
    pub fn set_input(&mut self, tape: &str) {
        if let Some(program) = self.entry_mut() {
            program.tape = tape.to_string();
        }
    }

    /// All present blocks, in configuration order.
    pub fn programs(&self) -> Vec<&Program> {
        match self {
            MachineConfig::Regular(program) => vec![program],
            MachineConfig::Composition { first, second } => {
                [first, second].into_iter().flatten().collect()
            }
            MachineConfig::Conditional {
                condition,
                on_match,
                otherwise,
                ..
            } => [condition, on_match, otherwise].into_iter().flatten().collect(),
            MachineConfig::Iteration { body, post, .. } => {
                [body, post].into_iter().flatten().collect()
            }
        }
    }
}

/// Parses a complete configuration, starting with its type tag line.
///
/// # Errors
///
/// * `TuringMachineError::Configuration` if the input is empty, too large, or a block or trailer
///   is incomplete.
/// * `TuringMachineError::UnknownMachineType` if the tag is not one of the supported kinds.
pub fn parse(input: &str) -> Result<MachineConfig, TuringMachineError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(TuringMachineError::Configuration(format!(
            "Configuration is {} bytes, the limit is {MAX_PROGRAM_SIZE}",
            input.len()
        )));
    }

    let mut lines = Lines::new(input);
    let (_, tag) = lines
        .next_non_empty()
        .ok_or_else(|| TuringMachineError::Configuration("Missing machine type".into()))?;
    let kind: MachineKind = tag.trim().parse()?;
    debug!(%kind, "Parsing configuration");

    let mut config = match kind {
        MachineKind::Regular => MachineConfig::Regular(
            parse_block(&mut lines)?.ok_or(TuringMachineError::MissingMachine("first"))?,
        ),
        MachineKind::Composition => MachineConfig::Composition {
            first: parse_block(&mut lines)?,
            second: parse_block(&mut lines)?,
        },
        MachineKind::Conditional => MachineConfig::Conditional {
            condition: parse_block(&mut lines)?,
            on_match: parse_block(&mut lines)?,
            otherwise: parse_block(&mut lines)?,
            branch_symbols: parse_branch_symbols(&mut lines)?,
        },
        MachineKind::Iteration => MachineConfig::Iteration {
            body: parse_block(&mut lines)?,
            post: parse_block(&mut lines)?,
            condition: parse_condition(&mut lines),
        },
    };

    // Composites may end with a line overriding the input tape.
    if kind != MachineKind::Regular {
        if let Some((_, input)) = lines.next_non_empty() {
            config.set_input(input);
        }
    }

    Ok(config)
}

/// Parses a single machine block without a type tag: transitions, halting states, tape.
///
/// # Errors
///
/// * `TuringMachineError::MissingMachine` if the text holds no block at all.
/// * `TuringMachineError::Configuration` if the block has no tape line.
pub fn parse_program(input: &str) -> Result<Program, TuringMachineError> {
    parse_block(&mut Lines::new(input))?.ok_or(TuringMachineError::MissingMachine("first"))
}

/// Parses one transition line of the form `S{state}->S'{state'}D`.
///
/// # Errors
///
/// * `TuringMachineError::MalformedTransition` carrying the 1-based `line` number.
pub fn parse_transition(line: usize, content: &str) -> Result<Transition, TuringMachineError> {
    let malformed = |reason: String| TuringMachineError::MalformedTransition {
        line,
        content: content.to_string(),
        reason,
    };

    let mut pairs = TransitionParser::parse(Rule::transition, content)
        .map_err(|e| malformed(e.variant.message().into_owned()))?;
    let mut parts = pairs
        .next()
        .ok_or_else(|| malformed("empty match".into()))?
        .into_inner()
        .map(|pair| pair.as_str());

    let mut next = || parts.next().unwrap_or_default();
    let read = parse_symbol(next());
    let state = next();
    let write = parse_symbol(next());
    let next_state = next();
    let direction = next()
        .chars()
        .next()
        .ok_or_else(|| malformed("missing move code".into()))
        .and_then(|code| Direction::try_from(code).map_err(|e| malformed(e.to_string())))?;

    Ok(Transition::new(state, read, write, next_state, direction))
}

fn parse_symbol(input: &str) -> char {
    input.chars().next().unwrap_or(BLANK_SYMBOL)
}

/// Parses the next block, or returns `None` if only blank lines remain.
fn parse_block(lines: &mut Lines) -> Result<Option<Program>, TuringMachineError> {
    let mut transitions = Vec::new();
    let mut pending = None;

    // The transition section ends at the first non-empty line that does not parse. That line
    // belongs to the halting-state section.
    while let Some((number, line)) = lines.next_non_empty() {
        match parse_transition(number, line) {
            Ok(transition) => transitions.push(transition),
            Err(error) => {
                if line.contains("->") {
                    warn!(%error, "Transition section ended on a malformed line");
                }
                pending = Some((number, line));
                break;
            }
        }
    }

    if transitions.is_empty() && pending.is_none() {
        return Ok(None);
    }

    let mut halting_states = Vec::new();
    let mut next = pending.or_else(|| lines.next_non_empty());
    let tape = loop {
        let Some((_, line)) = next else {
            return Err(TuringMachineError::Configuration(format!(
                "Missing tape line after {} transitions",
                transitions.len()
            )));
        };

        if is_tape_line(line) {
            break line;
        }

        halting_states.push(line.trim());
        next = lines.next_non_empty();
    };

    Ok(Some(Program::new(transitions, halting_states, tape)))
}

/// Tape lines begin with the head marker or an uppercase letter.
fn is_tape_line(line: &str) -> bool {
    line.chars()
        .next()
        .is_some_and(|c| c == HEAD_MARKER || c.is_uppercase())
}

/// Reads the conditional trailer: a count line, then a line holding that many symbols.
fn parse_branch_symbols(lines: &mut Lines) -> Result<BTreeSet<char>, TuringMachineError> {
    let Some((number, line)) = lines.next_non_empty() else {
        return Ok(BTreeSet::new());
    };

    let count: usize = line.trim().parse().map_err(|_| {
        TuringMachineError::Configuration(format!(
            "Line {number}: expected a branch symbol count, found {line:?}"
        ))
    })?;
    if count == 0 {
        return Ok(BTreeSet::new());
    }

    let symbols: Vec<char> = lines
        .next()
        .map(|(_, line)| line.chars().take(count).collect())
        .unwrap_or_default();
    if symbols.len() < count {
        return Err(TuringMachineError::Configuration(format!(
            "Expected {count} branch symbols, found {}",
            symbols.len()
        )));
    }

    Ok(symbols.into_iter().collect())
}

/// Reads the iteration trailer. An empty or absent line stands for the blank symbol.
fn parse_condition(lines: &mut Lines) -> char {
    lines
        .next()
        .and_then(|(_, line)| line.chars().next())
        .unwrap_or(BLANK_SYMBOL)
}

/// Line cursor with 1-based line numbers. `str::lines` already drops a trailing `\r`.
struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> Lines<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.lines().enumerate(),
        }
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        self.inner.next().map(|(index, line)| (index + 1, line))
    }

    /// Skips lines holding only whitespace.
    fn next_non_empty(&mut self) -> Option<(usize, &'a str)> {
        std::iter::from_fn(|| self.next()).find(|(_, line)| !line.trim().is_empty())
    }
}
