//! Graphviz rendering of a tape: one record node per cell, chained left to right, with the cell
//! under the head filled.

use crate::tape::Tape;
use crate::types::{TuringMachineError, BLANK_SYMBOL};
use std::fmt::Write as _;
use std::io::Write;

/// Shown in place of the blank symbol, which would otherwise render as an empty box.
const BLANK_LABEL: char = '␣';

/// Renders `tape` as a DOT `digraph`.
pub fn render_dot(tape: &Tape) -> String {
    let mut dot = String::from("digraph G {\n    rankdir=LR;\n    node [shape=record];\n");

    for (index, symbol) in tape.cells().iter().enumerate() {
        let style = if index == tape.position() {
            ", style=filled, fillcolor=lightgrey"
        } else {
            ""
        };
        // Writing into a String cannot fail.
        let _ = writeln!(
            dot,
            "    node{index} [label=\"<f0> {}\"{style}];",
            escape(*symbol)
        );
        if index > 0 {
            let _ = writeln!(dot, "    node{} -> node{index};", index - 1);
        }
    }

    dot.push_str("}\n");
    dot
}

/// Writes the DOT rendering of `tape` to `out`.
pub fn write_dot<W: Write + ?Sized>(tape: &Tape, out: &mut W) -> Result<(), TuringMachineError> {
    out.write_all(render_dot(tape).as_bytes())
        .and_then(|_| out.flush())
        .map_err(|e| TuringMachineError::OutputError(e.to_string()))
}

/// Escapes characters that carry meaning inside record labels.
fn escape(symbol: char) -> String {
    match symbol {
        BLANK_SYMBOL => BLANK_LABEL.to_string(),
        '{' | '}' | '|' | '<' | '>' | '"' | '\\' => format!("\\{symbol}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_dot() {
        let mut tape = Tape::new(">a ").unwrap();
        tape.set_position(1).unwrap();

        let dot = render_dot(&tape);
        assert_eq!(
            dot,
            "digraph G {\n    rankdir=LR;\n    node [shape=record];\n\
             \x20   node0 [label=\"<f0> \\>\"];\n\
             \x20   node1 [label=\"<f0> a\", style=filled, fillcolor=lightgrey];\n\
             \x20   node0 -> node1;\n\
             \x20   node2 [label=\"<f0> ␣\"];\n\
             \x20   node1 -> node2;\n\
             }\n"
        );
    }

    #[test]
    fn test_single_cell_has_no_edges() {
        let tape = Tape::new("x").unwrap();
        let dot = render_dot(&tape);

        assert!(dot.contains("node0 [label=\"<f0> x\", style=filled"));
        assert!(!dot.contains("->"));
    }

    #[test]
    fn test_write_dot() {
        let tape = Tape::new(">1").unwrap();
        let mut out = Vec::new();
        write_dot(&tape, &mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), render_dot(&tape));
    }
}
