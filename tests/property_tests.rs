//! Property-based tests for the tape and the regular machine.

use proptest::prelude::*;
use turing_compose::{Direction, MachineFactory, Status, Tape};

const BINARY_INCREMENT: &str = "REGULAR
0{right}->0{right}R
1{right}->1{right}R
 {right}-> {carry}L
1{carry}->0{carry}L
0{carry}->1{done}S
done
>0
";

fn run(config: &str, input: &str) -> (Status, String) {
    let mut config = turing_compose::parse(config).unwrap();
    config.set_input(input);

    let mut machine = MachineFactory::new().build(config).unwrap();
    let mut out = Vec::new();
    let status = machine.run(&mut out).unwrap();
    (status, String::from_utf8(out).unwrap())
}

prop_compose! {
    fn arbitrary_direction()(variant in 0..3u8) -> Direction {
        match variant {
            0 => Direction::Left,
            1 => Direction::Right,
            _ => Direction::Stay,
        }
    }
}

proptest! {
    #[test]
    fn tape_round_trips_through_string(content in "\\PC{1,40}") {
        let tape = Tape::new(&content).unwrap();
        prop_assert_eq!(tape.to_string(), content);
    }

    #[test]
    fn cursor_always_points_at_a_cell(
        content in "[a-z>]{1,10}",
        moves in prop::collection::vec(arbitrary_direction(), 0..50),
    ) {
        let mut tape = Tape::new(&content).unwrap();
        let initial_len = tape.len();

        for direction in moves {
            tape.shift(direction);
            prop_assert!(tape.position() < tape.len());
            let _ = tape.read();
        }

        // The tape only ever grows, and keeps its original prefix
        prop_assert!(tape.len() >= initial_len);
        prop_assert!(tape.to_string().starts_with(&content));
    }

    #[test]
    fn position_transfers_to_a_copy(
        content in "[01>]{1,10}",
        moves in prop::collection::vec(arbitrary_direction(), 0..30),
    ) {
        let mut source = Tape::new(&content).unwrap();
        for direction in moves {
            source.shift(direction);
        }

        let mut copy = Tape::new(&source.to_string()).unwrap();
        copy.set_position(source.position()).unwrap();
        prop_assert_eq!(copy, source);
    }

    #[test]
    fn binary_increment_adds_one(n in 0u32..4096) {
        // A leading zero leaves room for the carry.
        let bits = format!("0{n:b}");
        let (status, output) = run(BINARY_INCREMENT, &format!(">{bits}"));

        prop_assert_eq!(status, Status::Halted);
        prop_assert_eq!(output, format!(">{:0width$b} ", n + 1, width = bits.len()));
    }

    #[test]
    fn runs_are_deterministic(bits in "[01]{0,16}") {
        let input = format!(">{bits}");
        prop_assert_eq!(run(BINARY_INCREMENT, &input), run(BINARY_INCREMENT, &input));
    }
}
