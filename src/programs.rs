use crate::parser::{parse, MachineConfig};
use crate::types::{MachineKind, TuringMachineError};
use serde::Serialize;
use tracing::warn;

// Embedded sample configurations, by name
const PROGRAM_TEXTS: [(&str, &str); 5] = [
    ("basic-regular", include_str!("../programs/basic-regular.tm")),
    (
        "binary-increment",
        include_str!("../programs/binary-increment.tm"),
    ),
    ("composition", include_str!("../programs/composition.tm")),
    ("conditional", include_str!("../programs/conditional.tm")),
    ("loop", include_str!("../programs/loop.tm")),
];

lazy_static::lazy_static! {
    /// Every embedded sample that parses, in declaration order. Parsed once on first use.
    pub static ref PROGRAMS: Vec<(&'static str, MachineConfig)> = PROGRAM_TEXTS
        .iter()
        .filter_map(|(name, text)| match parse(text) {
            Ok(config) => Some((*name, config)),
            Err(error) => {
                warn!(name, %error, "Failed to parse embedded program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        PROGRAMS.len()
    }

    /// List all program names
    pub fn list_program_names() -> Vec<&'static str> {
        PROGRAMS.iter().map(|(name, _)| *name).collect()
    }

    /// Get a parsed configuration by its name
    pub fn get_program_by_name(name: &str) -> Result<MachineConfig, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, config)| config.clone())
            .ok_or_else(|| TuringMachineError::Configuration(format!("Program '{name}' not found")))
    }

    /// Get the original text of a program by its name
    pub fn get_program_text(name: &str) -> Result<&'static str, TuringMachineError> {
        PROGRAM_TEXTS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, text)| *text)
            .ok_or_else(|| TuringMachineError::Configuration(format!("Program '{name}' not found")))
    }

    /// Get information about a program by its name
    pub fn get_program_info(name: &str) -> Result<ProgramInfo, TuringMachineError> {
        let config = Self::get_program_by_name(name)?;
        let programs = config.programs();

        Ok(ProgramInfo {
            name: name.to_string(),
            kind: config.kind(),
            machine_count: programs.len(),
            transition_count: programs.iter().map(|p| p.transitions.len()).sum(),
            initial_tape: config.input().unwrap_or_default().to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgramInfo {
    pub name: String,
    pub kind: MachineKind,
    pub machine_count: usize,
    pub transition_count: usize,
    pub initial_tape: String,
}
