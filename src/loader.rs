//! This module provides the `ConfigLoader` struct, responsible for reading machine
//! configurations from files or any other byte source.

use crate::factory::{MachineFactory, TuringMachine};
use crate::parser::{parse, MachineConfig};
use crate::types::{TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// `ConfigLoader` is a utility struct for loading machine configurations.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads a configuration from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(MachineConfig)` if the file is read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * Any parse error, see [`crate::parser::parse`].
    pub fn load_config(path: &Path) -> Result<MachineConfig, TuringMachineError> {
        let file = fs::File::open(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "Loading configuration");
        Self::load_config_from_reader(file)
    }

    /// Loads a configuration from any reader, refusing input beyond `MAX_PROGRAM_SIZE` bytes.
    pub fn load_config_from_reader<R: Read>(reader: R) -> Result<MachineConfig, TuringMachineError> {
        let mut bytes = Vec::new();
        reader
            .take(MAX_PROGRAM_SIZE as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| TuringMachineError::FileError(format!("Failed to read input: {e}")))?;

        // The cut may fall inside a multi-byte character, so the size is checked before decoding
        if bytes.len() > MAX_PROGRAM_SIZE {
            return Err(TuringMachineError::Configuration(format!(
                "Configuration exceeds the limit of {MAX_PROGRAM_SIZE} bytes"
            )));
        }

        let content = String::from_utf8(bytes)
            .map_err(|e| TuringMachineError::FileError(format!("Input is not valid UTF-8: {e}")))?;
        parse(&content)
    }

    /// Loads a configuration from the provided string content.
    pub fn load_config_from_string(content: &str) -> Result<MachineConfig, TuringMachineError> {
        parse(content)
    }

    /// Loads a configuration file and builds its machine with `factory`.
    pub fn load_machine(
        path: &Path,
        factory: &MachineFactory,
    ) -> Result<TuringMachine, TuringMachineError> {
        factory.build(Self::load_config(path)?)
    }
}
