use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum RomError {
    #[error("Error on line {line_number}: {message}")]
    Parse { line_number: usize, message: String },

    #[error(
        "Error on line {line_number}: Opcode {opcode:02X} already started a sequence on line {first_line}"
    )]
    DuplicateOpcode {
        line_number: usize,
        opcode: u8,
        first_line: usize,
    },

    #[error("Program has {steps} microcode steps, but the state table only holds {capacity}")]
    Capacity { steps: usize, capacity: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RomError {
    pub(crate) fn parse(line_number: usize, message: &str) -> Self {
        RomError::Parse {
            line_number,
            message: message.to_string(),
        }
    }
}
