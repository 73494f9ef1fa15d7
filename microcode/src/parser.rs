use crate::{
    ds::{ControlPair, MicrocodeProgram, MicrocodeStep},
    error::RomError,
};
use std::collections::HashMap;
use std::io::BufRead;

#[derive(Debug)]
pub(crate) struct ParserState {
    line_number: usize,
    current_owner: Option<u8>,
    opcode_lines: HashMap<u8, usize>,
    steps: Vec<MicrocodeStep>,
}

impl ParserState {
    pub(crate) fn new() -> Self {
        ParserState {
            line_number: 0,
            current_owner: None,
            opcode_lines: HashMap::new(),
            steps: Vec::new(),
        }
    }

    /// Helper method to create a parse error with the current line number
    fn parse_error(&self, message: &str) -> RomError {
        RomError::parse(self.line_number, message)
    }

    pub(crate) fn into_program(self) -> MicrocodeProgram {
        MicrocodeProgram { steps: self.steps }
    }
}

impl ParserState {
    pub(crate) fn parse<R: BufRead>(&mut self, reader: R) -> Result<(), RomError> {
        for line in reader.lines() {
            self.line_number += 1;
            let line =
                line.map_err(|e| self.parse_error(&format!("Failed to read line: {}", e)))?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            self.parse_row(line)?;
        }
        Ok(())
    }

    fn parse_row(&mut self, line: &str) -> Result<(), RomError> {
        // Runs of tabs separate fields; only a leading tab leaves an empty opcode field.
        // A whitespace-only field still counts as a field.
        let mut fields = line.split('\t');
        let opcode_field = fields.next().unwrap_or_default().trim();
        let rest: Vec<&str> = fields.filter(|f| !f.is_empty()).map(str::trim).collect();
        if rest.len() != 2 {
            return Err(self.parse_error(&format!(
                "Expected 3 tab-separated fields (opcode, control1, control2), found {}",
                rest.len() + 1
            )));
        }

        let opcode = if opcode_field.is_empty() {
            None
        } else {
            let opcode = self.parse_hex_byte(opcode_field, "opcode")?;
            if let Some(&first_line) = self.opcode_lines.get(&opcode) {
                return Err(RomError::DuplicateOpcode {
                    line_number: self.line_number,
                    opcode,
                    first_line,
                });
            }
            self.opcode_lines.insert(opcode, self.line_number);
            self.current_owner = Some(opcode);
            Some(opcode)
        };

        let control = ControlPair::new(
            self.parse_hex_byte(rest[0], "control1")?,
            self.parse_hex_byte(rest[1], "control2")?,
        );

        let step = MicrocodeStep {
            position: self.steps.len(),
            line_number: self.line_number,
            opcode,
            owner: self.current_owner,
            control,
        };
        log::trace!(
            "step {}: owner {:?} control {:02X}{:02X}",
            step.position,
            step.owner,
            control.control1,
            control.control2
        );
        self.steps.push(step);
        Ok(())
    }

    fn parse_hex_byte(&self, field: &str, what: &str) -> Result<u8, RomError> {
        if field.is_empty() || !field.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(self.parse_error(&format!(
                "Invalid {} '{}', expected hex digits",
                what, field
            )));
        }
        u8::from_str_radix(field, 16).map_err(|_| {
            self.parse_error(&format!("Invalid {} '{}', value exceeds FF", what, field))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Helper function to create a ParserState and parse the given input
    fn parse_input(input: &str) -> Result<MicrocodeProgram, RomError> {
        let mut parser = ParserState::new();
        parser.parse(Cursor::new(input))?;
        Ok(parser.into_program())
    }

    #[test]
    fn test_opcode_rows_and_continuations() {
        let input = "05\tA\t1\n\tB\t2\n06\tA\t1\n";
        let program = parse_input(input).expect("Parsing failed");

        assert_eq!(program.steps.len(), 3);
        assert_eq!(
            program.owners().collect::<Vec<_>>(),
            vec![Some(0x05), Some(0x05), Some(0x06)]
        );
        assert_eq!(
            program.control_pairs().collect::<Vec<_>>(),
            vec![
                ControlPair::new(0x0A, 0x01),
                ControlPair::new(0x0B, 0x02),
                ControlPair::new(0x0A, 0x01),
            ]
        );
        assert_eq!(program.steps[0].opcode, Some(0x05));
        assert_eq!(program.steps[1].opcode, None);
        assert_eq!(program.steps[2].position, 2);
    }

    #[test]
    fn test_leading_continuations_have_no_owner() {
        let input = "\t80\t00\n\t40\t00\n\t20\t01\n3C\t00\t10\n";
        let program = parse_input(input).expect("Parsing failed");
        assert_eq!(
            program.owners().collect::<Vec<_>>(),
            vec![None, None, None, Some(0x3C)]
        );
    }

    #[test]
    fn test_tab_runs_crlf_and_blank_lines() {
        let input = "0f\t\t\tfe\t\t01\r\n\r\n   \n\t\t7F\t80\r\n";
        let program = parse_input(input).expect("Parsing failed");
        assert_eq!(program.steps.len(), 2);
        assert_eq!(program.steps[0].control, ControlPair::new(0xFE, 0x01));
        assert_eq!(program.steps[1].owner, Some(0x0F));
        assert_eq!(program.steps[1].control, ControlPair::new(0x7F, 0x80));
        assert_eq!(program.steps[1].line_number, 4);
    }

    #[test]
    fn test_error_wrong_field_count() {
        let err = parse_input("05\tA\t1\n\tB\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error on line 2: Expected 3 tab-separated fields (opcode, control1, control2), found 2"
        );
    }

    #[test]
    fn test_error_too_many_fields() {
        let err = parse_input("05\tA\t1\t2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error on line 1: Expected 3 tab-separated fields (opcode, control1, control2), found 4"
        );
    }

    #[test]
    fn test_error_non_hex_opcode() {
        let err = parse_input("\tA\t1\nZZ\tA\t1\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error on line 2: Invalid opcode 'ZZ', expected hex digits"
        );
    }

    #[test]
    fn test_error_control_too_wide() {
        let err = parse_input("05\t1FF\t1\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error on line 1: Invalid control1 '1FF', value exceeds FF"
        );
    }

    #[test]
    fn test_error_signed_control_rejected() {
        let err = parse_input("05\tA\t+1\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error on line 1: Invalid control2 '+1', expected hex digits"
        );
    }

    #[test]
    fn test_error_blank_field_between_tabs() {
        let err = parse_input("05\t \tA\t1\n").unwrap_err();
        assert!(matches!(err, RomError::Parse { line_number: 1, .. }));
        assert_eq!(
            err.to_string(),
            "Error on line 1: Expected 3 tab-separated fields (opcode, control1, control2), found 4"
        );
    }

    #[test]
    fn test_error_blank_control_field() {
        let err = parse_input("05\t \t1\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error on line 1: Invalid control1 '', expected hex digits"
        );
    }

    #[test]
    fn test_zero_padded_fields() {
        let program = parse_input("005\t00A\t0001\n").expect("Parsing failed");
        assert_eq!(program.steps[0].opcode, Some(0x05));
        assert_eq!(program.steps[0].control, ControlPair::new(0x0A, 0x01));
    }

    #[test]
    fn test_error_duplicate_opcode() {
        let err = parse_input("05\tA\t1\n\tB\t2\n5\tC\t3\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error on line 3: Opcode 05 already started a sequence on line 1"
        );
    }
}
