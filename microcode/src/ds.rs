/// Bytes addressable by each ROM (8-bit address bus)
pub(crate) const ROM_SIZE: usize = 256;

/// Two-byte entries that fit in the state and control ROMs
pub(crate) const PAIR_ENTRIES: usize = ROM_SIZE / 2;

/// Number of steps in the fetch microprogram that opens every program.
/// Its last step hands control to the opcode table.
pub(crate) const FETCH_SEQUENCE_LENGTH: usize = 3;

/// Next-state value telling the sequencer to dispatch through the opcode table
pub(crate) const FETCH_COMPLETE: u8 = 0xFF;

/// Address of the two-byte entry at `position` in the state or control table
pub(crate) fn entry_address(position: usize) -> u8 {
    (position * 2) as u8
}

/// The two control-signal bytes driven during one microcode step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct ControlPair {
    pub(crate) control1: u8,
    pub(crate) control2: u8,
}

impl ControlPair {
    pub(crate) fn new(control1: u8, control2: u8) -> Self {
        ControlPair { control1, control2 }
    }
}

/// One row of the microcode table
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MicrocodeStep {
    pub(crate) position: usize,
    pub(crate) line_number: usize,
    /// Set only on the row that starts an opcode's sequence
    pub(crate) opcode: Option<u8>,
    /// Opcode whose sequence this row belongs to; `None` before the first opcode row
    pub(crate) owner: Option<u8>,
    pub(crate) control: ControlPair,
}

/// Parsed steps in execution order
#[derive(Debug, Default)]
pub(crate) struct MicrocodeProgram {
    pub(crate) steps: Vec<MicrocodeStep>,
}

impl MicrocodeProgram {
    pub(crate) fn control_pairs(&self) -> impl Iterator<Item = ControlPair> + '_ {
        self.steps.iter().map(|step| step.control)
    }

    pub(crate) fn owners(&self) -> impl Iterator<Item = Option<u8>> + '_ {
        self.steps.iter().map(|step| step.owner)
    }
}

/// Where the sequencer goes after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum NextState {
    /// Following step of the same opcode's sequence
    Continue(u8),
    /// End of the fetch microprogram
    FetchComplete,
    /// Back to the start of the dispatch cycle
    Dispatch,
}

impl NextState {
    pub(crate) fn address(self) -> u8 {
        match self {
            NextState::Continue(address) => address,
            NextState::FetchComplete => FETCH_COMPLETE,
            NextState::Dispatch => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct StateEntry {
    pub(crate) control_address: u8,
    pub(crate) next: NextState,
}

/// Opcode byte to address of its first state table entry
#[derive(Debug)]
pub(crate) struct OpcodeTable {
    pub(crate) entries: [Option<u8>; ROM_SIZE],
}

impl Default for OpcodeTable {
    fn default() -> Self {
        OpcodeTable {
            entries: [None; ROM_SIZE],
        }
    }
}

impl OpcodeTable {
    /// Unset opcodes dispatch to address 0.
    pub(crate) fn padded(&self) -> [u8; ROM_SIZE] {
        self.entries.map(|entry| entry.unwrap_or(0))
    }
}

/// Unique control pairs in first-occurrence order; pair `i` lives at address `2 * i`
#[derive(Debug, Default)]
pub(crate) struct ControlSignalTable {
    pub(crate) pairs: Vec<ControlPair>,
}

impl ControlSignalTable {
    pub(crate) fn padded(&self) -> [u8; ROM_SIZE] {
        let mut rom = [0u8; ROM_SIZE];
        for (i, pair) in self.pairs.iter().take(PAIR_ENTRIES).enumerate() {
            rom[i * 2] = pair.control1;
            rom[i * 2 + 1] = pair.control2;
        }
        rom
    }
}

#[derive(Debug, Default)]
pub(crate) struct StateTable {
    pub(crate) entries: Vec<StateEntry>,
}

impl StateTable {
    pub(crate) fn padded(&self) -> [u8; ROM_SIZE] {
        let mut rom = [0u8; ROM_SIZE];
        for (i, entry) in self.entries.iter().take(PAIR_ENTRIES).enumerate() {
            rom[i * 2] = entry.control_address;
            rom[i * 2 + 1] = entry.next.address();
        }
        rom
    }
}

/// The three ROM images produced from one program
#[derive(Debug, Default)]
pub(crate) struct RomSet {
    pub(crate) opcodes: OpcodeTable,
    pub(crate) states: StateTable,
    pub(crate) controls: ControlSignalTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_state_addresses() {
        assert_eq!(NextState::Continue(0x12).address(), 0x12);
        assert_eq!(NextState::FetchComplete.address(), 0xFF);
        assert_eq!(NextState::Dispatch.address(), 0);
    }

    #[test]
    fn test_empty_tables_pad_to_zero() {
        let roms = RomSet::default();
        assert_eq!(roms.opcodes.padded(), [0u8; ROM_SIZE]);
        assert_eq!(roms.states.padded(), [0u8; ROM_SIZE]);
        assert_eq!(roms.controls.padded(), [0u8; ROM_SIZE]);
    }

    #[test]
    fn test_control_table_layout() {
        let table = ControlSignalTable {
            pairs: vec![ControlPair::new(0xA0, 0x01), ControlPair::new(0xB0, 0x02)],
        };
        let rom = table.padded();
        assert_eq!(&rom[..4], &[0xA0, 0x01, 0xB0, 0x02]);
        assert!(rom[4..].iter().all(|&b| b == 0));
    }
}
