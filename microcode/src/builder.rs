use crate::{
    ds::{
        entry_address, ControlPair, ControlSignalTable, MicrocodeProgram, NextState,
        OpcodeTable, RomSet, StateEntry, StateTable, FETCH_SEQUENCE_LENGTH, PAIR_ENTRIES,
    },
    error::RomError,
};
use std::collections::HashMap;

/// Builds the opcode, state and control ROMs for a parsed program.
pub(crate) fn build(program: &MicrocodeProgram) -> Result<RomSet, RomError> {
    let steps = &program.steps;
    if steps.len() > PAIR_ENTRIES {
        return Err(RomError::Capacity {
            steps: steps.len(),
            capacity: PAIR_ENTRIES,
        });
    }

    let mut interner = ControlInterner::default();
    let control_addresses: Vec<u8> = program
        .control_pairs()
        .map(|pair| interner.intern(pair))
        .collect();
    let owners: Vec<Option<u8>> = program.owners().collect();

    let mut opcodes = OpcodeTable::default();
    let mut states = StateTable::default();
    for step in steps {
        if let Some(opcode) = step.opcode {
            opcodes.entries[opcode as usize] = Some(entry_address(step.position));
        }
        let entry = StateEntry {
            control_address: control_addresses[step.position],
            next: next_state(&owners, step.position),
        };
        log::trace!(
            "line {} -> state {:02X}: control {:02X} next {:?}",
            step.line_number,
            entry_address(step.position),
            entry.control_address,
            entry.next
        );
        states.entries.push(entry);
    }

    let controls = interner.into_table();
    log::debug!(
        "{} steps, {} unique control pairs, {} opcodes",
        steps.len(),
        controls.pairs.len(),
        opcodes.entries.iter().flatten().count()
    );

    Ok(RomSet {
        opcodes,
        states,
        controls,
    })
}

/// `owners[i]` is the opcode owning step `i`.
fn next_state(owners: &[Option<u8>], position: usize) -> NextState {
    match owners.get(position + 1) {
        Some(following) if *following == owners[position] => {
            NextState::Continue(entry_address(position + 1))
        }
        _ if position == FETCH_SEQUENCE_LENGTH - 1 => NextState::FetchComplete,
        _ => NextState::Dispatch,
    }
}

/// Assigns each distinct control pair the next free address on first sight
#[derive(Default)]
struct ControlInterner {
    addresses: HashMap<ControlPair, u8>,
    table: ControlSignalTable,
}

impl ControlInterner {
    fn intern(&mut self, pair: ControlPair) -> u8 {
        if let Some(&address) = self.addresses.get(&pair) {
            return address;
        }
        let address = entry_address(self.table.pairs.len());
        self.table.pairs.push(pair);
        self.addresses.insert(pair, address);
        address
    }

    fn into_table(self) -> ControlSignalTable {
        self.table
    }
}
