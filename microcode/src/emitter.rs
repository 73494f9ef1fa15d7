use crate::ds::{RomSet, PAIR_ENTRIES, ROM_SIZE};
use std::io::{self, Write};

const BYTES_PER_ROW: usize = 8;

/// Writes the opcode, state and control ROMs as VHDL `x"NN"` array literals.
pub(crate) fn emit<W: Write>(roms: &RomSet, out: &mut W) -> io::Result<()> {
    log::debug!(
        "padding state table with {} entries, control table with {}",
        PAIR_ENTRIES.saturating_sub(roms.states.entries.len()),
        PAIR_ENTRIES.saturating_sub(roms.controls.pairs.len())
    );

    write_rom(out, &roms.opcodes.padded())?;
    writeln!(out)?;
    write_rom(out, &roms.states.padded())?;
    writeln!(out)?;
    write_rom(out, &roms.controls.padded())?;
    out.flush()
}

fn write_rom<W: Write>(out: &mut W, rom: &[u8; ROM_SIZE]) -> io::Result<()> {
    for (row, bytes) in rom.chunks(BYTES_PER_ROW).enumerate() {
        for byte in bytes {
            write!(out, "x\"{:02X}\", ", byte)?;
        }
        writeln!(out, "-- {:02X}H", row * BYTES_PER_ROW)?;
    }
    Ok(())
}
