//! SNA snapshot loader.
//!
//! **48K format** (49,179 bytes): 27-byte header + 49,152 bytes of RAM from
//! $4000.
//!
//! **128K format** (131,103 bytes): 27-byte header + banks 5, 2 and the
//! paged bank + 4-byte extension (PC, port $7FFD, TR-DOS flag) + the
//! remaining five banks in ascending order. With bank 5 or 2 paged at $C000
//! that bank is stored twice and six banks follow (147,487 bytes).
//!
//! Only memory matters for a screenshot. CPU registers are skipped; the
//! machine is left showing Layer 0 with 16K bank `n` in 8K pages `2n` and
//! `2n + 1`, and the slots at $C000 mapping the paged bank.

use zxnext_hw::{DisplayMode, HardwarePort, NextMachine, nextreg};

use crate::error::LoadError;

const SNA_48K_SIZE: usize = 49_179;
const SNA_128K_SIZE: usize = 131_103;
const SNA_128K_DUP_SIZE: usize = SNA_128K_SIZE + BANK_SIZE;
const HEADER_SIZE: usize = 27;
const RAM_SIZE: usize = 49_152;
const BANK_SIZE: usize = 0x4000;

/// Which flavour of snapshot was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnaKind {
    Sna48K,
    Sna128K,
}

/// Load a SNA snapshot's RAM into `machine`.
pub fn load_sna(machine: &mut NextMachine, data: &[u8]) -> Result<SnaKind, LoadError> {
    let kind = match data.len() {
        SNA_48K_SIZE => {
            load_48k(machine, data);
            SnaKind::Sna48K
        }
        SNA_128K_SIZE | SNA_128K_DUP_SIZE => {
            load_128k(machine, data)?;
            SnaKind::Sna128K
        }
        n => {
            return Err(LoadError::Snapshot(format!(
                "SNA file must be {SNA_48K_SIZE} (48K), {SNA_128K_SIZE} or \
                 {SNA_128K_DUP_SIZE} (128K) bytes, got {n}"
            )));
        }
    };
    machine.set_display_mode(DisplayMode {
        layer: 0,
        submode: 0,
    });
    log::debug!("loaded {kind:?} snapshot");
    Ok(kind)
}

fn load_bank(machine: &mut NextMachine, bank: u8, data: &[u8]) {
    machine.load_page(bank * 2, data);
}

fn map_top_bank(machine: &mut NextMachine, bank: u8) {
    machine.write_nextreg(nextreg::MMU0 + 6, bank * 2);
    machine.write_nextreg(nextreg::MMU0 + 7, bank * 2 + 1);
}

fn load_48k(machine: &mut NextMachine, data: &[u8]) {
    let ram = &data[HEADER_SIZE..HEADER_SIZE + RAM_SIZE];
    // $4000, $8000, $C000 on a 48K machine are banks 5, 2, 0.
    for (chunk, bank) in ram.chunks(BANK_SIZE).zip([5u8, 2, 0]) {
        load_bank(machine, bank, chunk);
    }
    map_top_bank(machine, 0);
}

fn load_128k(machine: &mut NextMachine, data: &[u8]) -> Result<(), LoadError> {
    let ext_offset = HEADER_SIZE + RAM_SIZE;
    let port_7ffd = data[ext_offset + 2];
    let paged_bank = port_7ffd & 0x07;

    let expected = if matches!(paged_bank, 2 | 5) {
        SNA_128K_DUP_SIZE
    } else {
        SNA_128K_SIZE
    };
    if data.len() != expected {
        return Err(LoadError::Snapshot(format!(
            "128K SNA with bank {paged_bank} paged must be {expected} bytes, got {}",
            data.len()
        )));
    }

    let ram = &data[HEADER_SIZE..ext_offset];
    for (chunk, bank) in ram.chunks(BANK_SIZE).zip([5u8, 2, paged_bank]) {
        load_bank(machine, bank, chunk);
    }

    let rest = (0u8..8).filter(|&bank| bank != 5 && bank != 2 && bank != paged_bank);
    for (chunk, bank) in data[ext_offset + 4..].chunks(BANK_SIZE).zip(rest) {
        load_bank(machine, bank, chunk);
    }
    map_top_bank(machine, paged_bank);
    Ok(())
}
