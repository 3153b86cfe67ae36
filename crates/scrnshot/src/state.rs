//! JSON machine-state documents.
//!
//! Describes a Next mid-session well enough to screenshot it: the display
//! mode, register values, palettes and RAM contents.
//!
//! ```json
//! {
//!   "layer": 2,
//!   "submode": 0,
//!   "nextregs": { "0x12": 9, "0x43": 4 },
//!   "timex_port": 0,
//!   "palettes": [ { "select": 1, "start": 0, "colours": [0, 511] } ],
//!   "memory": [ { "page": 18, "path": "layer2.bin" } ]
//! }
//! ```
//!
//! Register keys are decimal or `0x` hex. Palette colours are 9-bit
//! `RRRGGGBBB`. Memory image paths are relative to the JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use zxnext_hw::{DisplayMode, NextMachine, Rgb9};

use crate::error::LoadError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineState {
    pub layer: u8,
    #[serde(default)]
    pub submode: u8,
    #[serde(default)]
    pub nextregs: BTreeMap<String, u8>,
    #[serde(default)]
    pub timex_port: u8,
    #[serde(default)]
    pub palettes: Vec<PaletteDump>,
    #[serde(default)]
    pub memory: Vec<MemoryImage>,
}

/// Consecutive entries of one palette.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PaletteDump {
    /// Palette number as selected by control bits 6-4.
    pub select: u8,
    #[serde(default)]
    pub start: u8,
    pub colours: Vec<u16>,
}

/// A raw RAM image loaded at an 8K page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryImage {
    pub page: u8,
    pub path: PathBuf,
}

impl MachineState {
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Apply to a machine. Memory image paths resolve against `base_dir`.
    pub fn apply(&self, machine: &mut NextMachine, base_dir: &Path) -> Result<(), LoadError> {
        for (key, &value) in &self.nextregs {
            machine.set_nextreg(parse_reg(key)?, value);
        }

        machine.set_timex_port(self.timex_port);

        for dump in &self.palettes {
            if dump.select > 7 {
                return Err(LoadError::State(format!("palette select {} out of range", dump.select)));
            }
            if usize::from(dump.start) + dump.colours.len() > 256 {
                return Err(LoadError::State(format!(
                    "palette {} overflows: {} colours from {}",
                    dump.select,
                    dump.colours.len(),
                    dump.start
                )));
            }
            for (index, &bits) in (dump.start..=u8::MAX).zip(&dump.colours) {
                if bits > 0x1FF {
                    return Err(LoadError::State(format!("colour {bits:#x} is not 9-bit")));
                }
                machine.set_palette_entry(dump.select, index, Rgb9::from_bits(bits));
            }
        }

        for image in &self.memory {
            let path = base_dir.join(&image.path);
            let data = fs::read(&path).map_err(|source| LoadError::Io {
                path: path.clone(),
                source,
            })?;
            log::debug!("{} bytes from {} at page {}", data.len(), path.display(), image.page);
            machine.load_page(image.page, &data);
        }

        machine.set_display_mode(DisplayMode {
            layer: self.layer,
            submode: self.submode,
        });
        Ok(())
    }
}

fn parse_reg(key: &str) -> Result<u8, LoadError> {
    let parsed = match key.strip_prefix("0x").or_else(|| key.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => key.parse(),
    };
    parsed.map_err(|_| LoadError::State(format!("bad register number {key:?}")))
}

/// Read a state file and build the machine it describes.
pub fn load_state(path: &Path) -> Result<NextMachine, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let state = MachineState::from_json(&text)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut machine = NextMachine::new();
    state.apply(&mut machine, base_dir)?;
    Ok(machine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zxnext_hw::{HardwarePort, nextreg};

    #[test]
    fn parse_minimal() {
        let s = MachineState::from_json(r#"{ "layer": 1, "submode": 2 }"#).expect("parse");
        assert_eq!(s.layer, 1);
        assert_eq!(s.submode, 2);
        assert!(s.memory.is_empty());
    }

    #[test]
    fn unknown_fields_rejected() {
        assert!(MachineState::from_json(r#"{ "layer": 0, "bogus": 1 }"#).is_err());
    }

    #[test]
    fn register_keys() {
        assert_eq!(parse_reg("0x12").expect("hex"), 0x12);
        assert_eq!(parse_reg("18").expect("dec"), 18);
        assert!(parse_reg("0x123").is_err());
        assert!(parse_reg("layer").is_err());
    }

    #[test]
    fn apply_sets_registers_and_palette() {
        let s = MachineState::from_json(
            r#"{
                "layer": 2,
                "nextregs": { "0x12": 9, "0x6A": 32 },
                "timex_port": 56,
                "palettes": [ { "select": 1, "start": 254, "colours": [511, 7] } ]
            }"#,
        )
        .expect("parse");
        let mut m = NextMachine::new();
        s.apply(&mut m, Path::new(".")).expect("apply");

        assert_eq!(m.read_nextreg(nextreg::LAYER2_ACTIVE_BANK), 9);
        assert_eq!(m.read_nextreg(nextreg::LORES_CONTROL), 32);
        assert_eq!(m.read_port(nextreg::TIMEX_PORT), 56);
        assert_eq!(m.palette_entry(1, 254), Rgb9 { red: 7, green: 7, blue: 7 });
        assert_eq!(m.palette_entry(1, 255), Rgb9 { red: 0, green: 0, blue: 7 });
        assert_eq!(m.display_mode(), Some(DisplayMode { layer: 2, submode: 0 }));
        assert!(m.nextreg_log().is_empty());
    }

    #[test]
    fn palette_overflow_rejected() {
        let s = MachineState {
            palettes: vec![PaletteDump {
                select: 0,
                start: 255,
                colours: vec![0, 0],
            }],
            ..MachineState::default()
        };
        let mut m = NextMachine::new();
        assert!(matches!(
            s.apply(&mut m, Path::new(".")),
            Err(LoadError::State(_))
        ));
    }

    #[test]
    fn ten_bit_colour_rejected() {
        let s = MachineState {
            palettes: vec![PaletteDump {
                select: 0,
                start: 0,
                colours: vec![0x200],
            }],
            ..MachineState::default()
        };
        let mut m = NextMachine::new();
        assert!(s.apply(&mut m, Path::new(".")).is_err());
    }

    #[test]
    fn load_state_reads_relative_memory() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("screen.bin"), [0xAB, 0xCD]).expect("write image");
        let json = dir.path().join("state.json");
        fs::write(
            &json,
            r#"{ "layer": 0, "memory": [ { "page": 10, "path": "screen.bin" } ] }"#,
        )
        .expect("write state");

        let m = load_state(&json).expect("load");
        assert_eq!(m.peek(0x4000), 0xAB);
        assert_eq!(m.peek(0x4001), 0xCD);
    }

    #[test]
    fn load_state_missing_image() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json = dir.path().join("state.json");
        fs::write(&json, r#"{ "layer": 0, "memory": [ { "page": 10, "path": "nope.bin" } ] }"#)
            .expect("write state");
        assert!(matches!(load_state(&json), Err(LoadError::Io { .. })));
    }
}
