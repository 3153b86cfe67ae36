//! `scrnshot` binary.
//!
//! Captures the display of a Next machine loaded from a SNA snapshot or a
//! JSON state document (a power-on machine if neither is given) and writes
//! it as a BMP.

use std::path::PathBuf;
use std::process;

use scrnshot::error::EXIT_INVALID_ARGUMENT;
use scrnshot::{CaptureConfig, HostFs, LoadError, capture, error_text, load_sna, load_state};
use zxnext_hw::NextMachine;

// ---------------------------------------------------------------------------
// CLI argument parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Shot,
    Help,
    Info,
}

#[derive(Debug)]
struct CliArgs {
    action: Action,
    target: Option<PathBuf>,
    force: bool,
    quiet: bool,
    sna_path: Option<PathBuf>,
    state_path: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        action: Action::Shot,
        target: None,
        force: false,
        quiet: false,
        sna_path: None,
        state_path: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "-H" => cli.action = Action::Help,
            "-v" => cli.action = Action::Info,
            "-q" => cli.quiet = true,
            "-f" => cli.force = true,
            "--sna" => {
                i += 1;
                let path = args.get(i).ok_or("--sna needs a file")?;
                cli.sna_path = Some(PathBuf::from(path));
            }
            "--state" => {
                i += 1;
                let path = args.get(i).ok_or("--state needs a file")?;
                cli.state_path = Some(PathBuf::from(path));
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}"));
            }
            file => cli.target = Some(PathBuf::from(file)),
        }
        i += 1;
    }

    if cli.sna_path.is_some() && cli.state_path.is_some() {
        return Err("--sna and --state cannot be combined".to_string());
    }
    Ok(cli)
}

fn print_help() {
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("SCRNSHOT file [-f][-q][-h][-v] [--sna <file> | --state <file>]");
    println!();
    println!(" file            pathname of file or directory");
    println!(" -f              force overwrite");
    println!(" -q              print no messages");
    println!(" -h              print this help");
    println!(" -v              print version info");
    println!(" --sna <file>    capture from a 48K/128K SNA snapshot");
    println!(" --state <file>  capture from a JSON machine state");
}

fn print_version() {
    println!("SCRNSHOT");
    println!(" Version {}", env!("CARGO_PKG_VERSION"));
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

fn load_machine(cli: &CliArgs) -> Result<NextMachine, LoadError> {
    if let Some(path) = &cli.state_path {
        return load_state(path);
    }
    let mut machine = NextMachine::new();
    if let Some(path) = &cli.sna_path {
        let data = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        load_sna(&mut machine, &data)?;
    }
    Ok(machine)
}

fn run(cli: &CliArgs) -> u8 {
    let mut machine = match load_machine(cli) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{e}");
            return e.code();
        }
    };

    let config = CaptureConfig {
        target: cli.target.clone(),
        force: cli.force,
        ..CaptureConfig::default()
    };

    match capture(&mut machine, &mut HostFs, &config) {
        Ok(path) => {
            if !cli.quiet {
                println!("{}", path.display());
            }
            0
        }
        Err(e) => {
            log::debug!("{e}");
            eprintln!("{}", error_text(e.code()));
            e.code()
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{msg}");
            process::exit(i32::from(EXIT_INVALID_ARGUMENT));
        }
    };

    let default_filter = if cli.quiet { "error" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();

    let code = match cli.action {
        Action::Help => {
            print_help();
            0
        }
        Action::Info => {
            print_version();
            0
        }
        Action::Shot => run(&cli),
    };
    process::exit(i32::from(code));
}
