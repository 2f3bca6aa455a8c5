use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use captain_nemo::accel::format::read_records;
use captain_nemo::config::Settings;
use captain_nemo::keybindings::format_key_display;
use captain_nemo::orthodox::{OrthodoxAction, OrthodoxKeys};
use captain_nemo::{logging, NemoError};

#[derive(Parser)]
#[command(name = "captain-nemo", version, about = "Orthodox file manager shortcuts for Nautilus")]
struct Cli {
    /// Verbose logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the orthodox key table
    Keys,
    /// List saved accelerator overrides
    Accels {
        /// Accelerator file (defaults to the configured one)
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Validate the accelerator file
    Check {
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

fn accel_file(settings: &Settings, file: Option<PathBuf>) -> Result<PathBuf, NemoError> {
    file.or_else(|| settings.accel_path()).ok_or(NemoError::NoConfigDir)
}

fn print_keys(settings: &Settings) {
    let keys = OrthodoxKeys::from_overrides(&settings.keybindings);
    println!("{:<10} {:<16} {}", "KEY", "OPERATION", "HOST MENU ITEM");
    for action in OrthodoxAction::ALL {
        println!(
            "{:<10} {:<16} {}",
            keys.keys_joined(action, " / "),
            action.label(),
            action.menu_item().unwrap_or("-")
        );
    }
}

fn label_or_none(binding: &str) -> String {
    let label = format_key_display(binding);
    if label.is_empty() {
        "(none)".to_string()
    } else {
        label
    }
}

fn list_accels(path: &Path) -> Result<(), NemoError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            println!("No saved accelerator overrides ({})", path.display());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let records = read_records(BufReader::new(file))?;
    for r in &records {
        println!(
            "{:<10} {:<10} {}",
            label_or_none(&r.current),
            label_or_none(&r.default),
            r.path
        );
    }
    Ok(())
}

fn check_accels(path: &Path) -> Result<(), NemoError> {
    let file = File::open(path)?;
    let records = read_records(BufReader::new(file))?;
    println!("{}: {} record(s) OK", path.display(), records.len());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load();
    logging::init(cli.debug || settings.debug);

    let result = match cli.command {
        Command::Keys => {
            print_keys(&settings);
            Ok(())
        }
        Command::Accels { file } => accel_file(&settings, file).and_then(|p| list_accels(&p)),
        Command::Check { file } => accel_file(&settings, file).and_then(|p| check_accels(&p)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
