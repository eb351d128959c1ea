//! PacketCrypt Wire
//!
//! Validates and inspects PacketCrypt wire records from the command line.

use clap::Parser;
use packetcrypt_wire::{
    config::{Args, Config},
    error::{Error, Result},
    utils::{self, logging::Provenance},
    validator::StructuralValidator,
};
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, info};

fn main() -> Result<ExitCode> {
    // Parse command-line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::from_args(&args)?;

    if args.print_config {
        print!("{}", config.to_yaml()?);
        return Ok(ExitCode::SUCCESS);
    }

    // Initialize logging
    utils::init_logging(&config.logging)?;
    debug!(?config, "Loaded configuration");

    let kind = args
        .kind
        .ok_or_else(|| Error::config("A record kind is required (--kind)"))?;
    let bytes = read_input(&args)?;
    let provenance = provenance(&args);

    let validator = StructuralValidator::from_config(&config.validator)?;

    match validator.validate_from(kind, &bytes, &provenance) {
        Ok(record) => {
            info!(
                kind = %kind,
                size = %utils::format_size(bytes.len()),
                source = %provenance,
                "Record is well formed"
            );
            if args.inspect {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("ok {} {}", kind, bytes.len());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.is_structural() => {
            println!("rejected {} {}: {}", kind, e.category(), e);
            Ok(ExitCode::from(1))
        }
        Err(e) => Err(e),
    }
}

/// Read the record bytes from `--hex`, a file or stdin
fn read_input(args: &Args) -> Result<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return utils::decode_hex_input(hex);
    }

    match args.input.as_deref() {
        Some(path) if path == Path::new("-") => {
            let mut bytes = Vec::new();
            std::io::stdin().lock().read_to_end(&mut bytes)?;
            Ok(bytes)
        }
        Some(path) => Ok(std::fs::read(path)?),
        None => Err(Error::config("No input given: pass --hex or --input")),
    }
}

fn provenance(args: &Args) -> Provenance {
    let mut provenance = match &args.peer {
        Some(peer) => Provenance::for_peer(peer.clone()),
        None => Provenance::new(),
    };
    if let Some(connection) = args.connection {
        provenance = provenance.with_connection(connection);
    }
    provenance
}
