//! Encode a file into a modem recording
//!
//! ```bash
//! pm_encode message.txt message.wav
//! RUST_LOG=phasemodem_lib=debug pm_encode --config modem.json message.txt message.wav
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use env_logger::Env;

use phasemodem_lib::commands::{load_config, run_encode};

#[derive(Parser, Debug)]
#[command(author, version, about = "Encode a file as a three-tone phase modem WAV recording", long_about = None)]
struct Args {
    /// File to encode
    infile: Option<PathBuf>,

    /// WAV file to write (mono, 16-bit PCM)
    outfile: Option<PathBuf>,

    /// JSON modem configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (Some(infile), Some(outfile)) = (args.infile, args.outfile) else {
        // usage, not an error
        let _ = Args::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    };

    let result = load_config(args.config.as_deref())
        .and_then(|config| run_encode(&infile, &outfile, &config));

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
