//! Decode a modem recording back into a file
//!
//! ```bash
//! pm_decode message.wav message.txt
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use env_logger::Env;

use phasemodem_lib::commands::{load_config, run_decode};

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode a three-tone phase modem WAV recording", long_about = None)]
struct Args {
    /// WAV file to decode (mono, 16-bit PCM)
    infile: Option<PathBuf>,

    /// File to write the recovered bytes to
    outfile: Option<PathBuf>,

    /// JSON modem configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (Some(infile), Some(outfile)) = (args.infile, args.outfile) else {
        let _ = Args::command().print_help();
        println!();
        return ExitCode::SUCCESS;
    };

    let result = load_config(args.config.as_deref())
        .and_then(|config| run_decode(&infile, &outfile, &config));

    match result {
        Ok(report) => {
            if report.invalid_symbols > 0 {
                log::warn!("{} symbols were ambiguous", report.invalid_symbols);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}
