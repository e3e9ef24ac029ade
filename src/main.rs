//! Contentify Binary

use contentify::{Cli, ReplayError};
use std::process;

fn main() {
    let mut cli = Cli::new();

    match cli.run() {
        Ok(()) => {}
        Err(ReplayError::Io(e)) => {
            eprintln!("IO Error: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Replay failed: {}", e);
            process::exit(1);
        }
    }
}
