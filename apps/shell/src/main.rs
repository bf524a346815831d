mod command;
mod shell;

use std::io;
use std::process;

use memspace::debug::{init_debug, DebugOutput};
use memspace::{MemorySpace, SpaceConfig};

use crate::shell::Shell;

const DEFAULT_ARENA_SIZE: usize = 100;

struct StdoutOutput;

impl DebugOutput for StdoutOutput {
    fn write_str(&self, s: &str) {
        print!("{}", s);
    }
}

static STDOUT_OUTPUT: StdoutOutput = StdoutOutput;

fn main() {
    let arena_size = match std::env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(size) => size,
            Err(_) => {
                eprintln!("invalid arena size: {}", arg);
                process::exit(2);
            }
        },
        None => DEFAULT_ARENA_SIZE,
    };

    let space = match MemorySpace::with_config(SpaceConfig::new(arena_size)) {
        Ok(space) => space,
        Err(error) => {
            eprintln!("{}", error);
            process::exit(2);
        }
    };

    init_debug(&STDOUT_OUTPUT);
    println!("memshell: {} words, type help for commands", arena_size);

    let mut shell = Shell::new(space);
    if let Err(error) = shell::run(&mut shell, io::stdin().lock(), io::stdout()) {
        eprintln!("memshell: {}", error);
        process::exit(1);
    }
}
