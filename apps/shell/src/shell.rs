use std::io::{self, BufRead, Write};

use memspace::MemorySpace;

use crate::command::Command;

const HELP: &str = "\
malloc LENGTH   allocate LENGTH words, first fit
free ADDRESS    release the block starting at ADDRESS
defrag          sort and merge the free blocks
show            print free blocks, then allocated blocks
stats           print occupancy
check           verify the arena is exactly tiled
trace on|off    log allocator events
quit            leave the shell";

pub enum Outcome {
    Continue(String),
    Quit,
}

pub struct Shell {
    space: MemorySpace,
}

impl Shell {
    pub fn new(space: MemorySpace) -> Self {
        Self { space }
    }

    pub fn execute(&mut self, command: Command) -> Outcome {
        let reply = match command {
            Command::Malloc(length) => match self.space.malloc(length) {
                Some(address) => address.to_string(),
                None => "malloc failed".to_string(),
            },
            Command::Free(address) => match self.space.free(address) {
                Ok(()) => "ok".to_string(),
                Err(error) => format!("free failed: {}", error),
            },
            Command::Defrag => match self.space.defrag() {
                Ok(()) => "ok".to_string(),
                Err(error) => format!("defrag failed: {}", error),
            },
            Command::Show => self.space.to_string(),
            Command::Stats => self.space.stats().to_string(),
            Command::Check => match self.space.check() {
                Ok(()) => "ok".to_string(),
                Err(error) => error.to_string(),
            },
            Command::Trace(on) => {
                self.space.set_trace(on);
                format!("trace {}", if on { "on" } else { "off" })
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Outcome::Quit,
        };
        Outcome::Continue(reply)
    }
}

pub fn run<R: BufRead, W: Write>(shell: &mut Shell, input: R, mut output: W) -> io::Result<()> {
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        match Command::parse(&line) {
            Ok(Some(command)) => match shell.execute(command) {
                Outcome::Continue(reply) => writeln!(output, "{}", reply)?,
                Outcome::Quit => return Ok(()),
            },
            Ok(None) => {}
            Err(error) => writeln!(output, "{}", error)?,
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)
}
