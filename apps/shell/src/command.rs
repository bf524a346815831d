use std::fmt;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Malloc(usize),
    Free(usize),
    Defrag,
    Show,
    Stats,
    Check,
    Trace(bool),
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    Unknown(String),
    Usage(&'static str),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Unknown(name) => write!(f, "unknown command: {} (try help)", name),
            ParseError::Usage(usage) => write!(f, "usage: {}", usage),
        }
    }
}

fn number(arg: Option<&str>, usage: &'static str) -> Result<usize, ParseError> {
    arg.and_then(|value| value.parse().ok())
        .ok_or(ParseError::Usage(usage))
}

impl Command {
    /// `Ok(None)` for a blank line.
    pub fn parse(line: &str) -> Result<Option<Command>, ParseError> {
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Ok(None);
        };
        let arg = parts.next();

        let command = match name {
            "malloc" => Command::Malloc(number(arg, "malloc LENGTH")?),
            "free" => Command::Free(number(arg, "free ADDRESS")?),
            "defrag" => Command::Defrag,
            "show" => Command::Show,
            "stats" => Command::Stats,
            "check" => Command::Check,
            "trace" => match arg {
                Some("on") => Command::Trace(true),
                Some("off") => Command::Trace(false),
                _ => return Err(ParseError::Usage("trace on|off")),
            },
            "help" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}
