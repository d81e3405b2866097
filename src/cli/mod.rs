//! Line-based interactive command loop
//!
//! Verbs: `zip`, `city`, `state`, `quit`. Each verb prompts for its arguments,
//! runs one query and prints the report. Query failures are printed and the
//! loop keeps going; only `quit` or end of input stops it.

use crate::directory::{validate_radius, RegionKind};
use crate::error::QueryError;
use crate::market::MarketDataGateway;
use crate::postal::PostalCode;
use crate::query::{Query, QueryEngine};
use crate::ui::Report;
use std::io::{self, BufRead, Write};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Zip,
    City,
    State,
    Quit,
}

impl FromStr for Command {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zip" => Ok(Command::Zip),
            "city" => Ok(Command::City),
            "state" => Ok(Command::State),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(QueryError::InvalidInput(format!("unknown command '{}'", other))),
        }
    }
}

/// Parse a radius prompt answer; blank input means `default`
pub fn parse_radius(raw: &str, default: f64) -> Result<f64, QueryError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    let radius: f64 = raw.parse().map_err(|_| {
        QueryError::InvalidInput(format!("radius '{}' is not a number", raw))
    })?;
    validate_radius(radius)
}

const COMMAND_PROMPT: &str = "\nEnter command (zip/city/state/quit): ";

pub struct CommandLoop<'e, 'd, G> {
    engine: &'e QueryEngine<'d, G>,
    report: Report,
    default_radius: f64,
}

impl<'e, 'd, G: MarketDataGateway> CommandLoop<'e, 'd, G> {
    pub fn new(engine: &'e QueryEngine<'d, G>, report: Report, default_radius: f64) -> Self {
        Self {
            engine,
            report,
            default_radius,
        }
    }

    pub fn run(&self, input: &mut impl BufRead, output: &mut impl Write) -> io::Result<()> {
        writeln!(output, "Reina Real Estate CLI")?;
        writeln!(output, "Type:")?;
        writeln!(output, "  zip    → to search nearby ZIPs")?;
        writeln!(output, "  city   → to search top ZIPs in a city")?;
        writeln!(output, "  state  → to search top ZIPs in a state")?;
        writeln!(output, "  quit   → to exit")?;

        loop {
            let Some(line) = prompt(input, output, COMMAND_PROMPT)? else {
                break;
            };

            let command = match line.parse::<Command>() {
                Ok(command) => command,
                Err(_) => {
                    writeln!(output, "Unknown command. Try zip / city / state / quit.")?;
                    continue;
                }
            };

            let query = match command {
                Command::Quit => {
                    writeln!(output, "Exiting. Goodbye!")?;
                    break;
                }
                Command::Zip => match self.read_proximity(input, output)? {
                    Some(query) => query,
                    None => break,
                },
                Command::City => match self.read_region(input, output, RegionKind::City)? {
                    Some(query) => query,
                    None => break,
                },
                Command::State => match self.read_region(input, output, RegionKind::State)? {
                    Some(query) => query,
                    None => break,
                },
            };

            match query {
                Ok(query) => self.execute(query, output)?,
                Err(e) => writeln!(output, "Error: {}", e)?,
            }
        }

        output.flush()
    }

    /// Run one query and print either the report or the error
    pub fn execute(&self, query: Query, output: &mut impl Write) -> io::Result<()> {
        match self.engine.run(query) {
            Ok(outcome) => self.report.render(output, &outcome),
            Err(e) => {
                if e.is_recoverable() {
                    log::debug!("Query failed: {}", e);
                } else {
                    log::error!("❌ Query failed: {}", e);
                }
                writeln!(output, "Error: {}", e)
            }
        }
    }

    /// Outer `None` means end of input
    fn read_proximity(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> io::Result<Option<Result<Query, QueryError>>> {
        let Some(code) = prompt(input, output, "Enter ZIP code: ")? else {
            return Ok(None);
        };
        let radius_prompt = format!("Enter radius in miles (default {}): ", self.default_radius);
        let Some(radius) = prompt(input, output, &radius_prompt)? else {
            return Ok(None);
        };

        let query = PostalCode::parse(&code).and_then(|center| {
            let radius_miles = parse_radius(&radius, self.default_radius)?;
            Ok(Query::Proximity {
                center,
                radius_miles,
            })
        });
        Ok(Some(query))
    }

    fn read_region(
        &self,
        input: &mut impl BufRead,
        output: &mut impl Write,
        kind: RegionKind,
    ) -> io::Result<Option<Result<Query, QueryError>>> {
        let Some(value) = prompt(input, output, &format!("Enter {} name: ", kind))? else {
            return Ok(None);
        };

        if value.is_empty() {
            return Ok(Some(Err(QueryError::InvalidInput(format!(
                "{} name must not be empty",
                kind
            )))));
        }
        Ok(Some(Ok(Query::Region { kind, value })))
    }
}

/// Print `message`, read one trimmed line. `None` at end of input.
fn prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    message: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", message)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
