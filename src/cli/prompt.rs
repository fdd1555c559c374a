use crate::models::TemperatureUnit;
use anyhow::{anyhow, Result};
use std::io::{BufRead, Write};

pub const UNIT_QUESTION: &str = "Do you prefer temperature in fahrenheit or celsius ?";

/// Asks until the answer completes to exactly one unit. Prefixes are accepted,
/// so `c` answers celsius; anything else lists the choices again.
pub fn ask_temperature_unit<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> Result<TemperatureUnit> {
    let choices = TemperatureUnit::ALL
        .iter()
        .map(|u| u.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    loop {
        writeln!(out, "{}", UNIT_QUESTION)?;
        write!(out, "[{}] > ", choices)?;
        out.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Err(anyhow!("No temperature unit provided"));
        }

        let answer = answer.trim();
        if answer.is_empty() {
            writeln!(out, "Please choose one of: {}", choices)?;
            continue;
        }

        match answer.parse::<TemperatureUnit>() {
            Ok(unit) => {
                if !unit.as_str().eq_ignore_ascii_case(answer) {
                    writeln!(out, "Using {}", unit)?;
                }
                return Ok(unit);
            }
            Err(err) => writeln!(out, "{}", err)?,
        }
    }
}
