use std::io::{self, Write};

use serde_json::Value;

use crate::error::CliError;

pub fn render(payload: &Value, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    write_payload(&mut stdout.lock(), payload, pretty)
}

fn write_payload(writer: &mut impl Write, payload: &Value, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, payload)?;
    } else {
        serde_json::to_writer(&mut *writer, payload)?;
    }
    writeln!(writer)?;
    Ok(())
}
