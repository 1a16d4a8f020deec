//! Rendering of presentation events to a writer (stdout in the binary).

use std::io::Write;

use avanza::tariff;

use crate::error::EngineError;
use crate::sink::UiUpdate;

/// Write one presentation event as an NDJSON line or a TSV line.
pub fn write_update<W: Write>(
    update: &UiUpdate,
    json_mode: bool,
    writer: &mut W,
) -> Result<(), EngineError> {
    if json_mode {
        serde_json::to_writer(&mut *writer, update)?;
        writer.write_all(b"\n")?;
    } else {
        match update {
            UiUpdate::Render {
                facts,
                current,
                is_foreign,
            } => {
                // order \t total \t currency \t class \t fee \t origin
                let class = current
                    .as_ref()
                    .map(|c| tariff::class_label(c))
                    .unwrap_or_else(|| "-".to_string());
                let fee = current
                    .as_ref()
                    .map(|c| tariff::calculate_fee(facts.total, c).to_string())
                    .unwrap_or_else(|| "-".to_string());
                let origin = if *is_foreign { "foreign" } else { "domestic" };
                writeln!(
                    writer,
                    "order\t{}\t{}\t{class}\t{fee}\t{origin}",
                    facts.total, facts.currency
                )?;
            }
            UiUpdate::Notify { message, severity } => {
                writeln!(writer, "notify\t{severity:?}\t{message}")?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}
