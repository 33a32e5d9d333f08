use crate::bench_error::BenchError;
use crate::benchmark::ResultTable;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

const HEADER: [&str; 2] = ["id_chamada", "tempo_em_ms"];

/// Writes one row per slot in index order. A failed call keeps its row with an
/// empty time cell.
pub fn write_report<W: Write>(table: &ResultTable, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(HEADER)?;
    for (index, slot) in table.slots().iter().enumerate() {
        let time = slot
            .as_ref()
            .map(|record| format_millis(record.elapsed.as_micros()))
            .unwrap_or_default();
        writer.write_record([index.to_string(), time])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_report(table: &ResultTable, path: &str) -> Result<(), BenchError> {
    let to_report_error = |reason: String| BenchError::CannotWriteReport {
        path: path.to_owned(),
        reason,
    };
    let file =
        File::create(Path::new(path)).map_err(|error| to_report_error(error.to_string()))?;
    write_report(table, file).map_err(|error| to_report_error(error.to_string()))?;
    info!("Results saved to: {path}");
    Ok(())
}

fn format_millis(micros: u128) -> String {
    format!("{:.2}", micros as f64 / 1000.0)
}
