use crate::error::CliError;
use engine_processing::consumer::SessionReport;
use model::{pagination::offset::Offset, records::row::Row};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Writes one committed offset as a JSON line.
pub async fn write_offset<W>(out: &mut W, offset: &Offset) -> Result<(), CliError>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(offset)?;
    line.push(b'\n');
    out.write_all(&line).await?;
    out.flush().await?;
    Ok(())
}

pub fn print_report(report: &SessionReport) {
    println!("Write session summary:");
    println!("-----------------------------");
    println!("{:<16} {}", "Batches", report.batches);
    println!("{:<16} {}", "Rows", report.rows);
    println!("{:<16} {}", "Deleted keys", report.deleted_keys);
    println!("{:<16} {}", "Commits", report.commits);
}

pub fn print_batches(batches: &[Vec<Row>]) -> Result<(), CliError> {
    for (index, batch) in batches.iter().enumerate() {
        let json = serde_json::to_string(batch)?;
        println!("batch {index} ({} rows): {json}", batch.len());
    }
    Ok(())
}
