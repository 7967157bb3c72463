use anyhow::{anyhow, Context, Result};
use encoding_rs::EncoderResult;
use std::path::{Path, PathBuf};

use crate::model::date_range::DateRange;
use crate::model::work_item::{WorkItemRecord, COLUMNS};

/// Render records as CSV text. The header is always written, even with no rows.
pub fn to_csv(records: &[WorkItemRecord]) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| anyhow!("Failed to flush CSV output: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Encode as single-byte latin1.
///
/// Windows-1252 covers the printable range. Code points up to U+00FF it has no slot for
/// (the C1 controls) keep their ISO-8859-1 byte, anything wider becomes `?`.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    let mut encoder = encoding_rs::WINDOWS_1252.new_encoder();
    let mut out = Vec::with_capacity(text.len());
    let mut buf = [0u8; 1024];
    let mut src = text;
    let mut replaced = 0usize;

    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(src, &mut buf, true);
        out.extend_from_slice(&buf[..written]);
        src = &src[read..];
        match result {
            EncoderResult::InputEmpty => break,
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(c) => match u8::try_from(u32::from(c)) {
                Ok(byte) => out.push(byte),
                Err(_) => {
                    out.push(b'?');
                    replaced += 1;
                }
            },
        }
    }

    if replaced > 0 {
        tracing::warn!(replaced, "Characters without a latin1 form were written as '?'");
    }
    out
}

/// `<dir>/<YYYY>.<MM>_Tasks.csv`, stamped with the range's end date.
pub fn output_path(dir: &Path, range: &DateRange) -> PathBuf {
    dir.join(format!("{}_Tasks.csv", range.output_stamp()))
}

pub fn write(dir: &Path, range: &DateRange, records: &[WorkItemRecord]) -> Result<PathBuf> {
    let csv = to_csv(records)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    let path = output_path(dir, range);
    std::fs::write(&path, encode_latin1(&csv))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
