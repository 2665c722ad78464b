use std::path::Path;

use crate::error::ReplayError;
use crate::record::{FileFormat, Record};

// ═══════════════════════════════════════════════════════════════
//  Entry point — suffix dispatch
// ═══════════════════════════════════════════════════════════════

/// Read a data file into an ordered sequence of records.
///
/// The decoder is selected by file suffix (`.csv`, `.json`, `.crlx`,
/// case-insensitive). A missing file fails with `NotFound` before any
/// format-specific logic runs; malformed content fails the whole parse,
/// never returning a partial record list.
pub fn read_records(path: &Path) -> Result<Vec<Record>, ReplayError> {
    if !path.exists() {
        return Err(ReplayError::NotFound(path.display().to_string()));
    }
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReplayError::format_err(format!("cannot read {}: {e}", path.display())))?;

    let records = match format {
        FileFormat::Csv => read_csv(&content),
        FileFormat::Json => read_json(&content),
        FileFormat::Crlx => read_crlx(&content),
    }?;

    tracing::debug!(file = %path.display(), %format, records = records.len(), "parsed file");
    Ok(records)
}

// ═══════════════════════════════════════════════════════════════
//  CSV — header row + data rows, all values stay text
// ═══════════════════════════════════════════════════════════════

fn read_csv(content: &str) -> Result<Vec<Record>, ReplayError> {
    let mut lines = content.lines().map(|l| l.strip_suffix('\r').unwrap_or(l));

    let header = match lines.next() {
        Some(line) if !line.is_empty() => parse_fields(line),
        _ => return Ok(Vec::new()),
    };

    let mut records = Vec::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let values = parse_fields(line);
        let mut fields = serde_json::Map::new();
        // Surplus values are dropped, missing columns stay absent.
        for (name, value) in header.iter().zip(values) {
            fields.insert(name.clone(), serde_json::Value::String(value));
        }
        records.push(Record::from_fields(fields));
    }
    Ok(records)
}

/// Разбирает одну RFC 4180 строку на поля с учётом quoting.
fn parse_fields(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();
    let mut field = String::new();

    loop {
        if chars.peek() == Some(&'"') {
            // Quoted field (RFC 4180 rule 5-7)
            chars.next(); // consume opening quote
            loop {
                match chars.next() {
                    Some('"') => {
                        if chars.peek() == Some(&'"') {
                            // Escaped quote: "" → "
                            chars.next();
                            field.push('"');
                        } else {
                            break;
                        }
                    }
                    Some(c) => field.push(c),
                    None => break, // EOF inside quote — best effort
                }
            }
            // Consume until comma or end
            loop {
                match chars.peek() {
                    Some(&',') => {
                        chars.next();
                        break;
                    }
                    Some(_) => {
                        chars.next();
                    }
                    None => break,
                }
            }
        } else {
            loop {
                match chars.peek() {
                    Some(&',') => {
                        chars.next();
                        break;
                    }
                    Some(_) => field.push(chars.next().unwrap()),
                    None => break,
                }
            }
        }

        fields.push(std::mem::take(&mut field));

        if chars.peek().is_none() && !line.ends_with(',') {
            break;
        }
        if chars.peek().is_none() {
            // Trailing comma → one more empty field
            fields.push(String::new());
            break;
        }
    }

    fields
}

// ═══════════════════════════════════════════════════════════════
//  JSON — single object or array of objects
// ═══════════════════════════════════════════════════════════════

fn read_json(content: &str) -> Result<Vec<Record>, ReplayError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    match value {
        serde_json::Value::Object(fields) => Ok(vec![Record::from_fields(fields)]),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::Object(fields) => Ok(Record::from_fields(fields)),
                other => Err(ReplayError::format_err(format!(
                    "JSON array element must be an object, got: {other}"
                ))),
            })
            .collect(),
        other => Err(ReplayError::format_err(format!(
            "unexpected JSON shape: expected object or array of objects, got: {other}"
        ))),
    }
}

// ═══════════════════════════════════════════════════════════════
//  CRLX — <timestamp> <sensor_id> <raw_data>, one record per line
// ═══════════════════════════════════════════════════════════════

/// Сплит только по первым двум пробелам: `raw_data` сохраняет любые
/// внутренние пробелы и табы как есть. Пустые строки пропускаются;
/// строка, не распавшаяся на три части, валит весь парс.
fn read_crlx(content: &str) -> Result<Vec<Record>, ReplayError> {
    let mut records = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.splitn(3, ' ').collect();
        if parts.len() != 3 {
            return Err(ReplayError::format_err(format!(
                "invalid CRLX line format: {line}"
            )));
        }

        let mut fields = serde_json::Map::new();
        fields.insert("timestamp".into(), serde_json::Value::String(parts[0].into()));
        fields.insert("sensor_id".into(), serde_json::Value::String(parts[1].into()));
        fields.insert("raw_data".into(), serde_json::Value::String(parts[2].into()));
        records.push(Record::from_fields(fields));
    }
    Ok(records)
}
