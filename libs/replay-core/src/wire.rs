use crate::clock::{format_utc_micros, Clock};
use crate::error::ReplayError;
use crate::record::Record;

// ═══════════════════════════════════════════════════════════════
//  JSON line encoding — reliable-stream wire format
// ═══════════════════════════════════════════════════════════════

/// Encode a record as one JSON object followed by `\n`.
///
/// Field order on the wire is not significant; receivers match by name.
pub fn json_line(record: &Record) -> Result<Vec<u8>, ReplayError> {
    let mut buf = serde_json::to_vec(record)?;
    buf.push(b'\n');
    Ok(buf)
}

// ═══════════════════════════════════════════════════════════════
//  CRLX line encoding — connectionless wire format
// ═══════════════════════════════════════════════════════════════

/// Собирает wire-строку `<timestamp> <sensor_id> <raw_data>` из записи,
/// применяя подстановки момента отправки. Запись не мутируется.
///
/// - `timestamp`: текущее время часов (ISO-8601 UTC, микросекунды) при
///   `update_timestamp`, иначе оригинальное поле записи как есть;
/// - `sensor_id`: непустой override всегда побеждает оригинал;
/// - `raw_data`: оригинальное поле записи как есть;
/// - `raw_data_only`: отправляется только третье поле, без префикса.
pub struct CrlxEncoder<'a> {
    sensor_id: Option<&'a str>,
    update_timestamp: bool,
    raw_data_only: bool,
    clock: &'a dyn Clock,
}

impl<'a> CrlxEncoder<'a> {
    pub fn new(
        sensor_id: Option<&'a str>,
        update_timestamp: bool,
        raw_data_only: bool,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            // Empty override is treated as absent
            sensor_id: sensor_id.filter(|s| !s.is_empty()),
            update_timestamp,
            raw_data_only,
            clock,
        }
    }

    /// Encode one record. Fails with `Format` if the record lacks a field
    /// the encoding needs (non-CRLX-shaped source).
    pub fn encode(&self, record: &Record) -> Result<String, ReplayError> {
        let raw_data = record
            .raw_data()
            .ok_or_else(|| ReplayError::format_err("record has no raw_data field"))?;

        if self.raw_data_only {
            return Ok(raw_data.to_string());
        }

        let timestamp = if self.update_timestamp {
            format_utc_micros(self.clock.now_micros())
        } else {
            record
                .timestamp()
                .ok_or_else(|| ReplayError::format_err("record has no timestamp field"))?
                .to_string()
        };

        let sensor_id = match self.sensor_id {
            Some(id) => id,
            None => record
                .sensor_id()
                .ok_or_else(|| ReplayError::format_err("record has no sensor_id field"))?,
        };

        Ok(format!("{timestamp} {sensor_id} {raw_data}"))
    }
}
