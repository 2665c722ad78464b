use std::path::Path;

use serde::Serialize;

use crate::error::ReplayError;

// ═══════════════════════════════════════════════════════════════
//  File Format
// ═══════════════════════════════════════════════════════════════

/// Формат исходного файла с записями. Закрытый набор — по одному
/// декодеру на вариант.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Json,
    Crlx,
}

impl FileFormat {
    /// Detect the format from the file suffix (case-insensitive).
    pub fn from_path(path: &Path) -> Result<Self, ReplayError> {
        let suffix = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match suffix.as_str() {
            "csv" => Ok(FileFormat::Csv),
            "json" => Ok(FileFormat::Json),
            "crlx" => Ok(FileFormat::Crlx),
            _ => Err(ReplayError::format_err(format!(
                "unsupported file format: {}",
                path.display()
            ))),
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Csv => write!(f, "csv"),
            FileFormat::Json => write!(f, "json"),
            FileFormat::Crlx => write!(f, "crlx"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Record
// ═══════════════════════════════════════════════════════════════

/// Одна декодированная запись: отображение имени поля в значение.
///
/// CSV-поля остаются строками, JSON-поля сохраняют свои типы. CRLX-записи
/// несут ровно три поля: `timestamp`, `sensor_id`, `raw_data`.
/// После парсинга запись не мутируется — подстановки на отправке
/// (sensor override, обновление timestamp) выполняются на wire-строке.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn from_fields(fields: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.fields.get(name)
    }

    /// String view of a field. Non-string values return `None`.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get_str("timestamp")
    }

    pub fn sensor_id(&self) -> Option<&str> {
        self.get_str("sensor_id")
    }

    pub fn raw_data(&self) -> Option<&str> {
        self.get_str("raw_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn record_with(pairs: &[(&str, &str)]) -> Record {
        let mut fields = serde_json::Map::new();
        for (k, v) in pairs {
            fields.insert(k.to_string(), serde_json::Value::String(v.to_string()));
        }
        Record::from_fields(fields)
    }

    #[test]
    fn format_detection_is_case_insensitive() {
        assert_eq!(FileFormat::from_path(Path::new("data.CSV")).unwrap(), FileFormat::Csv);
        assert_eq!(FileFormat::from_path(Path::new("data.Json")).unwrap(), FileFormat::Json);
        assert_eq!(FileFormat::from_path(Path::new("data.crlx")).unwrap(), FileFormat::Crlx);
    }

    #[test]
    fn unknown_suffix_is_a_format_error() {
        let err = FileFormat::from_path(&PathBuf::from("data.parquet")).unwrap_err();
        assert!(matches!(err, ReplayError::Format(_)));
        let err = FileFormat::from_path(Path::new("no_extension")).unwrap_err();
        assert!(matches!(err, ReplayError::Format(_)));
    }

    #[test]
    fn field_accessors() {
        let rec = record_with(&[
            ("timestamp", "2025-11-14T00:05:36.704224Z"),
            ("sensor_id", "transm002005"),
            ("raw_data", "CST-2005DR\t05072"),
        ]);
        assert_eq!(rec.timestamp(), Some("2025-11-14T00:05:36.704224Z"));
        assert_eq!(rec.sensor_id(), Some("transm002005"));
        assert_eq!(rec.raw_data(), Some("CST-2005DR\t05072"));
        assert_eq!(rec.get_str("missing"), None);
    }

    #[test]
    fn non_string_fields_have_no_str_view() {
        let mut fields = serde_json::Map::new();
        fields.insert("value".into(), serde_json::json!(23.5));
        let rec = Record::from_fields(fields);
        assert_eq!(rec.get_str("value"), None);
        assert_eq!(rec.get("value"), Some(&serde_json::json!(23.5)));
    }
}
