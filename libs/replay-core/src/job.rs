use std::path::PathBuf;

use crate::error::ReplayError;
use crate::sender::Protocol;

// ═══════════════════════════════════════════════════════════════
//  StreamJob
// ═══════════════════════════════════════════════════════════════

/// Полностью разрешённая конфигурация одного playback-прогона.
///
/// Собирается один раз из CLI-флагов или записи конфиг-файла, валидируется
/// до исполнения, после валидации не мутируется, исполняется ровно один раз.
#[derive(Debug, Clone)]
pub struct StreamJob {
    /// Имя — только для отчётности.
    pub name: String,
    pub file: PathBuf,
    pub protocol: Protocol,
    pub port: u16,

    // Protocol-specific addresses
    pub host: Option<String>,
    pub broadcast_addr: Option<String>,
    pub unicast_addr: Option<String>,

    // Stream options
    pub sensor_id: Option<String>,
    pub update_timestamp: bool,
    pub raw_data_only: bool,
    /// Пауза между записями в секундах; `<= 0` — без задержки.
    pub interval: f64,
}

impl StreamJob {
    /// Check that the protocol-required address field is present.
    /// Raised before any I/O is attempted.
    pub fn validate(&self) -> Result<(), ReplayError> {
        match self.protocol {
            Protocol::Tcp => {
                if self.host.as_deref().unwrap_or("").is_empty() {
                    return Err(ReplayError::validation(format!(
                        "stream '{}': host is required for tcp protocol",
                        self.name
                    )));
                }
            }
            Protocol::UdpBroadcast => {
                if self.broadcast_addr.as_deref().unwrap_or("").is_empty() {
                    return Err(ReplayError::validation(format!(
                        "stream '{}': broadcast_addr is required for udp_broadcast protocol",
                        self.name
                    )));
                }
                self.require_port()?;
            }
            Protocol::UdpUnicast => {
                if self.unicast_addr.as_deref().unwrap_or("").is_empty() {
                    return Err(ReplayError::validation(format!(
                        "stream '{}': unicast_addr is required for udp_unicast protocol",
                        self.name
                    )));
                }
                self.require_port()?;
            }
        }
        Ok(())
    }

    fn require_port(&self) -> Result<(), ReplayError> {
        if self.port == 0 {
            return Err(ReplayError::validation(format!(
                "stream '{}': port is required",
                self.name
            )));
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  StreamResult
// ═══════════════════════════════════════════════════════════════

/// Итог исполнения одного StreamJob. Производится ровно один раз на job.
#[derive(Debug, Clone)]
pub struct StreamResult {
    pub name: String,
    pub success: bool,
    pub records_sent: u64,
    pub error: Option<String>,
}

impl StreamResult {
    pub fn ok(name: String, records_sent: u64) -> Self {
        Self { name, success: true, records_sent, error: None }
    }

    pub fn failed(name: String, error: String) -> Self {
        Self { name, success: false, records_sent: 0, error: Some(error) }
    }
}
