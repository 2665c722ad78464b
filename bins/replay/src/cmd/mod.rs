pub mod config;
pub mod error;
mod exec;

use clap::{Args, Subcommand};

use error::ReplayCliError;

#[derive(Subcommand)]
pub enum Command {
    /// Stream a single data file
    Stream(StreamArgs),
    /// Stream multiple files using a TOML configuration file
    Config(ConfigArgs),
}

#[derive(Args, Clone, Debug)]
pub struct StreamArgs {
    /// Путь к файлу данных (CSV, JSON или CRLX)
    #[arg(long, short)]
    pub file: String,

    /// Протокол: tcp, udp_broadcast, udp_unicast
    #[arg(long, short)]
    pub protocol: String,

    /// Порт назначения
    #[arg(long)]
    pub port: u16,

    /// Host для TCP
    #[arg(long)]
    pub host: Option<String>,

    /// Broadcast-адрес для udp_broadcast
    #[arg(long)]
    pub broadcast_addr: Option<String>,

    /// Целевой адрес для udp_unicast
    #[arg(long)]
    pub unicast_addr: Option<String>,

    /// Заменить sensor_id во всех сообщениях
    #[arg(long)]
    pub sensor_id: Option<String>,

    /// Сохранять оригинальные timestamp'ы (по умолчанию — обновлять)
    #[arg(long)]
    pub no_update_timestamp: bool,

    /// Отправлять только raw_data, без timestamp и sensor_id
    #[arg(long)]
    pub raw_data_only: bool,

    /// Пауза между сообщениями в секундах
    #[arg(long, default_value_t = 1.0)]
    pub interval: f64,
}

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Путь к TOML-конфигу со стримами
    #[arg(long, short, env = "REPLAY_CONFIG")]
    pub file: String,

    /// Запускать стримы один за другим вместо параллельного режима
    #[arg(long)]
    pub sequential: bool,
}

pub async fn run(command: Command) -> Result<(), ReplayCliError> {
    match command {
        Command::Stream(args) => exec::run_stream(args).await,
        Command::Config(args) => exec::run_config(args).await,
    }
}
