use replay_core::ReplayError;

#[derive(Debug, thiserror::Error)]
pub enum ReplayCliError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Replay(#[from] ReplayError),
}
