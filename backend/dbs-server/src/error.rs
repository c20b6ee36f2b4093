use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Config error: {0}")]
    Config(#[from] dbs_config::ConfigError),

    #[error("Supervisor error: {0}")]
    Supervisor(#[from] dbs_supervisor::ServerError),

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    #[error("Failed to register signal handlers: {source}")]
    Signals {
        #[source]
        source: std::io::Error,
    },

    #[error("Signal listener stopped before a signal arrived")]
    SignalListenerGone,
}

pub type Result<T> = std::result::Result<T, AppError>;
