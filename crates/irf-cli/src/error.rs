use irfkit::fpe::FpeError;
use irfkit::irfs::IrfError;
use irfkit::params::ParError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Irf(#[from] IrfError),

    #[error(transparent)]
    Par(#[from] ParError),

    #[error(transparent)]
    Fpe(#[from] FpeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    Argument(String),
}
