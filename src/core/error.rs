use thiserror::Error;

use crate::combatant::Statistic;
use crate::rules::Stage;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("configuration error in unit '{unit}', field '{field}': {reason}")]
    Configuration {
        unit: String,
        field: String,
        reason: String,
    },

    #[error("missing statistic {statistic:?} required by the {stage:?} stage")]
    MissingStatistic { statistic: Statistic, stage: Stage },

    #[error("domain error: {0}")]
    Domain(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(String),
}

pub type Result<T> = std::result::Result<T, SimError>;
