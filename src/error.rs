//! Error taxonomy for the progression engine.
//!
//! Every variant is a local, recoverable condition. Route handlers turn them
//! into HTML error spans; nothing here is fatal to the worker.

use thiserror::Error;

use crate::game::slots::SlotId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("all {max} pet slots are in use")]
    CapacityExceeded { max: usize },

    #[error("no pet slot with id {0}")]
    NotFound(SlotId),

    #[error("no slot ids left to assign")]
    IdsExhausted,

    #[error("slot {0} is already training")]
    AlreadyTraining(SlotId),

    #[error("slot {0} has nothing ready to collect")]
    NotReady(SlotId),

    #[error("unknown screen `{0}`")]
    UnknownScreen(String),

    #[error("invalid engine snapshot: {0}")]
    Snapshot(String),

    #[error("invalid engine config: {0}")]
    Config(String),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
