use agij_types::BlockNumber;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VrfError {
    #[error("target block {target} not yet mined (current {current})")]
    TargetNotReached { target: BlockNumber, current: BlockNumber },

    #[error("hash of block {0} unavailable")]
    MissingBlockHash(BlockNumber),

    #[error("insufficient entropy contributors: have {have}, need {need}")]
    InsufficientContributors { have: usize, need: usize },
}
