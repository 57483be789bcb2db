use thiserror;

use crate::matches::Range;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Cannot build a combiner with zero operands")]
    NoOperands,

    #[error("Invalid combiner configuration: {reason}")]
    Config { reason: &'static str },

    #[error("Operand {port} produced an absent match, but the combiner does not allow absent operands")]
    AbsentNotAllowed { port: usize },

    #[error("Match from operand {port} covers {range}, outside the target bounds {bounds}")]
    RangeOutOfBounds {
        port: usize,
        range: Range,
        bounds: Range,
    },

    #[error("Match from operand {port} covers {targets} targets, but the combiner is in single-target mode")]
    MultipleTargets { port: usize, targets: usize },

    #[error("Error parsing patterns:\n\"{patterns}\"\n{source}")]
    ParsePatterns {
        patterns: String,
        source: Box<dyn std::error::Error>,
    },

    #[error("Cannot find a matcher for the leaf pattern \"{0}\"")]
    UnknownLeaf(String),

    #[error("Error in an operand match stream: {0}")]
    Upstream(Box<dyn std::error::Error>),
}
