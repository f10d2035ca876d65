use thiserror::Error;

use crate::types::DirectiveKind;
use crate::types::HandlerId;

/// Errors of directive registration and loading. Nothing on the invocation path produces them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("handler '{handler}' already has a {kind} directive")]
    DuplicateDirective { handler: HandlerId, kind: DirectiveKind },

    #[error("malformed directive table: {0}")]
    MalformedTable(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
