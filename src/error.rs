use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every way delegation code generation can fail for a single method.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// A manipulation or binding rule was asked for something structurally impossible.
    #[error("cannot construct {what}: {message}")]
    Construction { what: String, message: String },

    #[error("no binding found for {source_method}: {}", rejections.join("; "))]
    NoBinding {
        source_method: String,
        rejections: Vec<String>,
    },

    #[error("cannot resolve ambiguous delegation of {source_method} to {}", candidates.join(" or "))]
    Ambiguous {
        source_method: String,
        candidates: Vec<String>,
    },

    #[error("could not resolve bridge method {bridge} with multiple potential targets {}", candidates.join(", "))]
    BridgeConflict {
        bridge: String,
        candidates: Vec<String>,
    },

    #[error("could not resolve bridge method target of {method}")]
    BridgeUnresolved { method: String },

    #[error("cyclic bridge method chain starting at {method}")]
    BridgeCycle { method: String },

    #[error("failed to encode instructions: {0}")]
    Encoding(String),

    /// `apply` was called on a manipulation that reports itself invalid.
    #[error("illegal stack manipulation must not be applied: {manipulation}")]
    InvalidApply { manipulation: String },
}

impl Error {
    pub(crate) fn construction(what: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Construction {
            what: what.into(),
            message: message.into(),
        }
    }

    /// True for binding and ambiguity failures, which the caller fixes by changing
    /// the handler set. Everything else aborts only the method being generated.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::NoBinding { .. } | Error::Ambiguous { .. })
    }
}
