use std::error::Error;
use std::sync::Arc;

/// Boxed error returned by a singleton constructor.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Why a `configure` call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationErrorKind {
    /// A policy was already fixed, either by an earlier `configure` or by the first access.
    #[error("initialization policy is already fixed")]
    AlreadyConfigured,
    /// The instance exists, so its policy can no longer change.
    #[error("instance has already been materialized")]
    AlreadyMaterialized,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum SingletonError {
    #[error("cannot configure {type_name}: {kind}")]
    Configuration {
        type_name: &'static str,
        kind: ConfigurationErrorKind,
    },

    #[error("failed to construct {type_name}")]
    Construction {
        type_name: &'static str,
        #[source]
        source: Arc<dyn Error + Send + Sync + 'static>,
    },
}

impl SingletonError {
    pub(crate) fn construction(type_name: &'static str, source: BoxError) -> Self {
        SingletonError::Construction {
            type_name,
            source: Arc::from(source),
        }
    }

    /// The singleton type the error refers to.
    pub fn type_name(&self) -> &'static str {
        match self {
            SingletonError::Configuration { type_name, .. }
            | SingletonError::Construction { type_name, .. } => type_name,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, SingletonError::Configuration { .. })
    }

    pub fn is_construction(&self) -> bool {
        matches!(self, SingletonError::Construction { .. })
    }
}

/// Comparison ignores the identity of a construction error's source and compares its message.
impl PartialEq for SingletonError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                SingletonError::Configuration {
                    type_name: a,
                    kind: ka,
                },
                SingletonError::Configuration {
                    type_name: b,
                    kind: kb,
                },
            ) => a == b && ka == kb,
            (
                SingletonError::Construction {
                    type_name: a,
                    source: sa,
                },
                SingletonError::Construction {
                    type_name: b,
                    source: sb,
                },
            ) => a == b && sa.to_string() == sb.to_string(),
            _ => false,
        }
    }
}
