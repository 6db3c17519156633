use crate::InitPolicy;

/// Events emitted by a singleton entry during its lifecycle.
///
/// These events are passed to the tracing callback set via `set_trace_callback`.
/// The `Clone` derive allows callbacks to store or forward events if needed.
///
/// # Examples
///
/// ```rust
/// use single_instance_registry::{InitPolicy, SingletonEvent};
///
/// let event = SingletonEvent::Configure {
///     type_name: "Logger",
///     policy: InitPolicy::Eager,
/// };
/// assert_eq!(event.to_string(), "configure { type_name: Logger, policy: eager }");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SingletonEvent {
    /// A policy was fixed for the entry.
    Configure {
        type_name: &'static str,
        policy: InitPolicy,
    },

    /// The constructor produced a new instance.
    Construct {
        type_name: &'static str,
        policy: InitPolicy,
    },

    /// The instance was requested.
    Get {
        type_name: &'static str,
        /// Whether the call returned an instance.
        found: bool,
    },

    /// A second instance replaced the first one. Only reachable under `LazyUnsafe`.
    Duplicate {
        type_name: &'static str,
        /// Number of instances built so far, including this one.
        constructed: usize,
    },

    /// The constructor returned an error.
    Failed {
        type_name: &'static str,
        policy: InitPolicy,
        /// True when the entry will never retry.
        permanent: bool,
    },
}

impl std::fmt::Display for SingletonEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SingletonEvent::Configure { type_name, policy } => {
                write!(f, "configure {{ type_name: {type_name}, policy: {policy} }}")
            }
            SingletonEvent::Construct { type_name, policy } => {
                write!(f, "construct {{ type_name: {type_name}, policy: {policy} }}")
            }
            SingletonEvent::Get { type_name, found } => {
                write!(f, "get {{ type_name: {type_name}, found: {found} }}")
            }
            SingletonEvent::Duplicate {
                type_name,
                constructed,
            } => write!(
                f,
                "duplicate {{ type_name: {type_name}, constructed: {constructed} }}"
            ),
            SingletonEvent::Failed {
                type_name,
                policy,
                permanent,
            } => write!(
                f,
                "failed {{ type_name: {type_name}, policy: {policy}, permanent: {permanent} }}"
            ),
        }
    }
}
