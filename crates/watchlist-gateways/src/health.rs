use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Availability of one remote dependency, fixed by a single probe.
///
/// `Unprobed` moves to `Available` or `Unavailable` exactly once; both are terminal
/// for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceHealth {
    Unprobed,
    Available,
    Unavailable,
}

impl ServiceHealth {
    pub fn is_available(self) -> bool {
        self == ServiceHealth::Available
    }

    /// Record the probe result. Ignored once the state has been resolved.
    pub fn resolve(&mut self, probe_succeeded: bool) -> ServiceHealth {
        match self {
            ServiceHealth::Unprobed => {
                *self = if probe_succeeded {
                    ServiceHealth::Available
                } else {
                    ServiceHealth::Unavailable
                };
            }
            ref resolved => {
                debug!(
                    state = %resolved,
                    probe_succeeded,
                    "Ignoring repeated probe result, health is fixed for this session"
                );
            }
        }
        *self
    }
}

impl fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceHealth::Unprobed => write!(f, "unprobed"),
            ServiceHealth::Available => write!(f, "available"),
            ServiceHealth::Unavailable => write!(f, "unavailable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_once() {
        let mut health = ServiceHealth::Unprobed;
        assert!(!health.is_available());

        assert_eq!(health.resolve(true), ServiceHealth::Available);
        assert_eq!(health.resolve(false), ServiceHealth::Available);
    }

    #[test]
    fn test_unavailable_is_terminal() {
        let mut health = ServiceHealth::Unprobed;
        health.resolve(false);
        assert_eq!(health.resolve(true), ServiceHealth::Unavailable);
        assert!(!health.is_available());
    }
}
