//! Client configuration.

use std::time::Duration;

use crate::timer::MIN_TICK_INTERVAL;

/// Default server base URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

/// Seconds per question; matches the host's question interval
pub const DEFAULT_MAX_DURATION: u32 = 10;

const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// How to resolve a verdict that names neither correct nor incorrect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguousPolicy {
    /// Absence of an explicit "incorrect" counts as correct
    #[default]
    TreatAsCorrect,
    TreatAsIncorrect,
}

/// Configuration of one participant session
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    pub max_duration: u32,
    pub tick_interval: Duration,
    pub event_capacity: usize,
    pub ambiguous_policy: AmbiguousPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            max_duration: DEFAULT_MAX_DURATION,
            tick_interval: DEFAULT_TICK_INTERVAL,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            ambiguous_policy: AmbiguousPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            ..Self::default()
        }
    }

    pub fn with_max_duration(mut self, seconds: u32) -> Self {
        self.max_duration = seconds;
        self
    }

    /// Tests shorten this; production keeps one second. Never below
    /// [`MIN_TICK_INTERVAL`].
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(MIN_TICK_INTERVAL);
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    pub fn with_ambiguous_policy(mut self, policy: AmbiguousPolicy) -> Self {
        self.ambiguous_policy = policy;
        self
    }
}
