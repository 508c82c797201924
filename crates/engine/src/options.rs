//! Activity execution options

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::{duration_millis, RetryPolicy};

/// Options for activity execution
///
/// Serialized alongside the activity schedule; the engine enforces the
/// timeouts and drives the retry policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityOptions {
    /// Retry policy for this activity
    pub retry_policy: RetryPolicy,

    /// Maximum total time from scheduling to completion, across all attempts
    #[serde(with = "duration_millis")]
    pub schedule_to_close_timeout: Duration,

    /// Maximum time for a single attempt (from start to completion)
    #[serde(with = "duration_millis")]
    pub start_to_close_timeout: Duration,

    /// Heartbeat interval for long-running activities
    ///
    /// If set, workers must send heartbeats within this interval.
    #[serde(with = "option_duration_millis")]
    pub heartbeat_timeout: Option<Duration>,

    /// Task queue to dispatch on
    ///
    /// `None` routes to the caller's default queue. Node-local operations
    /// set this to the node's dedicated queue so they execute on that
    /// specific machine.
    pub task_queue: Option<String>,
}

impl Default for ActivityOptions {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            schedule_to_close_timeout: Duration::from_secs(600),
            start_to_close_timeout: Duration::from_secs(30),
            heartbeat_timeout: None,
            task_queue: None,
        }
    }
}

impl ActivityOptions {
    /// Create options with a specific retry policy
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Set the schedule-to-close timeout
    pub fn with_schedule_to_close_timeout(mut self, timeout: Duration) -> Self {
        self.schedule_to_close_timeout = timeout;
        self
    }

    /// Set the start-to-close timeout
    pub fn with_start_to_close_timeout(mut self, timeout: Duration) -> Self {
        self.start_to_close_timeout = timeout;
        self
    }

    /// Enable heartbeating with the specified timeout
    pub fn with_heartbeat(mut self, timeout: Duration) -> Self {
        self.heartbeat_timeout = Some(timeout);
        self
    }

    /// Route to a specific task queue
    pub fn with_task_queue(mut self, queue: impl Into<String>) -> Self {
        self.task_queue = Some(queue.into());
        self
    }
}

/// Serde support for Option<Duration> as milliseconds
mod option_duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => (d.as_millis() as u64).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis: Option<u64> = Option::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
