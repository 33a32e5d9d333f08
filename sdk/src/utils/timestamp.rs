use chrono::{DateTime, Utc};
use std::fmt::{Display, Formatter};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wall clock timestamp attached to ping replies.
///
/// # Example
///
/// ```
/// use pingrelay::utils::timestamp::RelayTimestamp;
///
/// let timestamp = RelayTimestamp::from_millis(1694968446131);
/// assert_eq!(timestamp.to_utc_string("%Y-%m-%d %H:%M:%S"), "2023-09-17 16:34:06");
/// assert_eq!(timestamp.as_millis(), 1694968446131);
/// ```
#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct RelayTimestamp(SystemTime);

pub const UTC_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

impl RelayTimestamp {
    pub fn now() -> Self {
        RelayTimestamp(SystemTime::now())
    }

    pub fn from_millis(millis: u64) -> Self {
        RelayTimestamp(UNIX_EPOCH + Duration::from_millis(millis))
    }

    /// Milliseconds since the Unix epoch, as carried on the wire.
    pub fn as_millis(&self) -> i64 {
        let millis = self
            .0
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        i64::try_from(millis).unwrap_or(i64::MAX)
    }

    pub fn to_utc_string(&self, format: &str) -> String {
        DateTime::<Utc>::from(self.0).format(format).to_string()
    }
}

impl Default for RelayTimestamp {
    fn default() -> Self {
        Self::now()
    }
}

impl Display for RelayTimestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_utc_string(UTC_TIME_FORMAT))
    }
}
