use humantime::format_duration;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    time::Duration,
};

/// Human readable duration used in configuration files, e.g. `2s`, `500ms` or `1m 30s`.
///
/// `0`, `none`, `unlimited` and `disabled` all parse to a zero duration, which
/// configuration fields use to express "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayDuration {
    duration: Duration,
}

impl RelayDuration {
    pub fn new(duration: Duration) -> RelayDuration {
        RelayDuration { duration }
    }

    pub fn from_millis(millis: u64) -> RelayDuration {
        RelayDuration::new(Duration::from_millis(millis))
    }

    pub fn as_human_time_string(&self) -> String {
        format!("{}", format_duration(self.duration))
    }

    pub fn get_duration(&self) -> Duration {
        self.duration
    }

    pub fn is_zero(&self) -> bool {
        self.duration.is_zero()
    }
}

impl FromStr for RelayDuration {
    type Err = humantime::DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = &s.to_lowercase();
        if s == "0" || s == "unlimited" || s == "disabled" || s == "none" {
            Ok(RelayDuration {
                duration: Duration::ZERO,
            })
        } else {
            Ok(RelayDuration {
                duration: humantime::parse_duration(s)?,
            })
        }
    }
}

impl From<Duration> for RelayDuration {
    fn from(duration: Duration) -> Self {
        RelayDuration { duration }
    }
}

impl From<RelayDuration> for Duration {
    fn from(value: RelayDuration) -> Duration {
        value.duration
    }
}

impl Default for RelayDuration {
    fn default() -> Self {
        RelayDuration {
            duration: Duration::ZERO,
        }
    }
}

impl Display for RelayDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_human_time_string())
    }
}
