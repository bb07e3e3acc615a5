use serde::Serialize;

/// Elapsed seconds after which the display turns to the warning color.
pub const WARNING_AFTER_SECS: u64 = 5 * 60;

/// Elapsed seconds after which the display turns to the danger color.
pub const DANGER_AFTER_SECS: u64 = 10 * 60;

/// Color band of the elapsed-time display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimerTone {
    Normal,
    Warning,
    Danger,
}

/// Whole seconds since the attempt started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct ElapsedTime(u64);

impl ElapsedTime {
    #[must_use]
    pub fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Elapsed time between two instants; a `now` before `start` counts as zero.
    #[must_use]
    pub fn between(start: chrono::DateTime<chrono::Utc>, now: chrono::DateTime<chrono::Utc>) -> Self {
        let secs = (now - start).num_seconds();
        Self(u64::try_from(secs).unwrap_or(0))
    }

    #[must_use]
    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// `MM:SS`; minutes keep counting past 99.
    #[must_use]
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.0 / 60, self.0 % 60)
    }

    #[must_use]
    pub fn tone(&self) -> TimerTone {
        if self.0 > DANGER_AFTER_SECS {
            TimerTone::Danger
        } else if self.0 > WARNING_AFTER_SECS {
            TimerTone::Warning
        } else {
            TimerTone::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(ElapsedTime::from_secs(0).display(), "00:00");
        assert_eq!(ElapsedTime::from_secs(65).display(), "01:05");
        assert_eq!(ElapsedTime::from_secs(6_000).display(), "100:00");
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(ElapsedTime::from_secs(300).tone(), TimerTone::Normal);
        assert_eq!(ElapsedTime::from_secs(301).tone(), TimerTone::Warning);
        assert_eq!(ElapsedTime::from_secs(600).tone(), TimerTone::Warning);
        assert_eq!(ElapsedTime::from_secs(601).tone(), TimerTone::Danger);
    }

    #[test]
    fn clock_skew_counts_as_zero() {
        let start = fixed_now();
        let before = start - chrono::Duration::seconds(5);
        assert_eq!(ElapsedTime::between(start, before).as_secs(), 0);
        let later = start + chrono::Duration::seconds(90);
        assert_eq!(ElapsedTime::between(start, later).display(), "01:30");
    }
}
