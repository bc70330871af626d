//
//  Copyright 2024 Google, Inc.
//
//  Licensed under the Apache License, Version 2.0 (the "License");
//  you may not use this file except in compliance with the License.
//  You may obtain a copy of the License at:
//
//  http://www.apache.org/licenses/LICENSE-2.0
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.

//! # Time Display class

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, Local, NaiveDateTime, Timelike, Utc};

/// A timestamp with display helpers, seconds and sub-second nanos
/// since `std::time::UNIX_EPOCH`.
pub struct TimeDisplay {
    secs: i64,
    nsecs: u32,
}

impl TimeDisplay {
    pub fn new(secs: i64, nsecs: u32) -> TimeDisplay {
        TimeDisplay { secs, nsecs }
    }

    /// Date & time in UTC with the format YYYY-MM-DD-HH-MM-SS,
    /// usable in a file name.
    pub fn utc_display(&self) -> String {
        if let Some(datetime) = NaiveDateTime::from_timestamp_opt(self.secs, self.nsecs) {
            let utc = DateTime::<Utc>::from_naive_utc_and_offset(datetime, Utc);
            return format!(
                "{}-{:02}-{:02}-{:02}-{:02}-{:02}",
                utc.year(),
                utc.month(),
                utc.day(),
                utc.hour(),
                utc.minute(),
                utc.second()
            );
        }
        "INVALID-TIMESTAMP".to_string()
    }

    /// Time in UTC without date with the format HH:MM:SS.
    pub fn utc_display_hms(&self) -> String {
        if let Some(datetime) = NaiveDateTime::from_timestamp_opt(self.secs, self.nsecs) {
            let utc = DateTime::<Utc>::from_naive_utc_and_offset(datetime, Utc);
            return format!("{:02}:{:02}:{:02}", utc.hour(), utc.minute(), utc.second());
        }
        "INVALID".to_string()
    }
}

/// Local time for log lines, HH:MM:SS.mmm.
pub fn log_current_time() -> String {
    let now = Local::now();
    format!("{}.{:03}", now.format("%H:%M:%S"), now.timestamp_subsec_millis())
}

/// Current time as a `TimeDisplay`.
pub fn current_time_display() -> TimeDisplay {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => TimeDisplay::new(duration.as_secs() as i64, duration.subsec_nanos()),
        Err(_) => TimeDisplay::new(0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::TimeDisplay;

    #[test]
    fn epoch_display() {
        let epoch = TimeDisplay::new(0, 0);
        assert_eq!(epoch.utc_display(), "1970-01-01-00-00-00");
        assert_eq!(epoch.utc_display_hms(), "00:00:00");
    }

    #[test]
    fn invalid_timestamp() {
        let invalid = TimeDisplay::new(i64::MAX, u32::MAX);
        assert_eq!(invalid.utc_display(), "INVALID-TIMESTAMP");
        assert_eq!(invalid.utc_display_hms(), "INVALID");
    }
}
