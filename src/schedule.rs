use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

const ALL_CARS_BUSY_MSG: &str = "Thank you so much for your interest! All cars are \
currently full, please check again shortly!";

/// Inclusive hour-of-day window, e.g. `10..=22`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: u32,
    pub end: u32,
}

impl TimeRange {
    fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour <= self.end
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySchedule {
    /// Human-readable hours, shown to riders in the apology copy.
    pub label: String,
    pub ranges: Vec<TimeRange>,
}

/// Weekly service-hours table, indexed Monday through Sunday. Consumed only
/// to pick apology copy when no cars are available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklySchedule {
    days: [DaySchedule; 7],
}

impl WeeklySchedule {
    pub fn new(days: [DaySchedule; 7]) -> Self {
        Self { days }
    }

    pub fn always_open() -> Self {
        let day = DaySchedule {
            label: "all day".to_string(),
            ranges: vec![TimeRange { start: 0, end: 23 }],
        };
        Self {
            days: std::array::from_fn(|_| day.clone()),
        }
    }

    fn day(&self, now: DateTime<Utc>) -> &DaySchedule {
        &self.days[now.weekday().num_days_from_monday() as usize]
    }

    pub fn label(&self, now: DateTime<Utc>) -> &str {
        &self.day(now).label
    }

    pub fn is_out_of_schedule(&self, now: DateTime<Utc>) -> bool {
        let day = self.day(now);
        if day.ranges.is_empty() {
            return true;
        }

        // 22:15 counts as 23:00: a started hour is checked against the next
        // full one.
        let mut hour = now.hour();
        if now.minute() > 0 {
            hour = (hour + 1) % 24;
        }

        !day.ranges.iter().any(|range| range.contains(hour))
    }

    /// Apology copy for the no-cars-available reply, schedule-aware when the
    /// request falls outside today's service hours.
    pub fn sorry_message(&self, now: DateTime<Utc>) -> String {
        if self.is_out_of_schedule(now) {
            format!(
                "Thank you so much for your interest! Cars are available today \
from {}. Please try again later.",
                self.label(now)
            )
        } else {
            ALL_CARS_BUSY_MSG.to_string()
        }
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::always_open()
    }
}
