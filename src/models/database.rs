use std::{fmt, str::FromStr};

use chrono::NaiveTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BusRoute {
    pub route_id: i32,
    pub route_name: String,
}

/// Timetable category used both in upstream URLs and in the stored column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Weekdays,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 3] = [Weekday::Weekdays, Weekday::Saturday, Weekday::Sunday];

    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Weekdays => "weekdays",
            Weekday::Saturday => "saturday",
            Weekday::Sunday => "sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown weekday {0:?}")]
pub struct UnknownWeekday(String);

impl FromStr for Weekday {
    type Err = UnknownWeekday;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "weekdays" => Ok(Weekday::Weekdays),
            "saturday" => Ok(Weekday::Saturday),
            "sunday" => Ok(Weekday::Sunday),
            other => Err(UnknownWeekday(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BusTimetable {
    pub route_id: i32,
    pub start_stop_id: i32,
    pub departure_time: NaiveTime,
    pub weekday: Weekday,
}

impl BusTimetable {
    /// Composite identity of a stored timetable row.
    pub fn key(&self) -> (i32, i32, Weekday, NaiveTime) {
        (
            self.route_id,
            self.start_stop_id,
            self.weekday,
            self.departure_time,
        )
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::Weekday;

    #[test]
    fn weekday_text_round_trip() {
        for weekday in Weekday::ALL {
            assert_eq!(Weekday::from_str(weekday.as_str()).unwrap(), weekday);
        }
    }

    #[test]
    fn unknown_weekday_is_rejected() {
        assert!(Weekday::from_str("monday").is_err());
        assert!(Weekday::from_str("").is_err());
    }
}
