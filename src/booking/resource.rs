use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub type ResourceId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: ResourceId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub price_per_seat: u32,
    pub max_participants: u32,
    #[serde(default)]
    pub current_bookings: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringClass {
    pub id: ResourceId,
    pub title: String,
    #[serde(deserialize_with = "deserialize_day_of_week")]
    pub day_of_week: u8,
    #[serde(deserialize_with = "deserialize_time_of_day")]
    pub start_time: NaiveTime,
    #[serde(deserialize_with = "deserialize_time_of_day")]
    pub end_time: NaiveTime,
    pub price_per_seat: u32,
    pub max_participants: u32,
    #[serde(default)]
    pub current_bookings: u32,
}

impl Session {
    pub fn is_full(&self) -> bool {
        self.current_bookings >= self.max_participants
    }

    pub fn is_group(&self) -> bool {
        self.max_participants > 1
    }
}

impl RecurringClass {
    pub fn is_full(&self) -> bool {
        self.current_bookings >= self.max_participants
    }
}

fn deserialize_day_of_week<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let day = u8::deserialize(deserializer)?;
    if day > 6 {
        return Err(serde::de::Error::custom(format!(
            "day_of_week must be between 0 and 6, got {}",
            day
        )));
    }
    Ok(day)
}

fn deserialize_time_of_day<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time_of_day(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("Invalid time of day: {}", raw))
    })
}

pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M:%S") {
        return Some(time);
    }
    if let Ok(time) = NaiveTime::parse_from_str(raw, "%H:%M") {
        return Some(time);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.time());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.time())
}
