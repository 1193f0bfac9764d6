use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::booking::resource::ResourceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookingKind {
    OneOnOne,
    SmallGroup,
    Class,
}

impl BookingKind {
    pub fn label(&self) -> &'static str {
        match self {
            BookingKind::OneOnOne => "oneOnOne",
            BookingKind::SmallGroup => "smallGroup",
            BookingKind::Class => "class",
        }
    }

    pub fn call_type(&self) -> &'static str {
        match self {
            BookingKind::Class => "zoom",
            BookingKind::OneOnOne | BookingKind::SmallGroup => "discord",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Placement {
    Absolute {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Weekly {
        days_of_week: Vec<u8>,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStyle {
    pub color: Option<String>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: ResourceId,
    pub price: u32,
    pub max: u32,
    pub booked: u32,
    pub kind: BookingKind,
}

impl ResourceRef {
    pub fn is_full(&self) -> bool {
        self.booked >= self.max
    }

    pub fn seats_left(&self) -> u32 {
        self.max.saturating_sub(self.booked)
    }

    pub fn is_free(&self) -> bool {
        self.price == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEvent {
    pub id: String,
    pub title: String,
    pub placement: Placement,
    pub style: EventStyle,
    pub resource: ResourceRef,
}

impl DisplayEvent {
    pub fn kind(&self) -> BookingKind {
        self.resource.kind
    }
}
