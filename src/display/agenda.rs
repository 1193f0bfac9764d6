use chrono::{Local, Weekday};

use crate::booking::display_event::{DisplayEvent, Placement};
use crate::selection::rules::WorkHours;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

pub fn format_price(cents: impl Into<u64>) -> String {
    let cents: u64 = cents.into();
    if cents == 0 {
        "free".to_string()
    } else {
        format!("${}.{:02}", cents / 100, cents % 100)
    }
}

pub fn format_agenda_text(events: &[DisplayEvent], hours: &WorkHours) -> String {
    let mut lines = vec![
        format!(
            "Available slots ({}-{})",
            hours.open().format("%H:%M"),
            hours.close().format("%H:%M")
        ),
        String::new(),
    ];

    if events.is_empty() {
        lines.push("No slots available.".to_string());
    } else {
        for event in events {
            lines.push(format!("- {}", build_agenda_line(event)));
        }
    }

    lines.join("\n")
}

fn build_agenda_line(event: &DisplayEvent) -> String {
    let when = match &event.placement {
        Placement::Absolute { start, end } => {
            let start_local = start.with_timezone(&Local);
            let end_local = end.with_timezone(&Local);
            format!(
                "{} {}-{}",
                start_local.format("%a %Y-%m-%d"),
                start_local.format("%H:%M"),
                end_local.format("%H:%M")
            )
        }
        Placement::Weekly { days_of_week, start_time, end_time } => {
            let days: Vec<String> = days_of_week
                .iter()
                .filter_map(|d| WEEKDAYS.get(usize::from(*d)))
                .map(|d| d.to_string())
                .collect();
            format!(
                "every {} {}-{}",
                days.join("/"),
                start_time.format("%H:%M"),
                end_time.format("%H:%M")
            )
        }
    };

    let seats = if event.resource.is_full() {
        "full".to_string()
    } else {
        format!("{} of {} left", event.resource.seats_left(), event.resource.max)
    };

    format!(
        "[{}] {:<28} {} ({}, {})",
        event.id,
        when,
        event.title,
        format_price(event.resource.price),
        seats
    )
}
