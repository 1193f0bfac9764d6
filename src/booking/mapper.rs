use crate::booking::display_event::{BookingKind, DisplayEvent, EventStyle, Placement, ResourceRef};
use crate::booking::resource::{RecurringClass, Session};

const ONE_ON_ONE_COLOR: &str = "#3b82f6";
const SMALL_GROUP_COLOR: &str = "#10b981";
const CLASS_BACKGROUND: &str = "#f59e0b";
const CLASS_TEXT: &str = "#000";

pub fn map_events(
    sessions: Option<&[Session]>,
    classes: Option<&[RecurringClass]>,
) -> Vec<DisplayEvent> {
    let (Some(sessions), Some(classes)) = (sessions, classes) else {
        return Vec::new();
    };

    sessions
        .iter()
        .map(map_session)
        .chain(classes.iter().map(map_class))
        .collect()
}

pub fn map_session(session: &Session) -> DisplayEvent {
    let (kind, title, color) = if session.is_group() {
        (BookingKind::SmallGroup, "Small-Group Slot", SMALL_GROUP_COLOR)
    } else {
        (BookingKind::OneOnOne, "1:1 Slot", ONE_ON_ONE_COLOR)
    };

    DisplayEvent {
        id: session.id.to_string(),
        title: title.to_string(),
        placement: Placement::Absolute {
            start: session.start_time,
            end: session.end_time,
        },
        style: EventStyle {
            color: Some(color.to_string()),
            background_color: None,
            text_color: None,
        },
        resource: ResourceRef {
            id: session.id,
            price: session.price_per_seat,
            max: session.max_participants,
            booked: session.current_bookings,
            kind,
        },
    }
}

pub fn map_class(class: &RecurringClass) -> DisplayEvent {
    DisplayEvent {
        id: format!("class-{}", class.id),
        title: class.title.clone(),
        placement: Placement::Weekly {
            days_of_week: vec![class.day_of_week],
            start_time: class.start_time,
            end_time: class.end_time,
        },
        style: EventStyle {
            color: None,
            background_color: Some(CLASS_BACKGROUND.to_string()),
            text_color: Some(CLASS_TEXT.to_string()),
        },
        resource: ResourceRef {
            id: class.id,
            price: class.price_per_seat,
            max: class.max_participants,
            booked: class.current_bookings,
            kind: BookingKind::Class,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveTime, Utc};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn session(id: u64, max_participants: u32) -> Session {
        Session {
            id,
            start_time: utc("2024-01-01T10:00:00Z"),
            end_time: utc("2024-01-01T11:00:00Z"),
            price_per_seat: 0,
            max_participants,
            current_bookings: 0,
        }
    }

    fn class(id: u64, day_of_week: u8) -> RecurringClass {
        RecurringClass {
            id,
            title: "Geometry".to_string(),
            day_of_week,
            start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            price_per_seat: 1200,
            max_participants: 10,
            current_bookings: 4,
        }
    }

    #[test]
    fn single_free_session_maps_to_one_on_one_event() {
        let sessions = vec![session(1, 1)];

        let events = map_events(Some(&sessions), Some(&[]));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "1");
        assert_eq!(events[0].kind(), BookingKind::OneOnOne);
        assert_eq!(events[0].title, "1:1 Slot");
        assert_eq!(
            events[0].placement,
            Placement::Absolute {
                start: utc("2024-01-01T10:00:00Z"),
                end: utc("2024-01-01T11:00:00Z"),
            }
        );
    }

    #[test]
    fn group_session_is_small_group() {
        let event = map_session(&session(2, 4));

        assert_eq!(event.kind(), BookingKind::SmallGroup);
        assert_eq!(event.style.color.as_deref(), Some(SMALL_GROUP_COLOR));
    }

    #[test]
    fn class_maps_to_weekly_placement() {
        let event = map_class(&class(9, 3));

        assert_eq!(event.id, "class-9");
        assert_eq!(event.kind(), BookingKind::Class);
        assert_eq!(
            event.placement,
            Placement::Weekly {
                days_of_week: vec![3],
                start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            }
        );
        assert_eq!(event.resource.booked, 4);
    }

    #[test]
    fn nothing_is_shown_until_both_sources_load() {
        let sessions = vec![session(1, 1)];
        let classes = vec![class(1, 1)];

        assert!(map_events(Some(&sessions), None).is_empty());
        assert!(map_events(None, Some(&classes)).is_empty());
    }

    #[test]
    fn sessions_come_before_classes() {
        let sessions = vec![session(1, 1), session(2, 3)];
        let classes = vec![class(1, 0)];

        let ids: Vec<String> = map_events(Some(&sessions), Some(&classes))
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec!["1", "2", "class-1"]);
    }

    proptest! {
        #[test]
        fn session_kind_follows_capacity(max in 0u32..50, booked in 0u32..50, offset in 0i64..10_000) {
            let mut s = session(5, max);
            s.current_bookings = booked;
            s.start_time += chrono::Duration::minutes(offset);
            s.end_time = s.start_time + chrono::Duration::minutes(60);

            let event = map_session(&s);

            let expected = if max > 1 { BookingKind::SmallGroup } else { BookingKind::OneOnOne };
            prop_assert_eq!(event.kind(), expected);
            prop_assert_eq!(event.placement, Placement::Absolute { start: s.start_time, end: s.end_time });
        }

        #[test]
        fn mapping_is_idempotent(count in 0usize..6, day in 0u8..7) {
            let sessions: Vec<Session> = (0..count as u64).map(|i| session(i, (i % 3) as u32 + 1)).collect();
            let classes = vec![class(1, day)];

            let first = map_events(Some(&sessions), Some(&classes));
            let second = map_events(Some(&sessions), Some(&classes));

            prop_assert_eq!(first.len(), count + 1);
            prop_assert_eq!(first, second);
        }
    }
}
