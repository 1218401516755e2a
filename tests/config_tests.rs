use chrono::NaiveDate;
use lab_tool::calendar::{CalendarError, LabCalendar};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

const SCHEDULE: &str = r#"
hours:
  Monday: ['11:10-13:00', '14:10-18:00']
  Tuesday: ['09:00-21:00']
  Wednesday: ['09:00-21:00']
  Thursday: ['09:00-21:00']
  Friday: ['09:00-21:00']
  Saturday: ['12:00-17:00']
  Sunday: []
holidays:
  - start: 2015-11-26
    end: 2015-11-26
    reason: Thanksgiving
    hours: ['11:00-14:00']
  - start: 2015-12-19
    end: 2016-01-18
    reason: Winter Break
    hours: []
"#;

#[test]
fn loads_schedule_from_yaml() {
    let calendar = LabCalendar::from_yaml(SCHEDULE).unwrap();

    // 2015-10-12 is an ordinary Monday
    let monday = calendar.resolve(d(2015, 10, 12));
    assert_eq!(monday.holiday, None);
    assert_eq!(monday.hours.len(), 2);
    assert_eq!(monday.hours[0].to_string(), "11:10-13:00");
    assert_eq!(monday.hours[1].to_string(), "14:10-18:00");

    // Sundays have no hours but are not a holiday
    let sunday = calendar.resolve(d(2015, 10, 11));
    assert_eq!(sunday.holiday, None);
    assert!(sunday.closed_all_day());
}

#[test]
fn yaml_holidays_override_in_order() {
    let calendar = LabCalendar::from_yaml(SCHEDULE).unwrap();

    let thanksgiving = calendar.resolve(d(2015, 11, 26));
    assert_eq!(thanksgiving.holiday.as_deref(), Some("Thanksgiving"));
    assert_eq!(thanksgiving.hours.len(), 1);
    assert_eq!(thanksgiving.hours[0].to_string(), "11:00-14:00");

    let break_day = calendar.resolve(d(2015, 12, 25));
    assert_eq!(break_day.holiday.as_deref(), Some("Winter Break"));
    assert!(break_day.closed_all_day());
}

#[test]
fn holiday_without_hours_key_is_closed() {
    let source = r#"
hours:
  Monday: []
  Tuesday: []
  Wednesday: []
  Thursday: []
  Friday: []
  Saturday: []
  Sunday: []
holidays:
  - start: 2015-12-25
    end: 2015-12-25
    reason: Christmas
"#;
    let calendar = LabCalendar::from_yaml(source).unwrap();
    let day = calendar.resolve(d(2015, 12, 25));
    assert_eq!(day.holiday.as_deref(), Some("Christmas"));
    assert!(day.closed_all_day());
}

#[test]
fn missing_weekday_in_yaml_rejected() {
    let source = r#"
hours:
  Monday: ['09:00-21:00']
  Tuesday: ['09:00-21:00']
  Wednesday: ['09:00-21:00']
  Thursday: ['09:00-21:00']
  Friday: ['09:00-21:00']
  Saturday: ['12:00-17:00']
"#;
    let err = LabCalendar::from_yaml(source).unwrap_err();
    assert!(matches!(err, CalendarError::MissingWeekday(_)));
}

#[test]
fn unknown_weekday_name_rejected() {
    let source = r#"
hours:
  Funday: ['09:00-21:00']
"#;
    let err = LabCalendar::from_yaml(source).unwrap_err();
    match err {
        CalendarError::UnknownWeekday(name) => assert_eq!(name, "Funday"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn malformed_interval_rejected() {
    let source = r#"
hours:
  Monday: ['9am-21:00']
  Tuesday: []
  Wednesday: []
  Thursday: []
  Friday: []
  Saturday: []
  Sunday: []
"#;
    let err = LabCalendar::from_yaml(source).unwrap_err();
    match err {
        CalendarError::InvalidInterval(raw) => assert_eq!(raw, "9am-21:00"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn interval_closing_before_opening_rejected() {
    let source = r#"
hours:
  Monday: ['21:00-09:00']
  Tuesday: []
  Wednesday: []
  Thursday: []
  Friday: []
  Saturday: []
  Sunday: []
"#;
    let err = LabCalendar::from_yaml(source).unwrap_err();
    assert!(matches!(err, CalendarError::InvalidInterval(_)));
}

#[test]
fn config_round_trips() {
    let calendar = LabCalendar::from_yaml(SCHEDULE).unwrap();
    let rebuilt = LabCalendar::from_config(&calendar.to_config()).unwrap();
    assert_eq!(calendar, rebuilt);
}
