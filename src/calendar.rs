use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Maximum number of days `time_until_open` will step forward looking for the
/// next opening before giving up with `CalendarError::NoUpcomingOpening`.
pub const MAX_LOOKAHEAD_DAYS: i64 = 366;

#[derive(Debug)]
pub enum CalendarError {
    MissingWeekday(Weekday),
    UnknownWeekday(String),
    InvalidInterval(String),
    IntervalOverlap {
        context: String,
        first: Interval,
        second: Interval,
    },
    InvalidHolidayRange {
        reason: String,
    },
    Yaml(serde_yaml::Error),
    DateMismatch {
        expected: NaiveDate,
        got: NaiveDate,
    },
    NoUpcomingOpening {
        lookahead_days: i64,
    },
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::MissingWeekday(day) => {
                write!(f, "weekly hours are missing {}", day_name(*day))
            }
            CalendarError::UnknownWeekday(name) => write!(f, "unknown weekday name '{name}'"),
            CalendarError::InvalidInterval(raw) => {
                write!(
                    f,
                    "invalid interval '{raw}' (expected HH:MM-HH:MM with open <= close)"
                )
            }
            CalendarError::IntervalOverlap {
                context,
                first,
                second,
            } => write!(f, "overlapping intervals for {context}: {first} and {second}"),
            CalendarError::InvalidHolidayRange { reason } => {
                write!(f, "holiday '{reason}' ends before it starts")
            }
            CalendarError::Yaml(err) => write!(f, "schedule config error: {err}"),
            CalendarError::DateMismatch { expected, got } => {
                write!(f, "{got} is on a different day than {expected}")
            }
            CalendarError::NoUpcomingOpening { lookahead_days } => {
                write!(f, "no opening found within {lookahead_days} days")
            }
        }
    }
}

impl std::error::Error for CalendarError {}

impl From<serde_yaml::Error> for CalendarError {
    fn from(value: serde_yaml::Error) -> Self {
        Self::Yaml(value)
    }
}

pub type CalendarResult<T> = Result<T, CalendarError>;

/// A single open-close span within a day. Membership is half-open: the open
/// minute counts as open, the close minute counts as closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl Interval {
    pub fn new(open: NaiveTime, close: NaiveTime) -> CalendarResult<Self> {
        if open > close {
            return Err(CalendarError::InvalidInterval(format!(
                "{}-{}",
                open.format("%H:%M"),
                close.format("%H:%M")
            )));
        }
        Ok(Self { open, close })
    }

    /// Parse an `"HH:MM-HH:MM"` string.
    pub fn parse(raw: &str) -> CalendarResult<Self> {
        let invalid = || CalendarError::InvalidInterval(raw.to_string());
        let (open, close) = raw.split_once('-').ok_or_else(invalid)?;
        let open = NaiveTime::parse_from_str(open.trim(), "%H:%M").map_err(|_| invalid())?;
        let close = NaiveTime::parse_from_str(close.trim(), "%H:%M").map_err(|_| invalid())?;
        if open > close {
            return Err(invalid());
        }
        Ok(Self { open, close })
    }

    pub fn contains(&self, when: NaiveTime) -> bool {
        self.open <= when && when < self.close
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.open.format("%H:%M"),
            self.close.format("%H:%M")
        )
    }
}

/// A date-range override of the weekly hours. An empty interval list means the
/// lab is closed for every date in the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: String,
    pub hours: Vec<Interval>,
}

impl Holiday {
    pub fn covers(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The hours in effect for one calendar date, after holiday overrides have
/// been applied. Recomputed per query, never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub holiday: Option<String>,
    pub hours: Vec<Interval>,
}

impl DayHours {
    pub fn closed_all_day(&self) -> bool {
        self.hours.is_empty()
    }

    pub fn weekday_name(&self) -> &'static str {
        day_name(self.weekday)
    }

    fn is_open_at(&self, time: NaiveTime) -> bool {
        self.hours.iter().any(|hour| hour.contains(time))
    }
}

/// Serializable form of a holiday entry as it appears in the schedule file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolidayConfig {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub reason: String,
    #[serde(default)]
    pub hours: Option<Vec<String>>,
}

/// Serializable form of the full schedule definition: weekday name to a list
/// of `"HH:MM-HH:MM"` strings, plus an ordered holiday list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabCalendarConfig {
    pub hours: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub holidays: Vec<HolidayConfig>,
}

/// Weekly lab hours with holiday overrides.
///
/// Construct once from an already-parsed schedule definition and reuse; every
/// query resolves a fresh `DayHours` snapshot for the date in question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabCalendar {
    weekly: HashMap<Weekday, Vec<Interval>>,
    holidays: Vec<Holiday>,
}

impl LabCalendar {
    const ALL_WEEKDAYS: [Weekday; 7] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Build a calendar from a weekly template and an ordered holiday list.
    ///
    /// The template must cover all seven weekdays (a day with no hours is an
    /// empty list, not a missing entry). Interval lists are sorted by opening
    /// time; overlaps are rejected.
    pub fn new(
        weekly: HashMap<Weekday, Vec<Interval>>,
        holidays: Vec<Holiday>,
    ) -> CalendarResult<Self> {
        let mut weekly = weekly;
        let mut holidays = holidays;

        for day in Self::ALL_WEEKDAYS {
            match weekly.get_mut(&day) {
                Some(hours) => normalize_hours(hours, day_name(day))?,
                None => return Err(CalendarError::MissingWeekday(day)),
            }
        }

        for holiday in holidays.iter_mut() {
            if holiday.end < holiday.start {
                return Err(CalendarError::InvalidHolidayRange {
                    reason: holiday.reason.clone(),
                });
            }
            let context = format!("holiday '{}'", holiday.reason);
            normalize_hours(&mut holiday.hours, &context)?;
        }

        tracing::debug!(holidays = holidays.len(), "lab calendar constructed");
        Ok(Self { weekly, holidays })
    }

    pub fn from_config(config: &LabCalendarConfig) -> CalendarResult<Self> {
        let mut weekly = HashMap::new();
        for (name, raw_hours) in &config.hours {
            let day = parse_weekday(name)?;
            let hours = raw_hours
                .iter()
                .map(|raw| Interval::parse(raw))
                .collect::<CalendarResult<Vec<_>>>()?;
            weekly.insert(day, hours);
        }

        let mut holidays = Vec::with_capacity(config.holidays.len());
        for entry in &config.holidays {
            let hours = entry
                .hours
                .as_deref()
                .unwrap_or_default()
                .iter()
                .map(|raw| Interval::parse(raw))
                .collect::<CalendarResult<Vec<_>>>()?;
            holidays.push(Holiday {
                start: entry.start,
                end: entry.end,
                reason: entry.reason.clone(),
                hours,
            });
        }

        Self::new(weekly, holidays)
    }

    /// Parse a YAML schedule definition and build a calendar from it.
    pub fn from_yaml(source: &str) -> CalendarResult<Self> {
        let config: LabCalendarConfig = serde_yaml::from_str(source)?;
        Self::from_config(&config)
    }

    pub fn to_config(&self) -> LabCalendarConfig {
        let mut hours = BTreeMap::new();
        for day in Self::ALL_WEEKDAYS {
            let rendered = self
                .weekly
                .get(&day)
                .map(|list| list.iter().map(Interval::to_string).collect())
                .unwrap_or_default();
            hours.insert(day_name(day).to_string(), rendered);
        }

        let holidays = self
            .holidays
            .iter()
            .map(|holiday| HolidayConfig {
                start: holiday.start,
                end: holiday.end,
                reason: holiday.reason.clone(),
                hours: if holiday.hours.is_empty() {
                    None
                } else {
                    Some(holiday.hours.iter().map(Interval::to_string).collect())
                },
            })
            .collect();

        LabCalendarConfig { hours, holidays }
    }

    /// Resolve the hours in effect for a date.
    ///
    /// The weekly template supplies the default; the first holiday whose
    /// inclusive range covers the date overrides it (list order decides when
    /// ranges overlap).
    pub fn resolve(&self, date: NaiveDate) -> DayHours {
        let weekday = date.weekday();
        let mut holiday = None;
        let mut hours = self.weekly.get(&weekday).cloned().unwrap_or_default();

        for entry in &self.holidays {
            if entry.covers(date) {
                holiday = Some(entry.reason.clone());
                hours = entry.hours.clone();
                break;
            }
        }

        DayHours {
            date,
            weekday,
            holiday,
            hours,
        }
    }

    /// Resolve the hours in effect for the current local date.
    pub fn today(&self) -> DayHours {
        self.resolve(Local::now().date_naive())
    }

    /// Whether the lab is open at `when` (defaults to now).
    pub fn is_open(&self, day: &DayHours, when: Option<NaiveDateTime>) -> CalendarResult<bool> {
        let when = effective_when(day, when)?;
        Ok(day.is_open_at(when.time()))
    }

    /// Time remaining until the lab next opens, zero if it is already open.
    ///
    /// Looks at the rest of `day` first, then steps forward one date at a
    /// time. Gives up after `MAX_LOOKAHEAD_DAYS` closed days so a schedule
    /// with no open hours at all surfaces an error instead of spinning.
    pub fn time_until_open(
        &self,
        day: &DayHours,
        when: Option<NaiveDateTime>,
    ) -> CalendarResult<Duration> {
        let when = effective_when(day, when)?;
        if day.is_open_at(when.time()) {
            return Ok(Duration::zero());
        }

        let next_today = day
            .hours
            .iter()
            .map(|hour| day.date.and_time(hour.open))
            .find(|open| *open > when);
        if let Some(open) = next_today {
            return Ok(open - when);
        }

        let mut date = day.date;
        for _ in 0..MAX_LOOKAHEAD_DAYS {
            date = date + Duration::days(1);
            let ahead = self.resolve(date);
            if let Some(first) = ahead.hours.first() {
                return Ok(date.and_time(first.open) - when);
            }
        }

        tracing::warn!(
            from = %day.date,
            lookahead_days = MAX_LOOKAHEAD_DAYS,
            "no upcoming opening within lookahead"
        );
        Err(CalendarError::NoUpcomingOpening {
            lookahead_days: MAX_LOOKAHEAD_DAYS,
        })
    }

    /// Time remaining until the current interval closes, zero if closed.
    pub fn time_until_close(
        &self,
        day: &DayHours,
        when: Option<NaiveDateTime>,
    ) -> CalendarResult<Duration> {
        let when = effective_when(day, when)?;
        // intervals never overlap, so at most one can contain `when`
        match day.hours.iter().find(|hour| hour.contains(when.time())) {
            Some(hour) => Ok(day.date.and_time(hour.close) - when),
            None => Ok(Duration::zero()),
        }
    }
}

fn effective_when(day: &DayHours, when: Option<NaiveDateTime>) -> CalendarResult<NaiveDateTime> {
    match when {
        Some(when) if when.date() != day.date => Err(CalendarError::DateMismatch {
            expected: day.date,
            got: when.date(),
        }),
        Some(when) => Ok(when),
        None => Ok(Local::now().naive_local()),
    }
}

fn normalize_hours(hours: &mut [Interval], context: &str) -> CalendarResult<()> {
    hours.sort_by_key(|hour| hour.open);
    for pair in hours.windows(2) {
        if pair[1].open < pair[0].close {
            return Err(CalendarError::IntervalOverlap {
                context: context.to_string(),
                first: pair[0],
                second: pair[1],
            });
        }
    }
    Ok(())
}

pub(crate) fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn parse_weekday(name: &str) -> CalendarResult<Weekday> {
    match name {
        "Monday" => Ok(Weekday::Mon),
        "Tuesday" => Ok(Weekday::Tue),
        "Wednesday" => Ok(Weekday::Wed),
        "Thursday" => Ok(Weekday::Thu),
        "Friday" => Ok(Weekday::Fri),
        "Saturday" => Ok(Weekday::Sat),
        "Sunday" => Ok(Weekday::Sun),
        _ => Err(CalendarError::UnknownWeekday(name.to_string())),
    }
}
