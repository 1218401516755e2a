use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::persistence::{PrintStore, StoreResult};

pub const WEEKDAY_QUOTA: u32 = 8;
pub const WEEKEND_QUOTA: u32 = 16;
pub const SEMESTERLY_QUOTA: u32 = 100;

/// Staff account whose quota is never looked up in storage.
const STAFF_USER: &str = "pubstaff";
const STAFF_QUOTA: u32 = 500;

/// A user's remaining printing allowance. `daily` never exceeds `semesterly`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserQuota {
    pub user: String,
    pub daily: u32,
    pub semesterly: u32,
}

/// Append-only record of one print job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintJob {
    pub user: String,
    pub time: NaiveDateTime,
    pub pages: u32,
    pub queue: String,
    pub printer: String,
    pub doc_name: String,
    pub filesize: u64,
}

/// Append-only record of pages credited back to a user by a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub user: String,
    pub time: NaiveDateTime,
    pub pages: u32,
    pub staffer: String,
    pub reason: String,
}

/// Return the daily page cap for a given day.
pub fn daily_quota(day: NaiveDate) -> u32 {
    match day.weekday() {
        Weekday::Sat | Weekday::Sun => WEEKEND_QUOTA,
        _ => WEEKDAY_QUOTA,
    }
}

/// Return the user's remaining quota as of today.
pub fn get_quota(store: &dyn PrintStore, user: &str) -> StoreResult<UserQuota> {
    get_quota_on(store, user, Local::now().date_naive())
}

/// Return the user's remaining quota for a given day.
///
/// The staff account bypasses storage entirely. Everyone else gets the stored
/// usage counters (zero if the user has never printed), with the daily
/// remainder capped by the semesterly remainder.
pub fn get_quota_on(store: &dyn PrintStore, user: &str, day: NaiveDate) -> StoreResult<UserQuota> {
    if user == STAFF_USER {
        return Ok(UserQuota {
            user: user.to_string(),
            daily: STAFF_QUOTA,
            semesterly: STAFF_QUOTA,
        });
    }

    let usage = store.pages_used(user)?.unwrap_or_default();
    let semesterly = SEMESTERLY_QUOTA.saturating_sub(usage.semester);
    let daily = daily_quota(day).saturating_sub(usage.today).min(semesterly);

    Ok(UserQuota {
        user: user.to_string(),
        daily,
        semesterly,
    })
}
