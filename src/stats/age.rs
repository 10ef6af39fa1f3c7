use chrono::{Datelike, NaiveDate};

/// Whole years elapsed between `date_of_birth` and `today`, one less if this year's birthday
/// hasn't happened yet.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> i32 {
    let birthday_pending = (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day());
    today.year() - date_of_birth.year() - i32::from(birthday_pending)
}
