use chrono::NaiveDate;

/// This is the standard way of converting a date to a string in dayfold.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn app_capture_name(date: NaiveDate) -> String {
    format!("app_records_{}.json", date_key(date))
}

pub fn browser_capture_name(date: NaiveDate) -> String {
    format!("browser_visits_{}.json", date_key(date))
}

pub fn daily_record_name(date: NaiveDate) -> String {
    format!("daily_record_{}.json", date_key(date))
}

pub fn note_name(date: NaiveDate) -> String {
    format!("{}.md", date_key(date))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

    #[test]
    fn file_names_are_day_keyed() {
        assert_eq!(date_key(TEST_DATE), "2025-03-15");
        assert_eq!(app_capture_name(TEST_DATE), "app_records_2025-03-15.json");
        assert_eq!(
            browser_capture_name(TEST_DATE),
            "browser_visits_2025-03-15.json"
        );
        assert_eq!(daily_record_name(TEST_DATE), "daily_record_2025-03-15.json");
        assert_eq!(note_name(TEST_DATE), "2025-03-15.md");
    }
}
