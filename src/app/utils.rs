// src/app/utils.rs
use chrono::{Datelike, Local, NaiveDate, Weekday};
use tracing::warn;

pub(crate) const ISO_DATE: &str = "%Y-%m-%d";

pub(crate) const fn weekday_cn(wd: Weekday) -> &'static str {
    match wd {
        Weekday::Mon => "周一",
        Weekday::Tue => "周二",
        Weekday::Wed => "周三",
        Weekday::Thu => "周四",
        Weekday::Fri => "周五",
        Weekday::Sat => "周六",
        Weekday::Sun => "周日",
    }
}

/// "3月9日（周六）" — month and day without padding.
pub fn format_day_label(date: NaiveDate) -> String {
    format!(
        "{}月{}日（{}）",
        date.month(),
        date.day(),
        weekday_cn(date.weekday())
    )
}

pub(crate) fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), ISO_DATE).ok()
}

/// Localized label for an ISO date; unparseable input comes back unchanged.
pub fn chinese_date(iso: &str) -> String {
    match parse_iso_date(iso) {
        Some(date) => format_day_label(date),
        None => {
            warn!("date conversion failed for {iso:?}");
            iso.to_string()
        }
    }
}

pub fn today_label() -> String {
    format!("今天是{}", format_day_label(Local::now().date_naive()))
}

/// "Hall 12" → "12", "3号厅" → "3".
pub(crate) fn hall_digits(hall: &str) -> String {
    hall.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches_label_shape(s: &str) -> bool {
        let Some((month, rest)) = s.split_once('月') else {
            return false;
        };
        let Some((day, rest)) = rest.split_once('日') else {
            return false;
        };
        let month_ok = month.parse::<u32>().is_ok_and(|m| (1..=12).contains(&m));
        let day_ok = day.parse::<u32>().is_ok_and(|d| (1..=31).contains(&d));
        let wd_ok = ["一", "二", "三", "四", "五", "六", "日"]
            .iter()
            .any(|w| rest == format!("（周{w}）"));
        month_ok && day_ok && wd_ok
    }

    #[test]
    fn formats_known_dates() {
        assert_eq!(chinese_date("2024-03-09"), "3月9日（周六）");
        assert_eq!(chinese_date("2023-03-12"), "3月12日（周日）");
        assert_eq!(chinese_date("2024-12-30"), "12月30日（周一）");
    }

    #[test]
    fn every_day_of_a_leap_year_has_the_label_shape() {
        let mut date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        while date.year() == 2024 {
            let iso = date.format(ISO_DATE).to_string();
            let label = chinese_date(&iso);
            assert!(matches_label_shape(&label), "{iso} -> {label}");
            assert_eq!(label, chinese_date(&iso));
            date = date.succ_opt().unwrap();
        }
    }

    #[test]
    fn malformed_input_is_returned_unchanged() {
        for bad in ["", "2024-13-01", "2024-02-30", "tomorrow", "09/03/2024"] {
            assert_eq!(chinese_date(bad), bad);
        }
    }

    #[test]
    fn hall_digits_keeps_ascii_digits_only() {
        assert_eq!(hall_digits("Hall1"), "1");
        assert_eq!(hall_digits("12号激光厅"), "12");
        assert_eq!(hall_digits("VIP厅"), "");
    }
}
