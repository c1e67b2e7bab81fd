//! 顯示用格式化：價格、時長、日期與時間（俄語地區格式）

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};

const MONTHS_GENITIVE: [&str; 12] = [
    "января",
    "февраля",
    "марта",
    "апреля",
    "мая",
    "июня",
    "июля",
    "августа",
    "сентября",
    "октября",
    "ноября",
    "декабря",
];

pub fn format_price(price: f64) -> String {
    format!("{} ₽", price.round() as i64)
}

pub fn format_duration(minutes: u32) -> String {
    if minutes >= 60 {
        let h = minutes / 60;
        let m = minutes % 60;
        if m > 0 {
            format!("{} ч {} мин", h, m)
        } else {
            format!("{} ч", h)
        }
    } else {
        format!("{} мин", minutes)
    }
}

/// 解析後端的 ISO 時間；帶時區者換算成本地時間，不帶時區者視為本地時間
pub fn parse_local_datetime(iso: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(iso, fmt) {
            return Some(naive);
        }
    }
    NaiveDate::parse_from_str(iso, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// 例如 "15 февраля 2026 г."；無法解析時原樣返回
pub fn format_date(iso: &str) -> String {
    match parse_local_datetime(iso) {
        Some(dt) => format!(
            "{} {} {} г.",
            dt.day(),
            MONTHS_GENITIVE[dt.month0() as usize],
            dt.year()
        ),
        None => iso.to_string(),
    }
}

/// 例如 "15.02.2026"
pub fn format_short_date(iso: &str) -> String {
    match parse_local_datetime(iso) {
        Some(dt) => dt.format("%d.%m.%Y").to_string(),
        None => iso.to_string(),
    }
}

pub fn format_time(iso: &str) -> String {
    match parse_local_datetime(iso) {
        Some(dt) => format!("{:02}:{:02}", dt.hour(), dt.minute()),
        None => iso.to_string(),
    }
}

pub fn to_date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// 將日期與 "H:MM"/"HH:MM" 組合成不帶時區的 ISO 時間，例如 "2026-02-15T09:30:00"
pub fn to_iso_date_time(date: &str, time: &str) -> String {
    let padded = format!("{:0>5}", time);
    let normalized = match padded.split_once(':') {
        Some((h, m))
            if (1..=2).contains(&h.len())
                && m.len() == 2
                && h.chars().all(|c| c.is_ascii_digit())
                && m.chars().all(|c| c.is_ascii_digit()) =>
        {
            format!("{}:{}:00", h, m)
        }
        _ => padded,
    };
    format!("{}T{}", date, normalized)
}

/// 轉為 UTC 的 RFC 3339 字串（毫秒精度），用於保存同意時間
pub fn to_rfc3339_utc<Tz: TimeZone>(dt: &DateTime<Tz>) -> String {
    dt.with_timezone(&chrono::Utc).to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price_rounds() {
        assert_eq!(format_price(1500.0), "1500 ₽");
        assert_eq!(format_price(999.5), "1000 ₽");
        assert_eq!(format_price(0.4), "0 ₽");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45 мин");
        assert_eq!(format_duration(60), "1 ч");
        assert_eq!(format_duration(90), "1 ч 30 мин");
        assert_eq!(format_duration(120), "2 ч");
    }

    #[test]
    fn test_format_date_naive() {
        assert_eq!(format_date("2026-02-15T10:00:00"), "15 февраля 2026 г.");
        assert_eq!(format_date("2026-12-01"), "1 декабря 2026 г.");
        assert_eq!(format_date("not a date"), "not a date");
    }

    #[test]
    fn test_format_time_naive() {
        assert_eq!(format_time("2026-02-15T09:05:00"), "09:05");
        assert_eq!(format_short_date("2026-02-15T09:05:00"), "15.02.2026");
    }

    #[test]
    fn test_to_iso_date_time_pads_hours() {
        assert_eq!(to_iso_date_time("2026-02-15", "9:30"), "2026-02-15T09:30:00");
        assert_eq!(to_iso_date_time("2026-02-15", "14:00"), "2026-02-15T14:00:00");
    }

    #[test]
    fn test_to_iso_date_time_leaves_unrecognized_time() {
        assert_eq!(to_iso_date_time("2026-02-15", "noon"), "2026-02-15T0noon");
    }

    #[test]
    fn test_to_date_string() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
        assert_eq!(to_date_string(d), "2026-03-07");
    }

    #[test]
    fn test_to_rfc3339_utc_normalizes_offset() {
        let dt = DateTime::parse_from_rfc3339("2026-02-15T13:00:00.5+03:00").unwrap();
        assert_eq!(to_rfc3339_utc(&dt), "2026-02-15T10:00:00.500Z");
    }
}
