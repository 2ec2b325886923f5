//! 时间工具函数：时钟注入与业务时区日历日
//!
//! 缓存过期和清理任务都通过 [`Clock`] 读取当前时间，测试中注入 [`ManualClock`] 即可控制时间。

use chrono::{DateTime, Duration, NaiveDate, Utc};
use chrono_tz::Tz;
use parking_lot::Mutex;

use shared::error::{AppError, AppResult};

/// 时钟
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动时钟（测试用）
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock() = instant;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// 业务时区中的一个日历日
///
/// `start` 为当日零点，`end` 为次日零点，查询使用 `[start, end)` 语义。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CalendarDay {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// `instant` 在业务时区 `tz` 下所属的日历日
pub fn calendar_day(instant: DateTime<Utc>, tz: Tz) -> CalendarDay {
    let date = instant.with_timezone(&tz).date_naive();
    let next = date.succ_opt().unwrap_or(date);
    CalendarDay {
        date,
        start: local_midnight(date, tz),
        end: local_midnight(next, tz),
    }
}

/// 日期零点 → UTC (业务时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let naive = date.and_time(chrono::NaiveTime::MIN);
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// 解析 IANA 时区名称
pub fn parse_timezone(name: &str) -> AppResult<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| AppError::validation(format!("Invalid timezone: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_advance() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        clock.advance(Duration::hours(2));
        assert_eq!(clock.now(), start + Duration::hours(2));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_calendar_day_utc() {
        let instant = Utc.with_ymd_and_hms(2024, 3, 10, 15, 30, 0).unwrap();
        let day = calendar_day(instant, chrono_tz::UTC);
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
        assert_eq!(day.start, Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap());
        assert_eq!(day.end, Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap());
        assert!(day.contains(instant));
        assert!(!day.contains(day.end));
    }

    #[test]
    fn test_calendar_day_in_business_timezone() {
        // 23:30 UTC is already the next day in Madrid
        let instant = Utc.with_ymd_and_hms(2024, 6, 1, 23, 30, 0).unwrap();
        let day = calendar_day(instant, chrono_tz::Europe::Madrid);
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        assert_eq!(day.start, Utc.with_ymd_and_hms(2024, 6, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("Europe/Madrid").is_ok());
        assert!(parse_timezone("Mars/Olympus").is_err());
    }
}
