use chrono::NaiveDate;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use diesel::PgConnection;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_conn() -> Result<DbPool, PoolError> {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "postgres://quadrant:@localhost:5432/quadrant".to_string());
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder().build(manager)
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// Quarter label for a date, e.g. "2026-Q1".
pub fn quarter_label(date: NaiveDate) -> String {
    use chrono::Datelike;
    let q = (date.month0() / 3) + 1;
    format!("{}-Q{}", date.year(), q)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn quarter_label_covers_year_boundaries() {
        let jan = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        let dec = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
        assert_eq!(quarter_label(jan), "2026-Q1");
        assert_eq!(quarter_label(dec), "2025-Q4");
    }

    #[test]
    fn round1_keeps_one_decimal() {
        assert_eq!(round1(33.333), 33.3);
        assert_eq!(round1(66.666), 66.7);
        assert_eq!(round1(0.0), 0.0);
    }
}
