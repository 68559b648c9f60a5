//! Basal metabolic rate and daily calorie target (Mifflin-St Jeor).

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use coresync_db::models::ActivityLevel;

pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_AGE: u32 = 25;

/// Body measurements, any of which may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyMetrics {
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub date_of_birth: Option<NaiveDate>,
}

/// BMR calculation result, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BmrReport {
    pub bmr: i64,
    pub daily_target: i64,
    pub activity_level: ActivityLevel,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
}

/// Whole years between `date_of_birth` and `today`. Zero for future dates.
pub fn age_on(date_of_birth: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - date_of_birth.year();
    if (today.month(), today.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).unwrap_or(0)
}

/// `10w + 6.25h - 5a + 5`, scaled by the activity multiplier. Missing or
/// non-positive measurements use the defaults above.
pub fn compute_bmr(metrics: &BodyMetrics, activity: ActivityLevel, today: NaiveDate) -> BmrReport {
    let weight_kg = metrics
        .weight_kg
        .filter(|w| *w > 0.0)
        .unwrap_or(DEFAULT_WEIGHT_KG);
    let height_cm = metrics
        .height_cm
        .filter(|h| *h > 0.0)
        .unwrap_or(DEFAULT_HEIGHT_CM);
    let age = metrics
        .date_of_birth
        .map_or(DEFAULT_AGE, |dob| age_on(dob, today));

    let bmr = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age) + 5.0;
    BmrReport {
        bmr: bmr as i64,
        daily_target: (bmr * activity.multiplier()) as i64,
        activity_level: activity,
        weight_kg,
        height_cm,
        age,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn defaults_apply_without_metrics() {
        let report = compute_bmr(&BodyMetrics::default(), ActivityLevel::Moderate, date(2026, 1, 1));
        // 700 + 1062.5 - 125 + 5
        assert_eq!(report.bmr, 1642);
        assert_eq!(report.daily_target, 2545);
        assert_eq!(report.age, DEFAULT_AGE);
        assert_eq!(report.weight_kg, DEFAULT_WEIGHT_KG);
    }

    #[test]
    fn uses_profile_measurements() {
        let metrics = BodyMetrics {
            weight_kg: Some(80.0),
            height_cm: Some(180.0),
            date_of_birth: Some(date(1996, 6, 15)),
        };
        let report = compute_bmr(&metrics, ActivityLevel::Sedentary, date(2026, 6, 14));
        assert_eq!(report.age, 29);
        // 800 + 1125 - 145 + 5
        assert_eq!(report.bmr, 1785);
        assert_eq!(report.daily_target, 2142);
    }

    #[test]
    fn age_counts_birthday_as_passed() {
        assert_eq!(age_on(date(2000, 3, 10), date(2026, 3, 10)), 26);
        assert_eq!(age_on(date(2000, 3, 10), date(2026, 3, 9)), 25);
        assert_eq!(age_on(date(2030, 1, 1), date(2026, 1, 1)), 0);
    }

    #[test]
    fn zero_weight_uses_default() {
        let metrics = BodyMetrics {
            weight_kg: Some(0.0),
            ..BodyMetrics::default()
        };
        let report = compute_bmr(&metrics, ActivityLevel::VeryActive, date(2026, 1, 1));
        assert_eq!(report.weight_kg, DEFAULT_WEIGHT_KG);
        assert_eq!(report.daily_target, (1642.5_f64 * 1.9) as i64);
    }
}
