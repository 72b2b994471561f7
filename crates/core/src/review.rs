//! Review aggregation.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::types::Rating;

/// Average rating and review count for one product.
///
/// Always computed from the reviews as they are now; nothing is cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RatingSummary {
    /// Mean rating rounded to one decimal, or zero without reviews.
    pub average: Decimal,
    /// Number of reviews.
    pub count: u64,
}

impl RatingSummary {
    /// Summarize a set of ratings.
    #[must_use]
    pub fn from_ratings<I>(ratings: I) -> Self
    where
        I: IntoIterator<Item = Rating>,
    {
        let (count, sum) = ratings
            .into_iter()
            .fold((0u64, 0u64), |(count, sum), r| (count + 1, sum + u64::from(r.value())));
        Self::from_totals(count, sum)
    }

    /// Summarize from a review count and the sum of their ratings, as
    /// returned by `COUNT(*)` / `SUM(rating)`.
    #[must_use]
    pub fn from_totals(count: u64, sum: u64) -> Self {
        if count == 0 {
            return Self::default();
        }
        let average = (Decimal::from(sum) / Decimal::from(count))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        Self { average, count }
    }

    /// Whether the product has any reviews.
    #[must_use]
    pub const fn has_reviews(&self) -> bool {
        self.count > 0
    }

    /// Whole stars to fill when rendering, 0-5.
    #[must_use]
    pub fn filled_stars(&self) -> u8 {
        let rounded = self
            .average
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        rounded.to_string().parse::<u8>().unwrap_or(0).min(Rating::MAX)
    }
}

impl fmt::Display for RatingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count == 0 {
            f.write_str("0")
        } else {
            write!(f, "{:.1}", self.average)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ratings(values: &[i64]) -> Vec<Rating> {
        values.iter().map(|v| Rating::new(*v).unwrap()).collect()
    }

    #[test]
    fn test_no_reviews_is_zero() {
        let summary = RatingSummary::from_ratings(Vec::new());
        assert_eq!(summary.average, Decimal::ZERO);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.to_string(), "0");
        assert!(!summary.has_reviews());
    }

    #[test]
    fn test_mean_rounded_to_one_decimal() {
        let summary = RatingSummary::from_ratings(ratings(&[5, 4]));
        assert_eq!(summary.average, Decimal::new(45, 1));
        assert_eq!(summary.count, 2);

        // 13 / 3 = 4.333...
        let summary = RatingSummary::from_ratings(ratings(&[5, 4, 4]));
        assert_eq!(summary.average, Decimal::new(43, 1));
        assert_eq!(summary.to_string(), "4.3");

        // 14 / 3 = 4.666...
        let summary = RatingSummary::from_ratings(ratings(&[5, 5, 4]));
        assert_eq!(summary.average, Decimal::new(47, 1));
    }

    #[test]
    fn test_average_stays_in_bounds() {
        for set in [&[1][..], &[5, 5, 5], &[1, 2, 3, 4, 5], &[3, 1]] {
            let summary = RatingSummary::from_ratings(ratings(set));
            assert!(summary.average >= Decimal::ONE);
            assert!(summary.average <= Decimal::from(5));
        }
    }

    #[test]
    fn test_new_review_is_reflected() {
        let mut all = ratings(&[3]);
        let before = RatingSummary::from_ratings(all.clone());
        all.push(Rating::new(5).unwrap());
        let after = RatingSummary::from_ratings(all);
        assert_eq!(before.average, Decimal::from(3));
        assert_eq!(after.average, Decimal::from(4));
        assert_eq!(after.count, 2);
    }

    #[test]
    fn test_from_totals_matches_from_ratings() {
        let from_list = RatingSummary::from_ratings(ratings(&[5, 4, 3, 5]));
        let from_sql = RatingSummary::from_totals(4, 17);
        assert_eq!(from_list, from_sql);
    }

    #[test]
    fn test_filled_stars() {
        assert_eq!(RatingSummary::from_totals(2, 9).filled_stars(), 5);
        assert_eq!(RatingSummary::from_totals(3, 13).filled_stars(), 4);
        assert_eq!(RatingSummary::default().filled_stars(), 0);
    }
}
