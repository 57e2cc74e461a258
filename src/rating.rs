//! Rating arithmetic shared by the item and seller aggregates.
//!
//! Averages are computed in integer hundredths so that rounding is exact
//! half-up at two decimals, then exposed as `f64`.

use crate::models::{RatingDistribution, Review};

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Mean of `ratings` rounded half-up to two decimals, `0.0` when empty.
pub fn average_rating<I>(ratings: I) -> f64
where
    I: IntoIterator<Item = i16>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0_i64, 0_i64), |(sum, count), r| (sum + i64::from(r), count + 1));
    average_from_totals(sum, count)
}

/// Same as [`average_rating`] but from a precomputed sum and count.
pub fn average_from_totals(sum: i64, count: i64) -> f64 {
    if count <= 0 {
        return 0.0;
    }
    // floor(sum * 100 / count + 1/2), all ratings are positive
    let hundredths = (sum * 200 + count) / (count * 2);
    hundredths as f64 / 100.0
}

/// Count reviews per rating value; every bucket is present.
pub fn distribution<'a, I>(reviews: I) -> RatingDistribution
where
    I: IntoIterator<Item = &'a Review>,
{
    distribution_of(reviews.into_iter().map(|r| r.rating))
}

pub fn distribution_of<I>(ratings: I) -> RatingDistribution
where
    I: IntoIterator<Item = i16>,
{
    let mut dist = RatingDistribution::default();
    for rating in ratings {
        dist.bump(rating);
    }
    dist
}

pub fn is_valid_rating(rating: i16) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}
