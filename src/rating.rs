use std::cmp::Ordering;

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub fn is_valid_rating(rating: i32) -> bool {
    (MIN_RATING..=MAX_RATING).contains(&rating)
}

/// Arithmetic mean of the given ratings, `None` when there are none.
pub fn average_rating<I>(ratings: I) -> Option<f64>
where
    I: IntoIterator<Item = i32>,
{
    let (sum, count) = ratings
        .into_iter()
        .fold((0i64, 0u32), |(sum, count), r| (sum + i64::from(r), count + 1));
    (count > 0).then(|| sum as f64 / f64::from(count))
}

/// Rounds to the nearest half point, ties away from zero.
pub fn round_average_rating(average: f64) -> f64 {
    (average * 2.0).round() / 2.0
}

/// Descending by average (unrated last), then ascending by title.
pub fn by_average_then_title(
    a_avg: Option<f64>,
    a_title: &str,
    b_avg: Option<f64>,
    b_title: &str,
) -> Ordering {
    let by_avg = match (a_avg, b_avg) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_avg.then_with(|| a_title.cmp(b_title))
}
