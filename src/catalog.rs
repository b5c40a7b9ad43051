use tracing::debug;

use crate::{
    entities::movie,
    error::{AppError, AppResult},
    models::{AddMovieRatingRequest, FilterMoviesRequest, MovieModel},
    rating::{self, average_rating, by_average_then_title},
    store::{MovieStore, RatingWrite},
};

const TOP_COUNT: usize = 5;

pub async fn filter_movies(
    store: &MovieStore,
    filter: &FilterMoviesRequest,
) -> AppResult<Vec<MovieModel>> {
    if filter.is_empty() {
        return Err(AppError::validation("at least one of genres, title or yearOfRelease is required"));
    }

    let movies = store.movies_with_ratings().await?;
    debug!(total_movies = movies.len(), "filtering movies");

    let mut matched: Vec<(movie::Model, Option<f64>)> = movies
        .into_iter()
        .filter(|(m, _)| matches_filter(m, filter))
        .map(|(m, ratings)| (m, average_rating(ratings)))
        .collect();

    if matched.is_empty() {
        return Err(AppError::not_found("no movies match the filter"));
    }

    matched.sort_by(|(a, a_avg), (b, b_avg)| {
        by_average_then_title(*a_avg, &a.title, *b_avg, &b.title)
    });

    Ok(matched.iter().map(|(m, avg)| MovieModel::new(m, *avg)).collect())
}

fn matches_filter(movie: &movie::Model, filter: &FilterMoviesRequest) -> bool {
    if let Some(genres) = filter.genres() {
        let genre = movie.genre.to_lowercase();
        if !genres.iter().any(|g| g.to_lowercase() == genre) {
            return false;
        }
    }
    if let Some(title) = filter.title() {
        if !movie.title.to_lowercase().contains(&title.to_lowercase()) {
            return false;
        }
    }
    if let Some(year) = filter.year_of_release {
        if movie.year_of_release != year {
            return false;
        }
    }
    true
}

/// Picks the five best movies by raw average, then orders those five by their
/// rounded average. Rounding can reorder near-ties, so the second pass stays.
pub async fn top_by_average_rating(store: &MovieStore) -> AppResult<Vec<MovieModel>> {
    let mut ranked: Vec<(movie::Model, Option<f64>)> = store
        .movies_with_ratings()
        .await?
        .into_iter()
        .map(|(m, ratings)| (m, average_rating(ratings)))
        .collect();

    if ranked.is_empty() {
        return Err(AppError::not_found("no movies in the catalog"));
    }

    ranked.sort_by(|(a, a_avg), (b, b_avg)| {
        by_average_then_title(*a_avg, &a.title, *b_avg, &b.title)
    });
    ranked.truncate(TOP_COUNT);

    let mut top: Vec<MovieModel> = ranked.iter().map(|(m, avg)| MovieModel::new(m, *avg)).collect();
    top.sort_by(|a, b| {
        b.average_rating.total_cmp(&a.average_rating).then_with(|| a.title.cmp(&b.title))
    });
    Ok(top)
}

/// The user's five highest rated movies, each shown with its average across
/// all users.
pub async fn top_by_user(store: &MovieStore, user_id: i32) -> AppResult<Vec<MovieModel>> {
    if user_id < 1 {
        return Err(AppError::validation(format!("user id must be positive, got {user_id}")));
    }

    let mut rated = store.ratings_by_user(user_id).await?;
    if rated.is_empty() {
        return Err(AppError::not_found(format!("user {user_id} has no ratings")));
    }

    rated.sort_by(|(a, a_movie), (b, b_movie)| {
        b.rating.cmp(&a.rating).then_with(|| a_movie.title.cmp(&b_movie.title))
    });
    rated.truncate(TOP_COUNT);

    let ids: Vec<i32> = rated.iter().map(|(_, m)| m.id).collect();
    let averages = store.ratings_for_movies(&ids).await?;
    debug!(user_id, movies = ids.len(), "ranked user ratings");

    Ok(rated
        .iter()
        .map(|(_, m)| {
            let avg = averages.get(&m.id).and_then(|r| average_rating(r.iter().copied()));
            MovieModel::new(m, avg)
        })
        .collect())
}

pub async fn add_movie_rating(store: &MovieStore, req: AddMovieRatingRequest) -> AppResult<()> {
    if !rating::is_valid_rating(req.rating) {
        return Err(AppError::validation(format!(
            "rating must be between {} and {}, got {}",
            rating::MIN_RATING,
            rating::MAX_RATING,
            req.rating
        )));
    }

    match store.write_rating(req.user_id, req.movie_id, req.rating).await? {
        RatingWrite::MissingReference => Err(AppError::not_found(format!(
            "user {} or movie {} does not exist",
            req.user_id, req.movie_id
        ))),
        outcome => {
            debug!(
                user_id = req.user_id,
                movie_id = req.movie_id,
                rating = req.rating,
                ?outcome,
                "stored movie rating"
            );
            Ok(())
        },
    }
}
