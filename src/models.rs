use serde::{Deserialize, Serialize};

use crate::{entities::movie, rating::round_average_rating};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieModel {
    pub id: i32,
    pub title: String,
    pub year_of_release: i32,
    pub running_time: i32,
    pub average_rating: f64,
}

impl MovieModel {
    /// Unrated movies display an average of zero.
    pub fn new(movie: &movie::Model, average: Option<f64>) -> Self {
        Self {
            id: movie.id,
            title: movie.title.clone(),
            year_of_release: movie.year_of_release,
            running_time: movie.running_time,
            average_rating: average.map(round_average_rating).unwrap_or(0.0),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterMoviesRequest {
    pub genres: Option<Vec<String>>,
    pub title: Option<String>,
    pub year_of_release: Option<i32>,
}

impl FilterMoviesRequest {
    pub fn genres(&self) -> Option<&[String]> {
        self.genres.as_deref().filter(|g| !g.is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.genres().is_none() && self.title().is_none() && self.year_of_release.is_none()
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddMovieRatingRequest {
    pub movie_id: i32,
    pub user_id: i32,
    pub rating: i32,
}
