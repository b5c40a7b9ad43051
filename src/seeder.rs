use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};

use crate::{
    entities::{movie, movie_rating, user},
    error::AppResult,
};

const USERS: [&str; 3] = ["User1", "User2", "User3"];

/// Title, year of release, running time, genre.
const MOVIES: [(&str, i32, i32, &str); 8] = [
    ("Movie1", 2000, 100, "Genre1"),
    ("Movie2", 2000, 100, "Genre2"),
    ("Movie3", 2001, 101, "Genre2"),
    ("Movie4", 2001, 101, "Genre3"),
    ("Movie5", 2002, 120, "Genre3"),
    ("Movie6", 2002, 121, "Genre2"),
    ("Movie7", 2002, 103, "Genre1"),
    ("Movie8", 2003, 107, "Genre4"),
];

/// User, movie, rating.
const RATINGS: [(&str, &str, i32); 23] = [
    ("User1", "Movie1", 5),
    ("User1", "Movie2", 4),
    ("User1", "Movie3", 4),
    ("User1", "Movie4", 3),
    ("User1", "Movie5", 3),
    ("User1", "Movie6", 1),
    ("User1", "Movie7", 2),
    ("User1", "Movie8", 2),
    ("User2", "Movie1", 4),
    ("User2", "Movie2", 3),
    ("User2", "Movie3", 3),
    ("User2", "Movie4", 2),
    ("User2", "Movie5", 2),
    ("User2", "Movie6", 5),
    ("User2", "Movie7", 3),
    ("User2", "Movie8", 3),
    ("User3", "Movie1", 2),
    ("User3", "Movie2", 1),
    ("User3", "Movie3", 4),
    ("User3", "Movie4", 5),
    ("User3", "Movie5", 3),
    ("User3", "Movie6", 2),
    ("User3", "Movie7", 1),
];

/// Rows written by [`seed`], with the ids the database assigned.
#[derive(Clone, Debug)]
pub struct Fixture {
    pub users: Vec<user::Model>,
    pub movies: Vec<movie::Model>,
    pub ratings: Vec<movie_rating::Model>,
}

#[cfg(test)]
impl Fixture {
    pub fn user(&self, name: &str) -> &user::Model {
        self.users
            .iter()
            .find(|u| u.name == name)
            .unwrap_or_else(|| panic!("no seeded user {name}"))
    }

    pub fn movie(&self, title: &str) -> &movie::Model {
        self.movies
            .iter()
            .find(|m| m.title == title)
            .unwrap_or_else(|| panic!("no seeded movie {title}"))
    }
}

fn rating_row(
    users: &[user::Model],
    movies: &[movie::Model],
    user_name: &str,
    title: &str,
    rating: i32,
) -> AppResult<movie_rating::ActiveModel> {
    let user = users
        .iter()
        .find(|u| u.name == user_name)
        .ok_or_else(|| anyhow::anyhow!("seed rating refers to unknown user {user_name}"))?;
    let movie = movies
        .iter()
        .find(|m| m.title == title)
        .ok_or_else(|| anyhow::anyhow!("seed rating refers to unknown movie {title}"))?;

    Ok(movie_rating::ActiveModel {
        user_id: Set(user.id),
        movie_id: Set(movie.id),
        rating: Set(rating),
        ..Default::default()
    })
}

/// Wipes every catalog table and writes the sample data set.
pub async fn seed(db: &DatabaseConnection) -> AppResult<Fixture> {
    let txn = db.begin().await?;

    let removed = movie_rating::Entity::delete_many().exec(&txn).await?;
    user::Entity::delete_many().exec(&txn).await?;
    movie::Entity::delete_many().exec(&txn).await?;
    tracing::debug!(ratings = removed.rows_affected, "cleared catalog");

    let mut users = Vec::with_capacity(USERS.len());
    for name in USERS {
        let model = user::ActiveModel { name: Set(name.to_string()), ..Default::default() };
        users.push(model.insert(&txn).await?);
    }

    let mut movies = Vec::with_capacity(MOVIES.len());
    for (title, year_of_release, running_time, genre) in MOVIES {
        let model = movie::ActiveModel {
            title: Set(title.to_string()),
            year_of_release: Set(year_of_release),
            running_time: Set(running_time),
            genre: Set(genre.to_string()),
            ..Default::default()
        };
        movies.push(model.insert(&txn).await?);
    }

    let mut ratings = Vec::with_capacity(RATINGS.len());
    for (user_name, title, rating) in RATINGS {
        let model = rating_row(&users, &movies, user_name, title, rating)?;
        ratings.push(model.insert(&txn).await?);
    }

    txn.commit().await?;

    Ok(Fixture { users, movies, ratings })
}
