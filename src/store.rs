use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};

use crate::{
    entities::{movie, movie_rating, user},
    error::AppResult,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RatingWrite {
    Updated,
    Inserted,
    /// The user or the movie does not exist; nothing was written.
    MissingReference,
}

/// Query functions over the catalog tables. Rows come back flat with their
/// foreign keys; callers join them explicitly.
#[derive(Clone)]
pub struct MovieStore {
    db: DatabaseConnection,
}

impl MovieStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Every movie paired with the rating values it has received.
    pub async fn movies_with_ratings(&self) -> AppResult<Vec<(movie::Model, Vec<i32>)>> {
        let movies = movie::Entity::find().all(&self.db).await?;
        let mut ratings = self.group_ratings(movie_rating::Entity::find()).await?;

        Ok(movies
            .into_iter()
            .map(|m| {
                let values = ratings.remove(&m.id).unwrap_or_default();
                (m, values)
            })
            .collect())
    }

    /// Ratings given by a user, each with the movie it refers to.
    pub async fn ratings_by_user(
        &self,
        user_id: i32,
    ) -> AppResult<Vec<(movie_rating::Model, movie::Model)>> {
        let rows = movie_rating::Entity::find()
            .filter(movie_rating::Column::UserId.eq(user_id))
            .find_also_related(movie::Entity)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().filter_map(|(r, m)| m.map(|m| (r, m))).collect())
    }

    /// Rating values keyed by movie id, restricted to the given movies.
    pub async fn ratings_for_movies(&self, movie_ids: &[i32]) -> AppResult<HashMap<i32, Vec<i32>>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.group_ratings(
            movie_rating::Entity::find()
                .filter(movie_rating::Column::MovieId.is_in(movie_ids.iter().copied())),
        )
        .await
    }

    #[cfg(test)]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    #[cfg(test)]
    pub async fn find_rating(
        &self,
        user_id: i32,
        movie_id: i32,
    ) -> AppResult<Option<movie_rating::Model>> {
        rating_for_pair(&self.db, user_id, movie_id).await
    }

    /// Overwrites the user's rating of the movie, or inserts one when the pair
    /// has not been rated yet.
    pub async fn write_rating(
        &self,
        user_id: i32,
        movie_id: i32,
        rating: i32,
    ) -> AppResult<RatingWrite> {
        let txn = self.db.begin().await?;

        let outcome = if let Some(existing) = rating_for_pair(&txn, user_id, movie_id).await? {
            let mut model: movie_rating::ActiveModel = existing.into();
            model.rating = Set(rating);
            model.update(&txn).await?;
            RatingWrite::Updated
        } else {
            let user = user::Entity::find_by_id(user_id).one(&txn).await?;
            let movie = movie::Entity::find_by_id(movie_id).one(&txn).await?;
            match (user, movie) {
                (Some(user), Some(movie)) => {
                    movie_rating::ActiveModel {
                        user_id: Set(user.id),
                        movie_id: Set(movie.id),
                        rating: Set(rating),
                        ..Default::default()
                    }
                    .insert(&txn)
                    .await?;
                    RatingWrite::Inserted
                },
                _ => RatingWrite::MissingReference,
            }
        };

        txn.commit().await?;
        Ok(outcome)
    }

    async fn group_ratings(
        &self,
        query: sea_orm::Select<movie_rating::Entity>,
    ) -> AppResult<HashMap<i32, Vec<i32>>> {
        let mut grouped: HashMap<i32, Vec<i32>> = HashMap::new();
        for r in query.all(&self.db).await? {
            grouped.entry(r.movie_id).or_default().push(r.rating);
        }
        Ok(grouped)
    }
}

async fn rating_for_pair<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    movie_id: i32,
) -> AppResult<Option<movie_rating::Model>> {
    let rating = movie_rating::Entity::find()
        .filter(movie_rating::Column::UserId.eq(user_id))
        .filter(movie_rating::Column::MovieId.eq(movie_id))
        .one(conn)
        .await?;
    Ok(rating)
}
