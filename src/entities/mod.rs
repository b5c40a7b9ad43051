pub mod movie;
pub mod movie_rating;
pub mod user;
