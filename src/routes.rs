use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequest, Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState, catalog,
    error::{AppError, AppResult},
    models::{AddMovieRatingRequest, FilterMoviesRequest, MovieModel},
};

/// JSON body whose decoding failures surface as validation errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

pub fn router(state: Arc<AppState>) -> Router {
    let movies = Router::new()
        .route("/FilterMovies", get(filter_movies))
        .route("/GetTopFiveMoviesByAverageRating", get(top_five_by_average_rating))
        .route("/GetTopFiveMoviesByUserId/{user_id}", get(top_five_by_user_id))
        .route("/AddMovieRating", post(add_movie_rating));

    Router::new()
        .nest("/api/movies", movies)
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn filter_movies(
    State(state): State<Arc<AppState>>,
    AppJson(filter): AppJson<FilterMoviesRequest>,
) -> AppResult<Json<Vec<MovieModel>>> {
    Ok(Json(catalog::filter_movies(&state.store, &filter).await?))
}

pub async fn top_five_by_average_rating(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<Vec<MovieModel>>> {
    Ok(Json(catalog::top_by_average_rating(&state.store).await?))
}

pub async fn top_five_by_user_id(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<MovieModel>>> {
    Ok(Json(catalog::top_by_user(&state.store, user_id).await?))
}

pub async fn add_movie_rating(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<AddMovieRatingRequest>,
) -> AppResult<StatusCode> {
    catalog::add_movie_rating(&state.store, req).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, header},
        response::Response,
    };
    use tower::ServiceExt;

    use super::*;
    use crate::{
        db::memory_db,
        seeder::{self, Fixture},
        store::MovieStore,
    };

    async fn app() -> (Router, Fixture) {
        let db = memory_db().await;
        let fixture = seeder::seed(&db).await.unwrap();
        let state = Arc::new(AppState { store: MovieStore::new(db) });
        (router(state), fixture)
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn movies(resp: Response) -> Vec<MovieModel> {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn filter_movies_by_year() {
        let (app, fixture) = app().await;
        let req = json_request(
            "GET",
            "/api/movies/FilterMovies",
            serde_json::json!({ "genres": [], "title": "", "yearOfRelease": 2000 }),
        );

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let found = movies(resp).await;
        let ids: Vec<i32> = found.iter().map(|m| m.id).collect();
        assert_eq!(ids, [fixture.movie("Movie1").id, fixture.movie("Movie2").id]);
        assert_eq!(found[0].average_rating, 3.5);
        assert_eq!(found[1].average_rating, 2.5);
    }

    #[tokio::test]
    async fn filter_movies_without_criteria_is_bad_request() {
        let (app, _) = app().await;
        let req = json_request(
            "GET",
            "/api/movies/FilterMovies",
            serde_json::json!({ "genres": [], "title": "", "yearOfRelease": null }),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn filter_movies_without_match_is_not_found() {
        let (app, _) = app().await;
        let req = json_request(
            "GET",
            "/api/movies/FilterMovies",
            serde_json::json!({ "title": "NotAnExistingMovie" }),
        );
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn top_five_by_average_rating_lists_five_movies() {
        let (app, _) = app().await;
        let req = Request::builder()
            .uri("/api/movies/GetTopFiveMoviesByAverageRating")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let titles: Vec<String> = movies(resp).await.into_iter().map(|m| m.title).collect();
        assert_eq!(titles, ["Movie1", "Movie3", "Movie4", "Movie2", "Movie5"]);
    }

    #[tokio::test]
    async fn top_five_by_user_id_status_codes() {
        let (app, fixture) = app().await;
        let cases = [
            (fixture.user("User1").id.to_string(), StatusCode::OK),
            ("0".to_string(), StatusCode::BAD_REQUEST),
            ("-1".to_string(), StatusCode::BAD_REQUEST),
            ("99".to_string(), StatusCode::NOT_FOUND),
        ];
        for (id, status) in cases {
            let req = Request::builder()
                .uri(format!("/api/movies/GetTopFiveMoviesByUserId/{id}"))
                .body(Body::empty())
                .unwrap();
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), status, "user id {id}");
        }
    }

    #[tokio::test]
    async fn add_movie_rating_returns_empty_ok() {
        let (app, fixture) = app().await;
        let req = json_request(
            "POST",
            "/api/movies/AddMovieRating",
            serde_json::json!({
                "movieId": fixture.movie("Movie8").id,
                "userId": fixture.user("User3").id,
                "rating": 4,
            }),
        );

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn add_movie_rating_error_codes() {
        let (app, fixture) = app().await;
        let movie = fixture.movie("Movie8").id;
        let user = fixture.user("User3").id;
        let cases = [
            (movie, user, 6, StatusCode::BAD_REQUEST),
            (movie, user, 0, StatusCode::BAD_REQUEST),
            (movie, -1, 5, StatusCode::NOT_FOUND),
            (-1, user, 5, StatusCode::NOT_FOUND),
        ];
        for (movie_id, user_id, rating, status) in cases {
            let req = json_request(
                "POST",
                "/api/movies/AddMovieRating",
                serde_json::json!({ "movieId": movie_id, "userId": user_id, "rating": rating }),
            );
            let resp = app.clone().oneshot(req).await.unwrap();
            assert_eq!(resp.status(), status, "movie {movie_id} user {user_id} rating {rating}");
        }
    }

    async fn error_message(resp: Response) -> String {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn add_movie_rating_without_rating_is_bad_request() {
        let (app, fixture) = app().await;
        let req = json_request(
            "POST",
            "/api/movies/AddMovieRating",
            serde_json::json!({
                "movieId": fixture.movie("Movie8").id,
                "userId": fixture.user("User3").id,
            }),
        );

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(resp).await.contains("rating"));
    }

    #[tokio::test]
    async fn filter_movies_without_body_is_bad_request() {
        let (app, _) = app().await;
        let req = Request::builder()
            .uri("/api/movies/FilterMovies")
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(!error_message(resp).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let (app, _) = app().await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/movies/AddMovieRating")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"movieId\": "))
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
