//! Shared fixtures for load pipeline integration tests.

#![allow(dead_code)]

use chrono::NaiveDate;
use reelstats_core::records::{DailyStat, Genre, Movie, MovieGenreLink, NormalizedBatches};
use reelstats_db::LoadSession;
use sqlx::PgPool;

/// Wrap a connection from the test pool in a load session.
pub async fn session_for(pool: &PgPool) -> LoadSession {
    let conn = pool.acquire().await.unwrap().detach();
    LoadSession::from_connection(conn)
}

pub fn genre(id: i64, name: &str) -> Genre {
    Genre {
        external_genre_id: id,
        name: name.to_string(),
    }
}

pub fn movie(id: i64, title: &str) -> Movie {
    Movie {
        external_movie_id: id,
        title: title.to_string(),
        release_date: NaiveDate::from_ymd_opt(1999, 10, 15),
        overview: String::new(),
        poster_path: Some(format!("/{id}.jpg")),
        backdrop_path: None,
        original_language: "en".to_string(),
        runtime: Some(120),
        budget: 1_000_000,
        revenue: 5_000_000,
    }
}

pub fn link(movie_id: i64, genre_id: i64) -> MovieGenreLink {
    MovieGenreLink {
        movie_external_id: movie_id,
        genre_external_id: genre_id,
    }
}

pub fn jan(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

pub fn stat(movie_id: i64, date: NaiveDate, popularity: f64) -> DailyStat {
    DailyStat {
        movie_external_id: movie_id,
        date,
        popularity,
        vote_average: 8.4,
        vote_count: 1_000,
    }
}

/// Two movies, three genres, their links and one stat per movie.
pub fn popular_snapshot() -> NormalizedBatches {
    NormalizedBatches {
        genres: vec![genre(18, "Drama"), genre(28, "Action"), genre(53, "Thriller")],
        movies: vec![movie(550, "Fight Club"), movie(680, "Pulp Fiction")],
        movie_genres: vec![link(550, 18), link(550, 53), link(680, 53), link(680, 28)],
        daily_stats: vec![stat(550, jan(1), 80.1), stat(680, jan(1), 64.2)],
    }
}
