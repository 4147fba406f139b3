pub mod daily_stat;
pub mod genre;
pub mod movie;
pub mod movie_genre;
