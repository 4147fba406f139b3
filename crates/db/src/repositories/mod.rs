//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&mut PgConnection` as the first argument, so they run equally on
//! a bare session connection or inside a batch transaction.

pub mod daily_stat_repo;
pub mod genre_repo;
pub mod movie_genre_repo;
pub mod movie_repo;

pub use daily_stat_repo::DailyStatRepo;
pub use genre_repo::GenreRepo;
pub use movie_genre_repo::MovieGenreRepo;
pub use movie_repo::MovieRepo;
