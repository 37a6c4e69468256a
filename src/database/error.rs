pub use deadpool_postgres::tokio_postgres as pg;
use derive_more::{Display, Error};

#[derive(Debug, Display, Error)]
pub enum DatabaseError {
	PostgresErr(pg::error::Error),
	PoolErr(deadpool_postgres::PoolError),
}

impl std::convert::From<pg::error::Error> for DatabaseError {
	fn from(err: pg::error::Error) -> Self {
		Self::PostgresErr(err)
	}
}

impl std::convert::From<deadpool_postgres::PoolError> for DatabaseError {
	fn from(err: deadpool_postgres::PoolError) -> Self {
		Self::PoolErr(err)
	}
}

impl DatabaseError {
	/// Whether the error came from a unique constraint
	pub fn is_unique_violation(&self) -> bool {
		match self {
			Self::PostgresErr(e) => e.code() == Some(&pg::error::SqlState::UNIQUE_VIOLATION),
			Self::PoolErr(_) => false,
		}
	}
}
