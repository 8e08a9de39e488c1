use thiserror::Error;

pub type Result<T = ()> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("connect: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("query: {0}")]
    Query(#[source] sqlx::Error),
}
