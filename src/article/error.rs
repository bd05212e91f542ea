use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),
}
