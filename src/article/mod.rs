// Article persistence module

pub mod error;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::ArticleStore;
pub use types::{Article, ArticleUpdate, NewArticle};
