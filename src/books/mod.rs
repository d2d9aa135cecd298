//! Books Module
//!
//! The catalog endpoints: list, create and wipe the collection, and fetch,
//! comment on or delete a single book.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookshelf::books;
//!
//! let app = Router::new()
//!     .nest("/api", books::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;

pub use routes::routes;
