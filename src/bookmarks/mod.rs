//! Bookmarks resource
//!
//! `GET /bookmarks` lists every stored bookmark. `POST /bookmarks` stores a new
//! one and requires a known `apikey` header. Any other method is rejected with
//! 405.
//!
//! # Usage
//!
//! ```rust,ignore
//! use bookmarks::bookmarks;
//!
//! let app = Router::new()
//!     .merge(bookmarks::routes())
//!     .with_state(app_state);
//! ```

mod handler;
mod routes;

pub use routes::routes;
