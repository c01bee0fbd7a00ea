//! Client for the résumé and cover-letter generation service.
//!
//! The crate is organised leaf-first: a [`session::SessionStore`] holds the
//! bearer credential, the [`api_client::ApiClient`] attaches it to every call
//! and ends the session on a 401, and the [`collection`] module keeps
//! per-entity caches in step with the backend. [`state::AppContext`] owns all
//! of them and is passed explicitly to whatever drives the client.

pub mod api_client;
pub mod collection;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod state;

pub use config::Config;
pub use errors::ClientError;
pub use state::AppContext;
