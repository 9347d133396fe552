//! Persistence collaborators: user accounts and per-user request history.

pub mod history;
#[cfg(feature = "mongodb")]
pub mod mongo;
pub mod service;
pub mod users;

pub use history::{HistoryEntry, HistoryStore, InMemoryHistoryStore};
#[cfg(feature = "mongodb")]
pub use mongo::MongoUserStore;
pub use service::AccountService;
pub use users::{JsonUserStore, UserAccount, UserStore};
