#![forbid(unsafe_code)]

pub mod answers;
pub mod repository;
pub mod sqlite;

pub use answers::{AnswerStore, decode_answers, encode_answers};
pub use repository::{InMemoryStore, LocalStore, Storage, StorageError};
