//! API endpoint implementations.

mod assistants;
mod files;
mod messages;
mod models;
mod runs;
mod threads;
mod vector_stores;

pub use assistants::AssistantsApi;
pub use files::FilesApi;
pub use messages::{ListMessagesQuery, MessagesApi};
pub use models::ModelsApi;
pub use runs::RunsApi;
pub use threads::ThreadsApi;
pub use vector_stores::VectorStoresApi;
