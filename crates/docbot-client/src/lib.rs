//! Typed HTTP client for the OpenAI Assistants v2 API.
//!
//! Only the resources and fields docbot reads are modelled; everything else in
//! the vendor payload is ignored on deserialization.
//!
//! # Example
//!
//! ```no_run
//! use docbot_client::{AssistantsClient, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = AssistantsClient::builder().api_key("sk-...").build()?;
//!
//! let thread = client.threads().create().await?;
//! client.messages().create(&thread.id, "Hello!").await?;
//!
//! let run = client.runs().create(&thread.id, "asst_123").await?;
//! println!("run {} is {}", run.id, run.status);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Models**: list
//! - **Assistants**: create, retrieve, update, list
//! - **Threads**: create, retrieve
//! - **Messages**: create, list, delete
//! - **Runs**: create, retrieve, list
//! - **Vector stores**: create, retrieve, list, delete, file batches, files
//! - **Files**: upload, list, delete

pub mod api;
pub mod client;
pub mod error;
pub mod types;

pub use client::{AssistantsClient, ClientBuilder, DEFAULT_BASE_URL};
pub use error::{Error, Result};
pub use types::*;

pub use api::ListMessagesQuery;
