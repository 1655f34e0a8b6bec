//! Infrastructure adapters: everything that talks to the outside world.
//!
//! Domain crates define the ports (`storekeep_sales::Store`,
//! `storekeep_ai::{Summarizer, Assistant}`, `storekeep_notify::Channel`);
//! this crate supplies the concrete transports: Postgres persistence, the
//! chat-completions client, and the two notification channels.

pub mod channels;
pub mod llm;
pub mod store;

pub use channels::email::{EmailChannel, SmtpConfig};
pub use channels::messaging::{MessagingChannel, MessagingConfig};
pub use llm::{ChatClient, LlmConfig};
pub use store::postgres::PostgresStore;
