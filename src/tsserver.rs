//! tsserver backend: process management, framing and request routing.
//!
//! The client writes requests on the child's stdin and a reader task drains
//! stdout, routing each response to the task awaiting it.

pub mod client;
pub mod connection;
pub mod protocol;
mod reader;
mod response_router;
pub mod version;

pub use client::{TsServerClient, TsServerConfig};
pub use connection::{MessageReader, MessageWriter, TsServerProcess};
pub use protocol::{file_id_for_uri, script_kind_for_language};
pub use version::ApiVersion;
