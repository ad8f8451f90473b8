//! Lilith is a terminal client for a Lilith conversation server.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation timeline, session tracking, credential
//!   storage, identity recovery and the HTTP service client.
//! - [`auth`] signs users in and out by obtaining or discarding the bearer
//!   token held in a credential store.
//! - [`api`] defines the request and response payloads exchanged with the
//!   server.
//! - [`cli`] parses the command line and runs the line-based chat loop.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which builds a [`core::client::ChatClient`]
//! and dispatches to the chosen command.

pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod utils;
