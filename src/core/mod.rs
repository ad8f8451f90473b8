pub mod client;
pub mod config;
pub mod conversation;
pub mod credentials;
pub mod dispatcher;
pub mod identity;
pub mod keyring;
pub mod message;
pub mod resumer;
pub mod service;
pub mod timeline;
