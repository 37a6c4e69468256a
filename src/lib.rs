//! Shared pieces of devconnect: the rules a post must satisfy, the API model,
//! and the client side composer that builds and submits posts.

pub mod client;
pub mod composer;
pub mod model;
pub mod store;
pub mod validation;
