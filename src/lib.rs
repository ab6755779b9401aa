#![doc = "The `taskplane` library crate."]
#![doc = ""]
#![doc = "A task/project management REST backend: accounts register and log in,"]
#![doc = "then create projects and tasks scoped to their account. Authentication"]
#![doc = "uses signed access/refresh token pairs with a revocation ledger for"]
#![doc = "logout and an account-wide cutoff for \"log out everywhere\"."]
#![doc = ""]
#![doc = "The binary (`main.rs`) wires a Postgres-backed storage into the app;"]
#![doc = "the integration tests run the same routes over an in-memory storage."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod state;
pub mod storage;
