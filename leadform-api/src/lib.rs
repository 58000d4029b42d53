use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod remote;
pub mod routes;

pub type DbConnection = Arc<Mutex<Connection>>;
