pub mod config;
pub mod errors;
pub mod exploration;
pub mod llm_client;
pub mod models;
pub mod offline;
pub mod routes;
pub mod state;

#[cfg(test)]
mod testing;
