// Axum web dashboard

pub mod server;

pub use server::{AppState, router, serve};
