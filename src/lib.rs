//! Library crate for links-cup-back, exposing modules for binaries and tests.

/// Application configuration loaded from JSON and the environment.
pub mod config;
/// Persistence: store paths, backends and persisted models.
pub mod dao;
mod dto;
mod error;
/// HTTP routers.
pub mod routes;
/// Handicap arithmetic and match-play scoring.
pub mod scoring;
/// Business operations behind the routes.
pub mod services;
/// Shared application state and the tournament domain model.
pub mod state;
