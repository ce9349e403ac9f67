//! Movie search, random discovery and a persistent favourites list on top of
//! the OMDb catalog.

pub mod api;
pub mod config;
pub mod error;
pub mod favourites;
pub mod middleware;
pub mod models;
pub mod services;
