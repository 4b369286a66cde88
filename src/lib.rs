//! Retro News - A ranked RSS aggregator
//!
//! This crate fetches articles from a fixed registry of RSS/Atom sources,
//! tags them with their source's topics, and serves them over a JSON API
//! ranked either by a time-decay score or by recency.

pub mod article;
pub mod config;
pub mod fetcher;
pub mod query;
pub mod routes;
pub mod score;
pub mod store;
