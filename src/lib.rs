//! Library exports for the URL shortener application
//!
//! This module exposes internal components for testing and potential library usage.

pub mod accounts;
pub mod allocator;
pub mod config;
pub mod database;
pub mod error;
pub mod generator;
pub mod handler;
pub mod history;
pub mod middleware;
pub mod model;
pub mod password;
pub mod route;
pub mod service;
pub mod session;
pub mod store;
