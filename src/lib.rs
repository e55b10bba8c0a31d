//! Lead Report Pipeline
//!
//! This library provides the core functionality for the lead-report system:
//! an asynchronous pipeline that enriches an email address via the Apollo
//! people-match API, generates a narrative lead report with OpenAI, and
//! tracks each job's progress durably in PostgreSQL.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
