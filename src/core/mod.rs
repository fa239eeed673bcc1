// src/core/mod.rs

/// Data structures shared by the engine and its surfaces: `ScanResult`,
/// findings and header details.
pub mod models;

/// Validation, fetching, header and HTML analysis, and the orchestrator.
pub mod scanner;

/// In-memory cache of completed scan results.
pub mod store;

/// How scan progress reaches the caller that started it.
pub mod observer;

/// Explanations and severities for everything the dashboard reports.
pub mod knowledge_base;
