/// climate_service: read-only HTTP API over the Hawaii climate dataset.
///
/// # Module structure
///
/// ```text
/// climate_service
/// ├── model     — row types and the fixed query defaults
/// ├── config    — layered settings (defaults, climate_service.toml, env, CLI)
/// ├── db        — connection-string parsing and startup table checks
/// ├── store
/// │   ├── schema   — declared tables and the SQL run against them
/// │   ├── postgres — PostgreSQL sessions
/// │   ├── sqlite   — read-only SQLite sessions
/// │   └── fixtures (test only) — seeded temp-file stores
/// ├── query     — one operation per API route
/// ├── format    — rows → JSON response shapes
/// └── endpoint  — routing, handlers and the HTTP server loop
/// ```

/// Public modules
pub mod config;
pub mod db;
pub mod endpoint;
pub mod format;
pub mod model;
pub mod query;
pub mod store;
