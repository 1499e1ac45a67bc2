//! Database integration tests.
//!
//! These run against a live PostgreSQL instance (see `test_fixtures`) and
//! are `#[ignore]`d by default; run them with `cargo test -- --ignored`
//! once `DATABASE_URL` points at a migrated test database.

mod note_lifecycle_tests;
mod versioning_tests;
