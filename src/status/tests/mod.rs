//! Unit tests for bot status tracking.
