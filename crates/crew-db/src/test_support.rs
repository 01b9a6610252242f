//! Shared test utilities for crew-db unit tests.
