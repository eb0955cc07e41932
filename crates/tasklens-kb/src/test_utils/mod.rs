//! Test doubles shared by unit and integration tests

pub mod fakes;

pub use fakes::{FailingStateStore, FakeEmbeddingService};
