//! Pipeline-level tests for the keyword engine.

mod pipeline;
