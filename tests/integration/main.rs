//! Integration tests: the full fetch → optimise → deliver pipeline driven
//! through in-memory sources and a recording sink.

mod mock_sources;
mod pipeline;
