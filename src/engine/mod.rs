mod ingest_engine;
#[cfg(test)]
mod tests;

pub use ingest_engine::IngestEngine;
