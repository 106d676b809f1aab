pub mod jsonl;

pub use jsonl::SourceStore;
