pub mod entry;
pub mod source;
pub mod watermark;

pub use entry::Entry;
pub use source::Source;
pub use watermark::Watermark;
