pub mod extractor;
pub mod label;
pub mod reference;

pub use extractor::{MarkerStream, RawMarker};
pub use reference::DomainReferences;
