//! Editable XML tree for OOXML chart parts.
//!
//! The tree is addressed through [`ElementPath`] descriptors. Reads never create nodes; writes
//! create missing segments at the position the [`SchemaRegistry`] declares for them, so the
//! resulting sibling order matches the schema regardless of the order in which values are set.
//!
//! Documents are not synchronized; callers that share one across threads must lock externally.

mod access;
pub mod error;
pub mod ns;
pub mod order;
pub mod path;
pub mod xml;

pub use error::{DomError, OrderError};
pub use ns::Ns;
pub use order::{ChildOrder, SchemaRegistry, Slot};
pub use path::{ElementPath, Filter, Leaf, Step};
pub use xml::{QName, XmlDocument, XmlElement, XmlNode};
