//! Single-pass streaming extraction of Kubernetes object metadata from raw JSON.
//!
//! This crate pulls the interesting parts of a Kubernetes object (annotations,
//! labels, owner references, network-policy pod selectors, role-binding
//! subjects, ...) straight out of the JSON bytes in one depth-first scan,
//! without ever materializing a generic document tree. It is intended for
//! pipelines that handle high volumes of watch events and only need object
//! metadata, not the full typed resource.
//!
//! The entry point is [`extract_metadata`], which returns a [`Metadata`]
//! record. [`ParsedObject`] offers a thin read-only view on top of it with a
//! parsed creation timestamp.
#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod extract;
pub use extract::{extract_metadata, Metadata, RoleRef, Subject};

pub mod walk;
pub use walk::{Event, Node};

pub mod selector;
pub use selector::parse_calico_selector;

pub mod object;
pub use object::ParsedObject;

pub mod namespaces;
pub use namespaces::NamespaceFilter;

pub mod image;
pub use image::ImageInfo;

mod error;
pub use error::Error;

/// Convient alias for `Result<T, Error>`
pub type Result<T, E = Error> = std::result::Result<T, E>;
