//! Reference resolution for moving notes between a markdown vault and a
//! document store.
//!
//! A pass over a batch of documents runs in four steps:
//!
//! 1. **Extract** every cross-document link and asset mention
//!    ([`pipeline::extract_references`]).
//! 2. **Protect** them by swapping each for a positional placeholder token
//!    ([`placeholder::substitute_placeholders`]), so an external content
//!    converter cannot mangle them.
//! 3. **Convert** the protected content ([`pipeline::ContentConverter`]).
//! 4. **Resolve** each token to the destination syntax, by name on import
//!    ([`resolve_import::resolve_for_import`]) or by identifier on export
//!    ([`resolve_export::resolve_for_export`]).
//!
//! Resolution never fails: anything that cannot be resolved is reverted to
//! its original text and reported in a [`report::ResolutionReport`].

pub mod batch;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod markup;
pub mod paths;
pub mod pipeline;
pub mod placeholder;
pub mod report;
pub mod resolve_export;
pub mod resolve_import;
pub mod scanner;
pub mod storage;
pub mod syntax;
pub mod types;
