//! reStructuredText engine rendering a subset of the markup to HTML.
//!
//! The [`Publisher`] parses a source string into a [`Document`] and renders it
//! with an [`HtmlWriter`] into [`Parts`]. Behaviour is controlled by
//! [`Options`], validated into [`Settings`].
//!
//! # Diagnostics
//!
//! Problems in the markup raise system messages through the [`Reporter`]. By
//! default a message at or above `report_level` is written to the warning
//! stream (stderr) and embedded in the output, and a message at or above
//! `halt_level` aborts parsing. Both steps go through process-wide hooks
//! (see [`hooks`]) that hosts may replace to capture diagnostics.
//!
//! # Extensions
//!
//! Directives ([`directive::Directive`]) and interpreted text roles
//! ([`role::Role`]) are registered on the publisher.
//!
//! # Example
//!
//! ```
//! use rstview_engine::{Html4Writer, Options, Publisher};
//!
//! let parts = Publisher::new()
//!     .publish_parts::<Html4Writer>("Lorem **ipsum** salace", &Options::new())
//!     .unwrap();
//! assert_eq!(parts.fragment, "<p>Lorem <strong>ipsum</strong> salace</p>\n");
//! ```

pub mod directive;
mod error;
pub mod hooks;
mod highlight;
pub mod language;
pub mod nodes;
mod parser;
mod parts;
mod publish;
mod reporter;
pub mod role;
mod settings;
mod util;
mod value;
mod writer;

pub use error::EngineError;
pub use nodes::{Document, Inline, Node};
pub use parser::MAX_INCLUDE_DEPTH;
pub use parts::Parts;
pub use publish::{Publisher, ReadFileFn, STRING_SOURCE};
pub use reporter::{Level, Reporter, SystemMessage};
pub use settings::{FootnoteReferences, MAX_REPORT_LEVEL, Settings};
pub use util::{escape_html, make_id};
pub use value::{Options, Value};
pub use writer::{ENGINE_VERSION, Html4Writer, HtmlWriter, Translator};
