//! Header parsing and validation framework.
//!
//! # Data Flow
//! ```text
//! raw (name, value) pairs from the response head
//!     → HeaderRegistry::resolve
//!         per name: syntax check each occurrence (bad ones noted, dropped)
//!                   single-value check (extras noted, first kept)
//!                   join → parse (failures noted, header omitted)
//!     → ParsedHeaders (typed FieldValue per lowercase name)
//! ```
//!
//! # Design Decisions
//! - Handlers are plain records of function pointers, registered once at start
//! - Unregistered names go through a generic printable-ASCII handler
//! - Numeric values are arbitrary precision

pub mod content_length;
pub mod content_type;
pub mod date;
pub mod etag;
pub mod handler;
pub mod last_modified;
pub mod lists;
pub mod registry;
pub mod set_cookie;
pub mod syntax;
pub mod value;
pub mod x_frame_options;

pub use content_type::MediaType;
pub use etag::EntityTag;
pub use handler::{Cardinality, HeaderContext, HeaderHandler, Joined, ParseError};
pub use registry::HeaderRegistry;
pub use set_cookie::{CookieAttribute, SetCookie};
pub use value::{FieldValue, ParsedHeaders};
