//! Response metadata and bodies.
//!
//! # Structure
//!
//! ```text
//! Response
//! ├── Header
//! │   ├── status line + protocol
//! │   └── [(HeaderOption, value)]   ordered, multi-valued
//! └── ResponseStream
//!     ├── Known(KnownLengthStream)  snapshottable
//!     └── Unknown(Box<dyn Read>)
//! ```
//!
//! [`HeaderOption`]s come from a [`HeaderRegistry`] shared by every
//! response of one server instance.

mod body;
mod cookie;
mod header;
mod option;
mod status;
mod time;

pub use body::{KnownLengthStream, Response, ResponseBody, ResponseStream};
pub use cookie::{DELETED_MARKER, ResponseCookie, SameSite};
pub use header::Header;
pub use option::{HeaderOption, HeaderRegistry, StandardHeader};
pub use status::*;
pub use time::{epoch, http_date, http_date_now};
