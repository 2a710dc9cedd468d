//! Gridview Client
//!
//! The transport client and remote object model for talking to a Gridview
//! monitoring agent.
//!
//! # Architecture
//!
//! Three cooperating remote handles sit on top of one [`Connection`]:
//!
//! - **[`Session`]**: entity + sampler identity; parameters, sign-on/off,
//!   heartbeat, existence probe
//! - **[`Dataview`]**: a named remote table (plus headlines) owned by a
//!   session; all view mutation and query operations
//! - **[`Stream`]**: an append-only message stream owned by a session
//!
//! Every operation resolves to a fully-qualified remote method name built
//! from the entity/sampler/view hierarchy, and issues exactly one request.
//! Nothing is retried and no remote existence is cached: views can be
//! purged by the peer out-of-band, so mutating and query operations
//! reverify existence on every call.

pub mod dataview;
pub mod session;
pub mod stream;
pub mod transport;

pub use dataview::Dataview;
pub use session::Session;
pub use stream::Stream;
pub use transport::Connection;
