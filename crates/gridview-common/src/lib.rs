//! Gridview Common Types
//!
//! This crate provides the wire protocol definitions and the shared error
//! taxonomy for the Gridview dataview-publishing system.
//!
//! # Overview
//!
//! Gridview lets a monitored process publish tabular metrics ("dataviews")
//! to a remote monitoring agent. This crate contains the pieces shared by
//! the client and sampler crates:
//!
//! - **Protocol Layer**: method-call envelope, typed argument kinds,
//!   reply values and remote faults
//! - **Errors**: the [`GridviewError`] taxonomy used across the workspace
//!
//! # Wire format
//!
//! The protocol is deliberately small: one JSON method-call envelope per
//! operation, POSTed to the agent's endpoint. There is no schema
//! negotiation and no batching. A reply carries either a single positional
//! value (boolean, integer, string, or string array) or a non-empty fault
//! list; faults always win.
//!
//! # Example
//!
//! ```
//! use gridview_common::{MethodCall, marshal_params};
//! use serde_json::json;
//!
//! let params = marshal_params(&[json!("cpu"), json!(["a", "b"])]).unwrap();
//! let call = MethodCall::new("probe.cpu.createView", params);
//! assert_eq!(call.method, "probe.cpu.createView");
//! ```

pub mod protocol;

pub use protocol::*;
