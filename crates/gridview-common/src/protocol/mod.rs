pub mod envelope;
pub mod error;


pub use envelope::{marshal_params, CallParam, Fault, MethodCall, MethodName, MethodReply, ReplyValue};
pub use error::{GridviewError, Result};
