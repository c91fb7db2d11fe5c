pub mod error;
pub mod function;
pub mod logging;
pub mod proto;
pub mod resource;
pub mod response;

pub use error::{ErrorCategory, FunctionError, Result};
pub use function::{Function, RESPONSE_TTL, compose};
pub use logging::{Logger, NopLogger, TracingLogger};
pub use proto::{
    Condition, ConditionStatus, FunctionResult, Ready, RequestMeta, Resource, ResponseMeta,
    RunFunctionRequest, RunFunctionResponse, Severity, State, Target,
};
pub use resource::{Bucket, ObservedComposite, XBucketsSpec};
