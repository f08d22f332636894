//! Job synthesis and invocation.
//!
//! - **name**: derives API-legal job identifiers from user-supplied prefixes
//! - **spec**: the normalized job description and its builders
//! - **invoker**: the external-collaborator boundary to the job-execution APIs

pub mod invoker;
pub mod name;
pub mod spec;

pub use invoker::{HttpJobInvoker, JobHandle, JobInvoker};
pub use name::synthesize;
pub use spec::{EnvVar, JobSpec, SubmitRequest};
