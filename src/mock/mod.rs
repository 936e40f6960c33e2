//! Mock CMDB
//!
//! An in-process stand-in for an i-doit JSON-RPC endpoint, used by unit and
//! integration tests through [`crate::MockTransport`].
//!
//! # Methods served
//!
//! - `idoit.login` / `idoit.logout`: header authentication, session tokens
//! - `cmdb.objects.read`: type, id, title and sysid filters with limits
//! - `cmdb.category.read` / `cmdb.category.save`: per-object category entries
//! - any method registered with [`MockCmdb::register_handler`]
//!
//! Failures are injected per method name with [`FailureConfig`].

mod cmdb;
mod failure;
mod state;

pub use cmdb::{MockCmdb, ReplyOrder};
pub use failure::{FailureConfig, FailureInjector, FailureMode};
pub use state::{MockObject, MockState};
