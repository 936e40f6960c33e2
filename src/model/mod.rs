//! Domain Models
//!
//! Object types and category payloads for the parts of the CMDB this client
//! reads: client workstations and servers, their global data, contact
//! assignments and accounting records.

mod category;
mod object;

pub use category::{CategoryAccounting, CategoryContactAssignment, CategoryGlobal, ClientCategory};
pub use object::{Client, Server};
