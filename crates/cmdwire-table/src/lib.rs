//! Command descriptor table.
//!
//! Maps every (feature, class, command) triple to a name and the ordered
//! argument types of its body. The table is data, not code: it is built once
//! from the built-in declarations or a JSON document and is read-only after
//! that.

pub mod builtin;
pub mod config;
pub mod descriptor;
pub mod error;
mod schema;
pub mod table;

pub use builtin::{builtin, builtin_shared};
pub use config::TableConfig;
pub use descriptor::{
    ArgumentDescriptor, ArgumentTypeTag, CommandDescriptor, CommandIdentity, Enumerator,
};
pub use error::{Result, TableError};
pub use table::CommandTable;
