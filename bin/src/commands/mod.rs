//! CLI command implementations.

pub(crate) mod contracts;
pub(crate) mod futures;
pub(crate) mod init_db;
pub(crate) mod list;
pub(crate) mod securities;
pub(crate) mod sync;
