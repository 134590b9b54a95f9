//! CLI command implementations

pub(crate) mod common;
pub(crate) mod init;
pub(crate) mod log;
pub(crate) mod plan;
pub(crate) mod rollback;
pub(crate) mod status;
pub(crate) mod upgrade;
pub(crate) mod validate;
