//! Command implementations.
//!
//! Every command writes exactly one JSON document to the given writer. Failed
//! mutations write a `{ "success": false, "message": ... }` envelope and
//! return an error so `main` can exit non-zero.

pub mod collection;
pub mod session;

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

use marketplace_core::{IdError, NonFinitePrice};
use marketplace_storefront::CollectionError;
use marketplace_storefront::config::ConfigError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A collection or session operation failed.
    #[error("{kind}: {0}", kind = .0.kind())]
    Collection(#[from] CollectionError),

    /// A user or product ID argument is invalid.
    #[error("Invalid id: {0}")]
    InvalidId(#[from] IdError),

    /// The price argument is NaN or infinite.
    #[error("Invalid price: {0}")]
    InvalidPrice(#[from] NonFinitePrice),

    /// Writing the output failed.
    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    /// Encoding the output failed.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Write `value` as pretty JSON followed by a newline.
pub fn emit<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), CliError> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
