//! sassbind-lib: provisioning of the native Sass binding
//!
//! Decides whether the installed addon binary can be used as-is and, when it
//! is missing, broken or a rebuild is forced, drives the pipeline:
//! - `source`: fetch the native library sources with the source-control tool
//! - `toolchain`: run the native build toolchain
//! - `relocate`: move the built binary to its install path
//!
//! `pipeline::provision` sequences these stages from a `config::BuildConfig`.

pub mod binary;
pub mod config;
pub mod consts;
pub mod error;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod relocate;
pub mod source;
pub mod toolchain;
pub mod util;
pub mod validate;

pub use error::ProvisionError;
pub use pipeline::{BuildReason, ProvisionOutcome, provision};
