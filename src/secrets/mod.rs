//! Parameter store access and per-request configuration assembly.
//!
//! Layout:
//! - `ssm.rs`: the `SecretResolver` seam and its AWS SSM implementation
//! - `assembler.rs`: concurrent lookup of the five database parameters

pub mod assembler;
pub mod ssm;

pub use assembler::{ConfigAssembler, DatabaseConfig};
pub use ssm::{SecretResolver, SsmSecretResolver};
