//! # CWR - Common Works Registration reader and writer
//!
//! Reads and writes CISAC CWR 2.0/2.1/2.2 transmissions: the fixed-width
//! files publishers send to collecting societies to register musical works.
//!
//! ## Architecture
//!
//! ```text
//!                ┌────────────┐     ┌──────────────┐     ┌─────────────┐
//!   .V21 file ──▶│   Parser   │────▶│   Catalog    │────▶│  Assembler  │──▶ .V21 file
//!  (any charset) │ (auto-enc) │     │ (works, IPs, │     │ (validate + │
//!                └────────────┘     │  recordings) │     │  group)     │
//!                                   └──────────────┘     └─────────────┘
//!                                          │                    │
//!                                   ┌──────┴──────┐      ┌──────┴──────┐
//!                                   │  Territory  │      │ Validation  │
//!                                   │  resolver   │      │   engine    │
//!                                   └─────────────┘      └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cwr::{assemble, read_cwr_file, NoLookup, RegistrationConfig};
//!
//! let catalog = read_cwr_file("CW240001ABC_021.V21", &NoLookup)?;
//! let config = RegistrationConfig::from_env()?;
//! let assembly = assemble(&catalog, &config, &NoLookup)?;
//! std::fs::write(config.filename(chrono::Local::now().date_naive()), assembly.content)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Ordered diagnostic log
//! - [`identifiers`] - IPI, ISWC, ISRC and EAN/UPC checksums
//! - [`territory`] - TIS territory tree and share resolution
//! - [`vocabulary`] - CWR code tables
//! - [`models`] - Works, parties, shares and recordings
//! - [`record`] - Fixed-width record codec
//! - [`catalog`] - Catalog registries, handles and session cursor
//! - [`identity`] - Injected identity lookups
//! - [`config`] - Registration configuration
//! - [`validation`] - Work and share validation
//! - [`assembler`] - Catalog to CWR
//! - [`parser`] - CWR to catalog

// Core modules
pub mod error;
pub mod logs;
pub mod models;

// Reference data
pub mod identifiers;
pub mod territory;
pub mod vocabulary;

// Codec
pub mod record;

// Catalog
pub mod catalog;
pub mod identity;

// Configuration
pub mod config;

// Validation
pub mod validation;

// Reading and writing
pub mod assembler;
pub mod parser;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AssemblyError, AssemblyResult, CatalogError, CatalogResult, ConfigError, ConfigResult, CwrError, CwrResult,
    ReadError, ReadResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    CollectionShares, Hms, Inclusion, Percentage, Performer, Release, Role, RoleClass, Share, Shareholder,
    TerritoryEntry, Track, TransactionKind, TransactionType, Work, WorkHeader,
};

pub use logs::{LogEntry, LogLevel, MessageLog};

// =============================================================================
// Re-exports - Catalog
// =============================================================================

pub use catalog::{Catalog, CatalogSession, ShareHandle, WorkHandle};
pub use identity::{IdentityResolver, NoLookup, StaticDirectory};
pub use config::RegistrationConfig;

// =============================================================================
// Re-exports - Codec
// =============================================================================

pub use record::{Codec, CwrVersion, Record, Sequence};
pub use territory::{CountryShares, TerritoryTree, TERRITORIES, WORLD};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    validate_catalog_json, validate_config_json, validate_registration, validate_shares, validate_work,
    ValidationReport,
};

// =============================================================================
// Re-exports - Reading and writing
// =============================================================================

pub use assembler::{assemble, assemble_at, Assembly};
pub use parser::{decode_content, detect_encoding, read_cwr, read_cwr_bytes, read_cwr_file};
