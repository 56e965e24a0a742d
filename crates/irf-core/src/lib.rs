//! # irfkit
//!
//! A library for driving gamma-ray instrument-response-function (IRF) access from
//! analysis scripts and command-line tools: effective-area lookups keyed by detector
//! conversion type, explicit IRF registries, floating-point-exception trapping for
//! numerical-debugging runs, and IRAF-style `.par` parameter files.
//!
//! ## Architectural Philosophy
//!
//! The library deliberately avoids process-wide singletons. Every registry and
//! parameter store is an explicitly constructed value owned by the caller, so the
//! initialization order is visible in the code that uses it rather than hidden
//! behind global factories.
//!
//! - **[`irfs`]: The Foundation.** Response-function handles ([`irfs::Irfs`]), the
//!   [`irfs::EffectiveArea`] capability they expose, the table-backed
//!   implementation, and the [`irfs::IrfRegistry`] that resolves handles by name.
//!
//! - **[`aeff`]: The Query Surface.** The [`aeff::Aeff`] accessor resolves a
//!   front/back handle pair once at construction and dispatches effective-area
//!   queries by conversion type.
//!
//! - **[`params`]: The Configuration Layer.** Named parameter groups in the
//!   IRAF `.par` format, located through an explicit search-path store.
//!
//! - **[`fpe`]: Numerical Debugging.** A runtime-queryable capability for enabling
//!   hardware floating-point exception traps.

pub mod aeff;
pub mod fpe;
pub mod irfs;
pub mod params;
