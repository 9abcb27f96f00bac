//! Shared building blocks for the Emission Farm contracts.
//!
//! This crate provides:
//! - [`access`]: owner + role registry backing every privileged entry point.
//! - [`fixed_point`]: overflow-aware integer helpers with documented
//!   truncation.
//! - [`reentrancy`]: a per-invocation lock flag kept in instance storage.
//!
//! Helpers report failure through `bool` / `Option` so each contract can map
//! them onto its own `#[contracterror]` enum.

#![no_std]

pub mod access;
pub mod fixed_point;
pub mod reentrancy;

pub use access::Role;
