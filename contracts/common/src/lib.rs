//! Shared helpers for the staking contract suite.
//!
//! This crate provides:
//! - [`math`]: overflow-checked fixed-point arithmetic on `i128` amounts.
//! - [`reentrancy`]: an instance-storage lock held for the duration of every
//!   state-mutating entry point.
//! - [`admin_tiers`]: a three-tier admin hierarchy (operator, manager, owner).
//!
//! Helpers report failure through `bool` / `Option` so that each contract can
//! map them onto its own `#[contracterror]` codes.

#![no_std]

pub mod admin_tiers;
pub mod math;
pub mod reentrancy;

pub use admin_tiers::AdminTier;
