//! Domain types shared across the HRIS backend.
//!
//! This crate contains only pure types and transformations with no framework
//! dependencies. Import in `usecase/` and `domain/` layers; never in `infra/`
//! or `handlers/`.

pub mod menu;
pub mod pagination;
