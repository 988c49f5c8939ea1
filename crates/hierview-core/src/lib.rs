//! hierview Core Types
//!
//! This crate provides the foundational types shared by the hierview
//! libraries. It includes:
//!
//! - **Design**: The instance hierarchy received from an HDL parser ([`design`] module)
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)

pub mod color;
pub mod design;
pub mod geometry;
pub mod identifier;
