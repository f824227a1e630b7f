//! mgrep Core Types and Geometry
//!
//! This crate provides the document-independent building blocks of the mgrep
//! chart exporter. It includes:
//!
//! - **Geometry**: Points and circular markers ([`geometry`] module)
//! - **Paths**: SVG path data as absolute segments, centroids ([`path`] module)
//! - **Transforms**: Affine alignment with bound zones ([`transform`] module)
//! - **Fitting**: Moving named figures onto a trace ([`fit`] module)
//! - **Styles**: Inline style merging and label alignment ([`style`] module)
//! - **Vocabulary**: Microgestures and commands ([`microgesture`], [`command`])

pub mod command;
pub mod fit;
pub mod geometry;
pub mod microgesture;
pub mod path;
pub mod style;
pub mod transform;
