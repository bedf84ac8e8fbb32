//! Surface algorithms.
//!
//! - **Geodesics**: approximate along-surface distances by front propagation

pub mod geodesic;
