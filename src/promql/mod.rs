//! Alert expression → Grafana query pipeline.
//!
//! Only the trailing comparison of an expression is recognized; everything
//! before it is passed to Prometheus untouched.

pub mod pipeline;
pub mod threshold;

pub use pipeline::{QueryOptions, synthesize, synthesize_with};
pub use threshold::{SplitExpr, Threshold, extract_threshold, normalize_expr, split_expr};
