pub mod config;
pub mod convert;
pub mod document;
pub mod folder;
pub mod models;
pub mod promql;
pub mod uid;
pub mod validate;

pub use convert::{ConvertOptions, Converter, convert_group, convert_groups, convert_rule};
pub use folder::{Folder, classify};
pub use promql::{synthesize, synthesize_with};
pub use uid::generate_uid;
