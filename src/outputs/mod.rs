//! Output generation.
//!
//! - [`json`]: the `latest_article.json` snapshot read by the query side
//!
//! ```text
//! output_dir/
//! └── latest_article.json
//! ```

pub mod json;
