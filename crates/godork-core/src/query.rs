//! Query loading.
//!
//! The `--dorks` argument is either a path to a file with one query per line
//! or the query text itself.

use crate::error::{GodorkError, Result};
use crate::types::Query;
use std::fs;
use std::path::Path;

/// Load the ordered list of queries named by `input`.
///
/// If `input` names an existing file, every non-empty trimmed line of that file
/// is a query. Otherwise every non-empty trimmed line of `input` itself is.
/// Duplicates are kept.
pub fn load_queries(input: &str) -> Result<Vec<Query>> {
    let path = Path::new(input);
    let contents = if path.is_file() {
        tracing::debug!("Reading queries from {}", path.display());
        fs::read_to_string(path)?
    } else {
        input.to_string()
    };

    let queries = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(Query::new)
        .collect::<Result<Vec<_>>>()?;

    if queries.is_empty() {
        return Err(GodorkError::Validation("no queries provided".to_string()));
    }

    Ok(queries)
}
