// SPDX-License-Identifier: MIT

//! Variable templating (spec §4.6 step 2): substitute every `{{ name }}`
//! placeholder in a pipeline's source against the Store's `common` table.
//! Keys absent from the store are left unresolved, matching
//! `gluetube/runner.py`'s Jinja2 rendering, which leaves the corresponding
//! expression untouched when `Store.value` returns nothing.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use gt_store::Store;
use regex::Regex;

use crate::error::RunnerError;

#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}").expect("constant regex pattern is valid")
});

/// Render `source` by substituting every `{{ name }}` placeholder whose
/// name resolves to a value in `store`. Placeholders with no match are
/// left as-is in the rendered output.
pub async fn render(source: &str, store: &Store, master_secret: &str) -> Result<String, RunnerError> {
    let names: HashSet<&str> = VAR_PATTERN
        .captures_iter(source)
        .map(|caps| caps.get(1).map(|m| m.as_str()).unwrap_or_default())
        .collect();

    let mut values: HashMap<&str, String> = HashMap::with_capacity(names.len());
    for name in names {
        if let Some(value) = store.get(master_secret, gt_store::DEFAULT_TABLE, name).await? {
            values.insert(name, value);
        }
    }

    Ok(VAR_PATTERN
        .replace_all(source, |caps: &regex::Captures| {
            let name = &caps[1];
            values.get(name).cloned().unwrap_or_else(|| caps[0].to_string())
        })
        .to_string())
}

#[cfg(test)]
#[path = "template_tests.rs"]
mod tests;
