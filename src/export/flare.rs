use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::feed::Category;

use super::ExportError;

/// Fixed renames applied to category display names in the JSON path only.
/// Categories not listed here pass through with surrounding whitespace
/// trimmed; the CSV path never renames.
const CATEGORY_RENAMES: [(&str, &str); 3] = [
    (
        "Cell Phone/Telephone/Communication Device",
        "Communication Device",
    ),
    ("Entertainment (Music/Movies/Games)", "Entertainment"),
    ("Carry Bag / Luggage", "Luggage"),
];

/// Name of the root node, as expected by flare-style visualizations.
const ROOT_NAME: &str = "flare";

/// Root of the exported hierarchy: always named `flare`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FlareTree {
    pub name: String,
    pub children: Vec<FlareCategory>,
}

/// A category node. The `children` key is always present, even when empty.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FlareCategory {
    pub name: String,
    pub children: Vec<FlareLeaf>,
}

/// A subcategory leaf carrying the item count.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FlareLeaf {
    pub name: String,
    pub value: u32,
}

/// Builds the flare hierarchy from the parsed category tree.
///
/// Category names go through [`CATEGORY_RENAMES`]; subcategory names are kept
/// verbatim, hyphens included, unlike the CSV export.
pub fn build_tree(categories: &[Category]) -> FlareTree {
    FlareTree {
        name: ROOT_NAME.to_string(),
        children: categories
            .iter()
            .map(|category| FlareCategory {
                name: rename_category(&category.name).to_string(),
                children: category
                    .subcategories
                    .iter()
                    .map(|sub| FlareLeaf {
                        name: sub.name.clone(),
                        value: sub.count,
                    })
                    .collect(),
            })
            .collect(),
    }
}

/// Writes the flare JSON export, overwriting any existing file.
///
/// The document is serialized compactly in a single pass; the file handle is
/// scoped so it closes on both the success and error paths.
///
/// # Errors
///
/// - [`ExportError::Io`] if the file cannot be created or written
/// - [`ExportError::Json`] if serialization fails
pub fn write_flare(categories: &[Category], path: &Path) -> Result<(), ExportError> {
    let tree = build_tree(categories);
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer(&mut out, &tree)?;
    out.flush()?;
    Ok(())
}

fn rename_category(name: &str) -> &str {
    CATEGORY_RENAMES
        .iter()
        .find(|(long, _)| *long == name)
        .map(|(_, short)| *short)
        .unwrap_or(name)
        .trim()
}
