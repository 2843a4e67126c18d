use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::feed::Category;

use super::ExportError;

/// Writes the flat CSV export, overwriting any existing file.
///
/// One line per subcategory in document order, formatted as
/// `<category>-<subcategory>,<count>` with every hyphen removed from the
/// subcategory name first. The category name passes through verbatim,
/// embedded commas and hyphens included. No header row, no quoting.
///
/// # Errors
///
/// [`ExportError::Io`] if the file cannot be created or written.
pub fn write_csv(categories: &[Category], path: &Path) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    for category in categories {
        for sub in &category.subcategories {
            let sub_name = sub.name.replace('-', "");
            writeln!(out, "{}-{},{}", category.name, sub_name, sub.count)?;
        }
    }

    out.flush()?;
    Ok(())
}
