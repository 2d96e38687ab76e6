//! Blob emission.
//!
//! Blobs are written as soon as a file's revisions are materialized,
//! before any commit that references them, in the order the revision
//! texts appeared in the `,v` file.

use std::io::Write;

use rcsfile::RcsFile;

use crate::error::{ExportError, ExportResult};
use crate::marks::Marks;
use crate::stream::StreamWriter;

/// Emits one blob per materialized revision of `rcs`, allocating blob
/// marks in materialization order.
pub fn export_blobs<W: Write>(
    rcs: &RcsFile,
    marks: &mut Marks,
    out: &mut StreamWriter<W>,
) -> ExportResult<()> {
    for id in &rcs.data_order {
        let Some(bytes) = rcs.revision(id).and_then(|rev| rev.text_bytes()) else {
            return Err(ExportError::IncompleteRevision {
                file: rcs.name.clone(),
                rev: id.clone(),
            });
        };
        let mark = marks.blob(&rcs.name, id);
        out.blob(mark, &bytes)?;
    }
    Ok(())
}
