use std::path::Path;

use super::textgrid::TextGrid;
use super::textgrid_error::TextGridError;

/// Domain interface for persisting a TextGrid.
pub trait TextGridWriter: Send {
    /// Write `grid` to `path`. Fails with `TextGridError::OutputExists` if
    /// the file exists and the writer was not told to overwrite.
    fn write(&self, grid: &TextGrid, path: &Path) -> Result<(), TextGridError>;
}
