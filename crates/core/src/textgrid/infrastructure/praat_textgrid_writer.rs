use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::Path;

use crate::textgrid::domain::textgrid::TextGrid;
use crate::textgrid::domain::textgrid_error::TextGridError;
use crate::textgrid::domain::textgrid_writer::TextGridWriter;

/// Writes TextGrids in Praat's long text format.
pub struct PraatTextGridWriter {
    force: bool,
}

impl PraatTextGridWriter {
    pub fn new(force: bool) -> Self {
        Self { force }
    }
}

impl TextGridWriter for PraatTextGridWriter {
    fn write(&self, grid: &TextGrid, path: &Path) -> Result<(), TextGridError> {
        if path.exists() && !self.force {
            return Err(TextGridError::OutputExists {
                path: path.to_path_buf(),
            });
        }

        // Write to a temp file first, then rename
        let temp_path = path.with_extension("part");
        let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;
        file.write_all(format_long(grid).as_bytes())
            .map_err(write_err(&temp_path))?;
        file.flush().map_err(write_err(&temp_path))?;
        drop(file);

        fs::rename(&temp_path, path).map_err(write_err(path))?;
        log::info!("Wrote TextGrid {}", path.display());
        Ok(())
    }
}

/// Serialise `grid` in the long (self-describing) text format.
pub fn format_long(grid: &TextGrid) -> String {
    let mut out = String::new();
    out.push_str("File type = \"ooTextFile\"\n");
    out.push_str("Object class = \"TextGrid\"\n\n");
    let _ = writeln!(out, "xmin = {:.6}", grid.start);
    let _ = writeln!(out, "xmax = {:.6}", grid.end);
    out.push_str("tiers? <exists>\n");
    let _ = writeln!(out, "size = {}", grid.tiers().len());
    out.push_str("item []:\n");

    for (n, tier) in grid.tiers().iter().enumerate() {
        let _ = writeln!(out, "\titem [{}]:", n + 1);
        out.push_str("\t\tclass = \"IntervalTier\"\n");
        let _ = writeln!(out, "\t\tname = \"{}\"", quote(&tier.name));
        let _ = writeln!(out, "\t\txmin = {:.6}", tier.start);
        let _ = writeln!(out, "\t\txmax = {:.6}", tier.end);
        let _ = writeln!(out, "\t\tintervals: size = {}", tier.len());
        for (o, interval) in tier.intervals().iter().enumerate() {
            let _ = writeln!(out, "\t\t\tintervals [{}]:", o + 1);
            let _ = writeln!(out, "\t\t\t\txmin = {:.6}", interval.start);
            let _ = writeln!(out, "\t\t\t\txmax = {:.6}", interval.end);
            let _ = writeln!(out, "\t\t\t\ttext = \"{}\"", quote(&interval.label));
        }
    }
    out
}

fn write_err(path: &Path) -> impl FnOnce(std::io::Error) -> TextGridError {
    let path = path.to_path_buf();
    move |source| TextGridError::Write { path, source }
}

fn quote(text: &str) -> String {
    text.replace('"', "\"\"")
}
