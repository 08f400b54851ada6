pub mod praat_textgrid_reader;
pub mod praat_textgrid_writer;
