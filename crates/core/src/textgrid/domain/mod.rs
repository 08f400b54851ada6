pub mod textgrid;
pub mod textgrid_error;
pub mod textgrid_merger;
pub mod textgrid_writer;
