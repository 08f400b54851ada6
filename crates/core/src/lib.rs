pub mod alignment;
pub mod audio;
pub mod dictionary;
pub mod pipeline;
pub mod shared;
pub mod textgrid;
pub mod transcript;
