pub mod duration;

pub mod file_io;
