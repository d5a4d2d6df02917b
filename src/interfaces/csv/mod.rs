pub mod command_reader;
pub mod pool_writer;
