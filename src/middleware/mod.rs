pub mod dev_logger;
