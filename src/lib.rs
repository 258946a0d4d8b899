pub mod composer;
pub mod config;
pub mod coordinator;
pub mod database;
pub mod errors;
pub mod execute;
pub mod http_file_parser;
pub mod http_request;
pub mod http_request_executor;
pub mod local_store;
pub mod remote_store;
pub mod response_classifier;
