pub mod action_executor;
pub mod autocomplete;
pub mod catalog;
pub mod config;
pub mod contract;
pub mod core_service;
pub mod dispatcher;
pub mod history;
pub mod history_store;
pub mod logging;
pub mod path_complete;
pub mod process;
pub mod resolver;
pub mod runtime;
pub mod session;
pub mod template;
pub mod transport;
