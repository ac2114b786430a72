pub mod category;
pub mod cli;
pub mod fetch;
pub mod http;
pub mod layout;
pub mod logging;
pub mod page;
pub mod pipeline;
pub mod sanitize;
pub mod scheduler;
