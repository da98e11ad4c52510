#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

mod http;
pub use http::{client, TIMEOUT, USER_AGENT};

mod wikipedia;
pub use wikipedia::Wikipedia;

mod milog;
pub use milog::Milog;

mod oracle;
pub use oracle::HttpScoreService;

pub mod corpus;

pub mod util;
