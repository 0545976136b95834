pub mod config;
pub mod logging;

pub mod batch;
pub mod browser;
pub mod capture;
pub mod download;
pub mod entity;
pub mod error;
pub mod resolver;
pub mod retry;
pub mod shop;
pub mod sniff;
pub mod storage;
pub mod url_model;
pub mod urls;
