#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod background;
pub mod extract;
pub mod handler;
pub mod middleware;
pub mod prelude;
pub mod service;
mod utility;
