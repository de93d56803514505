//! # Quill Shared
//!
//! Wire types shared between the server and its clients: request and
//! response bodies (camelCase JSON) and RFC 7807 error documents.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
