//! Navigation model: the edge/node pair for one crawl hop.
//!
//! A [`Request`] is an edge the frontier may follow, a [`Response`] is the node it
//! reached. New requests only ever enter the frontier through
//! [`Request::from_response`], which resolves a discovered link against the page it
//! was found on and bumps the depth by one.

mod headers;
mod request;
mod response;

pub use headers::Headers;
pub use request::Request;
pub use response::Response;
