//! Wire surface of the ShapeTree protocol.
//!
//! Framework-independent request and response types, the header and link
//! relation vocabulary the protocol recognizes, `Link` parsing, and the JSON
//! body used for every error response.

pub mod endpoint;
pub mod error;
pub mod link;
pub mod message;
pub mod wire;

pub use endpoint::{endpoints, HealthResponse};
pub use error::{ErrorBody, ProtocolError, ProtocolResult};
pub use link::{interaction_model, parse_link_header, shape_tree, InteractionModel, Link};
pub use message::{LdpRequest, LdpResponse, Method};
pub use wire::{headers, media, rel};
