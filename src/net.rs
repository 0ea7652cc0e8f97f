//! Backend wire protocol: endpoint paths, DTOs, the uniform result type and
//! the gateway client that is the sole issuer of HTTP calls.

pub mod endpoints;
pub mod gateway;
pub mod response;
pub mod types;

pub use gateway::{ApiService, Gateway, RequestOptions, TransportError};
pub use response::{ApiFailure, ApiResponse};
