//! Server lifecycle for LiveScore
//!
//! The HTTP server implements the [`Server`] trait; [`ServerExt`] adds
//! `spawn()` and `run_with_ctrl_c()`. Shutdown is coordinated through a
//! `CancellationToken`, so cancelling the parent token stops every child.
//!
//! ```ignore
//! use server::{HttpServer, ServerConfig, ServerExt};
//!
//! let server = HttpServer::new(ServerConfig::new("0.0.0.0", 8080), router);
//! server.run_with_ctrl_c().await?;
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod shutdown;
pub mod traits;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use http::HttpServer;
pub use shutdown::{shutdown_signal, ShutdownController};
pub use traits::{Server, ServerExt};
