//! # Soundscape PostGIS
//!
//! Tile feature lookups for Soundscape, served from a PostGIS database.
//!
//! ## Overview
//!
//! [`PostgisClient`] is a drop-in replacement for the Overpass-backed tile
//! client. Both implement [`TileSource`], so callers can swap one for the other
//! without changing the call site. Given a tile's x/y coordinates, the client
//! calls the `soundscape_tile` function installed in the database and returns
//! the resulting rows as a GeoJSON-style [`FeatureCollection`].
//!
//! All of the interesting work (tiling, spatial indexing, feature aggregation)
//! happens inside `soundscape_tile`. This crate only binds the parameters, maps
//! the rows to JSON, and reports failures.
//!
//! ## Usage
//!
//! ```no_run
//! # async fn run() -> Result<(), soundscape_postgis::Error> {
//! use soundscape_postgis::{pool, ClientConfig, PostgisClient, TileSource};
//!
//! let config = ClientConfig::load("soundscape.yml")?;
//! let pool = pool::create_pool(&config.server, &config.pool).await?;
//! let client = PostgisClient::with_database(pool.clone());
//!
//! let tile = client.query(10, 20).await?;
//! println!("{}", tile.len());
//!
//! pool.close().await;
//! # Ok(())
//! # }
//! ```

#![deny(warnings)]

use async_trait::async_trait;

/// The zoom level Soundscape tiles are generated at.
pub const ZOOM_DEFAULT: u8 = 16;

/// The call-site contract shared by every tile client.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Returns the features of tile (x, y) at [`ZOOM_DEFAULT`].
    /// An empty collection means the tile has no features.
    async fn query(&self, x: i32, y: i32) -> Result<FeatureCollection, Error>;
}

pub mod config;
pub mod error;
pub mod pool;
pub mod postgis;
pub mod row;
pub mod tile;
pub mod trace;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, PoolConfig};
pub use error::Error;
pub use postgis::{PostgisClient, TileConnection, TileDatabase};
pub use tile::{FeatureCollection, FeatureRow, TileCoordinate};
pub use trace::Traced;
