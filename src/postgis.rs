//! Tile features from a PostGIS database with `soundscape_tile` installed.
//!
//! The database is assumed to be fully populated; all tiling happens server-side.
use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, error};

use sqlx::pool::PoolConnection;
use sqlx::{query, PgPool, Postgres};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::pool::create_lazy_pool;
use crate::row::feature_row;
use crate::tile::{FeatureCollection, FeatureRow, TileCoordinate};
use crate::TileSource;

/// Parameters are zoom, tile_x, tile_y, always bound, never interpolated.
pub const TILE_QUERY: &str = "SELECT * FROM soundscape_tile($1, $2, $3)";

/// Somewhere tile connections come from. Implemented for [`PgPool`]; the seam
/// exists so the client can run against any pool-like resource.
#[async_trait]
pub trait TileDatabase: Send + Sync {
    type Connection: TileConnection;

    /// Checks out a connection. It goes back to the pool when dropped, so
    /// it is released on every exit path, including a cancelled query.
    async fn acquire(&self) -> std::result::Result<Self::Connection, sqlx::Error>;
}

/// A checked-out connection able to run the tile query.
#[async_trait]
pub trait TileConnection: Send {
    /// Runs the tile query and eagerly fetches every row, in result order.
    async fn fetch_tile(
        &mut self,
        tile: TileCoordinate,
    ) -> std::result::Result<Vec<FeatureRow>, sqlx::Error>;
}

#[async_trait]
impl TileDatabase for PgPool {
    type Connection = PoolConnection<Postgres>;

    async fn acquire(&self) -> std::result::Result<Self::Connection, sqlx::Error> {
        PgPool::acquire(self).await
    }
}

#[async_trait]
impl TileConnection for PoolConnection<Postgres> {
    async fn fetch_tile(
        &mut self,
        tile: TileCoordinate,
    ) -> std::result::Result<Vec<FeatureRow>, sqlx::Error> {
        let rows = query(TILE_QUERY)
            .bind(i32::from(tile.zoom))
            .bind(tile.x)
            .bind(tile.y)
            .fetch_all(&mut **self)
            .await?;

        rows.iter().map(feature_row).collect()
    }
}

/// A drop-in replacement for the Overpass-backed client that reads tiles
/// from PostGIS instead.
///
/// The client holds no per-query state. Concurrent queries each borrow
/// their own connection from the shared pool.
#[derive(Clone, Debug)]
pub struct PostgisClient<D = PgPool> {
    database: D,
}

impl PostgisClient<PgPool> {
    /// Same arguments as the Overpass client. Only `server` is used; the
    /// rest exist so the two clients can be swapped at the call site.
    ///
    /// The pool connects lazily, so this must run inside a Tokio runtime and
    /// connection failures are reported by [`TileSource::query`].
    pub fn new(
        server: &str,
        user_agent: &str,
        cache_dir: &Path,
        cache_days: u32,
        cache_size: u64,
    ) -> Result<Self> {
        let config = ClientConfig {
            user_agent: Some(user_agent.to_owned()),
            cache_dir: Some(cache_dir.to_path_buf()),
            cache_days: Some(cache_days),
            cache_size: Some(cache_size),
            ..ClientConfig::new(server)
        };

        PostgisClient::from_config(&config)
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        if config.has_overpass_settings() {
            debug!("Ignoring user agent and cache settings; PostGIS is always up to date");
        }

        let pool = create_lazy_pool(&config.server, &config.pool)?;
        Ok(PostgisClient::with_database(pool))
    }
}

impl<D: TileDatabase> PostgisClient<D> {
    /// Builds a client on an existing pool (or any other [`TileDatabase`]).
    pub fn with_database(database: D) -> Self {
        PostgisClient { database }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Fetches the features of a tile at an explicit zoom level.
    ///
    /// Failures are logged once and returned as-is; nothing is retried.
    pub async fn query_tile(&self, tile: TileCoordinate) -> Result<FeatureCollection> {
        let result = self.fetch(tile).await;

        if let Err(e) = &result {
            error!(zoom = tile.zoom, x = tile.x, y = tile.y, "{}", e);
        }

        result
    }

    async fn fetch(&self, tile: TileCoordinate) -> Result<FeatureCollection> {
        let mut conn = self.database.acquire().await.map_err(Error::Connection)?;
        let features = conn.fetch_tile(tile).await.map_err(Error::Query)?;

        Ok(FeatureCollection::new(features))
    }
}

#[async_trait]
impl<D: TileDatabase> TileSource for PostgisClient<D> {
    async fn query(&self, x: i32, y: i32) -> Result<FeatureCollection> {
        self.query_tile(TileCoordinate::new(x, y)).await
    }
}
