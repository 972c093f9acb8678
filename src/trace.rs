//! Optional tracing around tile queries.
use async_trait::async_trait;
use tracing::{info_span, Instrument};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::error::Result;
use crate::tile::FeatureCollection;
use crate::TileSource;

/// Wraps any [`TileSource`] so each query runs inside a
/// `soundscape_tile_query` span carrying the tile coordinates.
#[derive(Clone, Debug)]
pub struct Traced<S> {
    inner: S,
}

impl<S> Traced<S> {
    pub fn new(inner: S) -> Traced<S> {
        Traced { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: TileSource> TileSource for Traced<S> {
    async fn query(&self, x: i32, y: i32) -> Result<FeatureCollection> {
        let span = info_span!("soundscape_tile_query", zoom = crate::ZOOM_DEFAULT, x, y);
        self.inner.query(x, y).instrument(span).await
    }
}

/// Installs a global fmt subscriber filtered by `RUST_LOG`.
/// Not calling this simply leaves traces and logs unrecorded.
pub fn init_subscriber() -> std::result::Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
