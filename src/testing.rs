//! Test doubles for the database seam and for log capture.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

use crate::postgis::{TileConnection, TileDatabase};
use crate::tile::{FeatureRow, TileCoordinate};

pub(crate) fn feature(value: Value) -> FeatureRow {
    match value {
        Value::Object(map) => map,
        other => panic!("not an object: {}", other),
    }
}

#[derive(Clone)]
pub(crate) enum MockBehavior {
    Rows(Vec<FeatureRow>),
    FailAcquire,
    FailFetch,
    /// The query never completes.
    Hang,
}

#[derive(Default)]
pub(crate) struct Counters {
    pub acquired: AtomicUsize,
    pub released: AtomicUsize,
    pub queries: Mutex<Vec<TileCoordinate>>,
}

pub(crate) struct MockDatabase {
    behavior: MockBehavior,
    counters: Arc<Counters>,
}

impl MockDatabase {
    pub fn new(behavior: MockBehavior) -> MockDatabase {
        MockDatabase {
            behavior,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn counters(&self) -> Arc<Counters> {
        self.counters.clone()
    }
}

pub(crate) struct MockConnection {
    behavior: MockBehavior,
    counters: Arc<Counters>,
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TileDatabase for MockDatabase {
    type Connection = MockConnection;

    async fn acquire(&self) -> Result<MockConnection, sqlx::Error> {
        if let MockBehavior::FailAcquire = self.behavior {
            return Err(sqlx::Error::PoolTimedOut);
        }

        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(MockConnection {
            behavior: self.behavior.clone(),
            counters: self.counters.clone(),
        })
    }
}

#[async_trait]
impl TileConnection for MockConnection {
    async fn fetch_tile(&mut self, tile: TileCoordinate) -> Result<Vec<FeatureRow>, sqlx::Error> {
        self.counters.queries.lock().unwrap().push(tile);

        match &self.behavior {
            MockBehavior::Rows(rows) => Ok(rows.clone()),
            MockBehavior::FailFetch => Err(sqlx::Error::Protocol(
                "connection reset while reading rows".into(),
            )),
            MockBehavior::Hang => futures::future::pending().await,
            MockBehavior::FailAcquire => unreachable!(),
        }
    }
}

/// Counts ERROR events emitted while installed as the thread's subscriber.
#[derive(Clone, Default)]
pub(crate) struct ErrorCounter {
    count: Arc<AtomicUsize>,
}

impl ErrorCounter {
    pub fn install(&self) -> DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }
}
