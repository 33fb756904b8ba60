//! Reverse geocoding enrichment, decoupled from the request path.
//!
//! The lookup talks to an external service and can be slow or fail
//! outright, so it runs as a supervised background task: the caller gets a
//! handle to wait on, poll, or abandon, and failures are logged and
//! swallowed rather than propagated to whatever triggered the enrichment.

use std::{
    sync::{
        mpsc::{self, Receiver, TryRecvError},
        Arc,
    },
    thread,
    time::Duration,
};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Resolves coordinates to a human-readable place name.
pub trait ReverseGeocoder: Send + Sync {
    /// `Ok(None)` means the service had no match, which is not a failure.
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>>;
}

/// Reverse geocoding against a Nominatim instance.
pub struct Nominatim {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl Nominatim {
    /// Client for the public OpenStreetMap Nominatim API.
    pub fn public_api() -> Result<Self> {
        Self::new("https://nominatim.openstreetmap.org")
    }

    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("clearfile/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::engine("nominatim", e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl ReverseGeocoder for Nominatim {
    fn reverse(&self, latitude: f64, longitude: f64) -> Result<Option<String>> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .send()
            .map_err(|e| Error::engine("nominatim", e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::engine(
                "nominatim",
                format!("status {}", response.status()),
            ));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| Error::engine("nominatim", e.to_string()))?;
        Ok(body
            .get("display_name")
            .and_then(|v| v.as_str())
            .map(str::to_string))
    }
}

/// A running enrichment lookup. Dropping the handle abandons the task
/// without affecting anything the caller has already stored.
pub struct EnrichmentTask {
    handle: thread::JoinHandle<()>,
    receiver: Receiver<String>,
}

impl EnrichmentTask {
    /// Block until the lookup finishes and return the place name, if any.
    ///
    /// Every failure mode (network error, no match, worker panic) comes
    /// back as `None`; the error itself has already been logged.
    pub fn wait(self) -> Option<String> {
        let _ = self.handle.join();
        self.receiver.try_recv().ok()
    }

    /// Non-blocking check for a delivered result.
    pub fn poll(&self) -> Option<String> {
        match self.receiver.try_recv() {
            Ok(place) => Some(place),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }
}

/// Start a reverse-geocode lookup on its own thread.
///
/// The result is delivered over a channel; the triggering caller never
/// blocks on the external service and never sees its failures.
pub fn spawn_reverse_geocode(
    geocoder: Arc<dyn ReverseGeocoder>,
    latitude: f64,
    longitude: f64,
) -> EnrichmentTask {
    let (sender, receiver) = mpsc::channel();
    let handle = thread::spawn(move || match geocoder.reverse(latitude, longitude) {
        Ok(Some(place)) => {
            debug!(latitude, longitude, %place, "reverse geocoding resolved");
            let _ = sender.send(place);
        }
        Ok(None) => debug!(latitude, longitude, "reverse geocoding had no match"),
        Err(error) => warn!(latitude, longitude, %error, "reverse geocoding failed"),
    });
    EnrichmentTask { handle, receiver }
}
