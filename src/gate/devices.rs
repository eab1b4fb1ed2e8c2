use super::{
    clock::Clock,
    store::{ClientStore, StoreError, KEY_TRUSTED_DEVICES},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use ulid::Ulid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrustedDevice {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only list of devices trusted after an admin login.
#[derive(Debug)]
pub struct DeviceTrustStore<'a, S, C> {
    store: &'a S,
    clock: &'a C,
}

impl<'a, S: ClientStore, C: Clock> DeviceTrustStore<'a, S, C> {
    #[must_use]
    pub const fn new(store: &'a S, clock: &'a C) -> Self {
        Self { store, clock }
    }

    /// Stored records; an unreadable list counts as empty.
    #[must_use]
    pub fn devices(&self) -> Vec<TrustedDevice> {
        let Some(raw) = self.store.get(KEY_TRUSTED_DEVICES) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("ignoring unreadable trusted device list: {err}");
            Vec::new()
        })
    }

    #[must_use]
    pub fn is_known_device(&self) -> bool {
        !self.devices().is_empty()
    }

    /// Appends a fresh device record.
    ///
    /// # Errors
    /// Returns an error if the list cannot be encoded or persisted.
    pub fn remember_device(&self) -> Result<TrustedDevice, StoreError> {
        let device = TrustedDevice {
            id: Ulid::new().to_string(),
            created_at: self.clock.now(),
        };

        let mut devices = self.devices();
        devices.push(device.clone());
        self.store
            .set(KEY_TRUSTED_DEVICES, &serde_json::to_string(&devices)?)?;

        info!(device_id = %device.id, total = devices.len(), "device trusted");
        Ok(device)
    }
}
