use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::services::coordinator::{BookingCoordinator, FlowSettings};
use crate::services::delivery::LeadDelivery;
use crate::services::voice::listener::spawn_voice_listener;
use crate::services::voice::{ClipStore, VoiceSynthesizer};

struct Entry {
    coordinator: Arc<BookingCoordinator>,
    last_seen: Instant,
}

/// One coordinator per visitor.
pub struct SessionRegistry {
    settings: FlowSettings,
    delivery: Arc<dyn LeadDelivery>,
    voice: Arc<dyn VoiceSynthesizer>,
    clips: Arc<ClipStore>,
    confirmation_phrase: String,
    sessions: Mutex<HashMap<Uuid, Entry>>,
}

impl SessionRegistry {
    pub fn new(
        settings: FlowSettings,
        delivery: Arc<dyn LeadDelivery>,
        voice: Arc<dyn VoiceSynthesizer>,
        clips: Arc<ClipStore>,
        confirmation_phrase: String,
    ) -> Self {
        Self {
            settings,
            delivery,
            voice,
            clips,
            confirmation_phrase,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    pub fn delivery(&self) -> &Arc<dyn LeadDelivery> {
        &self.delivery
    }

    pub fn clips(&self) -> &ClipStore {
        &self.clips
    }

    pub fn create(&self) -> Arc<BookingCoordinator> {
        let id = Uuid::new_v4();
        let coordinator =
            BookingCoordinator::new(id, self.settings.clone(), Arc::clone(&self.delivery));

        spawn_voice_listener(
            id,
            coordinator.subscribe(),
            Arc::clone(&self.voice),
            self.clips.clone(),
            self.confirmation_phrase.clone(),
        );

        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                Entry {
                    coordinator: Arc::clone(&coordinator),
                    last_seen: Instant::now(),
                },
            );

        tracing::info!(session = %id, "session created");
        coordinator
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<BookingCoordinator>> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        sessions.get_mut(&id).map(|entry| {
            entry.last_seen = Instant::now();
            Arc::clone(&entry.coordinator)
        })
    }

    pub fn remove(&self, id: Uuid) -> bool {
        let removed = self
            .sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);

        match removed {
            Some(entry) => {
                entry.coordinator.teardown();
                self.clips.forget(id);
                tracing::info!(session = %id, "session removed");
                true
            }
            None => false,
        }
    }

    /// Tears down sessions nobody has touched for `ttl`. Returns how many went.
    pub fn expire_idle(&self, ttl: Duration) -> usize {
        let expired: Vec<Entry> = {
            let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            let stale: Vec<Uuid> = sessions
                .iter()
                .filter(|(_, entry)| entry.last_seen.elapsed() >= ttl)
                .map(|(id, _)| *id)
                .collect();
            stale.iter().filter_map(|id| sessions.remove(id)).collect()
        };

        for entry in &expired {
            entry.coordinator.teardown();
            self.clips.forget(entry.coordinator.id());
        }
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
