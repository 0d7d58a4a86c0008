//! The two read-only catalogs, loaded once at startup.

use tracing::info;

use crate::config::CatalogConfig;
use crate::error::Result;
use crate::events::EventCatalog;
use crate::live::LiveCatalog;

/// Event rules and live items, shared by reference with the extractor and
/// the recommender.
#[derive(Debug, Clone)]
pub struct Catalogs {
    /// Narrative event rules.
    pub events: EventCatalog,
    /// Purchasable live items.
    pub live: LiveCatalog,
}

impl Catalogs {
    /// Both bundled catalogs.
    ///
    /// # Errors
    /// Only fails if a bundled asset is broken.
    pub fn bundled() -> Result<Self> {
        Ok(Self {
            events: EventCatalog::bundled()?,
            live: LiveCatalog::bundled()?,
        })
    }

    /// Load catalogs, preferring configured files over the bundled assets.
    ///
    /// # Errors
    /// Returns an error if a configured file cannot be read or validated.
    pub fn load(config: &CatalogConfig) -> Result<Self> {
        let events = match &config.events_path {
            Some(path) => {
                info!(path = %path.display(), "loading event catalog from disk");
                EventCatalog::from_file(path)?
            }
            None => EventCatalog::bundled()?,
        };
        let live = match &config.live_items_path {
            Some(path) => {
                info!(path = %path.display(), "loading live catalog from disk");
                LiveCatalog::from_file(path)?
            }
            None => LiveCatalog::bundled()?,
        };
        info!(
            exact_events = events.exact_len(),
            event_patterns = events.patterns().len(),
            live_items = live.items().count(),
            "catalogs ready"
        );
        Ok(Self { events, live })
    }
}
