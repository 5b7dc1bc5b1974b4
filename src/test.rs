use crate::{
    api::{Id, Page},
    area::LatLon,
    execution::{ExecutionRecord, ExecutionStatus, PageSource},
    geocoding::{GeocodedPlace, Geocoder},
    place::{PlaceRecord, PlaceStatus, PlaceStore},
    Error, Result,
};
use serde_json::Map;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};
use time::OffsetDateTime;
use tokio::time::sleep;

pub fn mock_execution(id: i64, status: ExecutionStatus, created_at: OffsetDateTime) -> ExecutionRecord {
    ExecutionRecord {
        id: Id::Int(id),
        search_term: "Restaurante".into(),
        location: Some("Bogotá, Colombia".into()),
        status,
        created_at,
        result_count: None,
    }
}

pub fn mock_place(id: i64) -> PlaceRecord {
    PlaceRecord {
        id: Id::Int(id),
        title: Some(format!("Place {id}")),
        category_name: Some("Restaurante".into()),
        street: None,
        city: Some("Bogotá".into()),
        state: None,
        phone: None,
        website: None,
        maps_url: None,
        image_url: None,
        google_place_id: None,
        total_score: Some(4.5),
        reviews_count: Some(10),
        status: Some(PlaceStatus::Pending),
        created_at: None,
        extra: Map::new(),
    }
}

pub fn mock_page<T>(data: Vec<T>, total_pages: u64) -> Page<T> {
    let mut page = Page::default();
    page.pagination.total = data.len() as u64;
    page.pagination.total_pages = total_pages;
    page.data = data;
    page
}

#[derive(Default)]
struct GeocoderCalls {
    reverse: usize,
    forward: Vec<String>,
}

#[derive(Clone, Default)]
pub struct MockGeocoder {
    reverse_label: Option<String>,
    forward_match: Option<GeocodedPlace>,
    fail: bool,
    delay: Option<Duration>,
    calls: Arc<Mutex<GeocoderCalls>>,
}

impl MockGeocoder {
    pub fn reverse_label(mut self, label: &str) -> Self {
        self.reverse_label = Some(label.into());
        self
    }

    pub fn forward_match(mut self, point: LatLon, label: &str) -> Self {
        self.forward_match = Some(GeocodedPlace {
            point,
            label: label.into(),
        });
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn reverse_calls(&self) -> usize {
        self.calls.lock().unwrap().reverse
    }

    pub fn forward_queries(&self) -> Vec<String> {
        self.calls.lock().unwrap().forward.clone()
    }

    async fn respond<T>(&self, value: T) -> Result<T> {
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        if self.fail {
            Err(Error::Generic("Geocoder unavailable".into()))?
        }
        Ok(value)
    }
}

impl Geocoder for MockGeocoder {
    async fn reverse(&self, _point: LatLon) -> Result<Option<String>> {
        self.calls.lock().unwrap().reverse += 1;
        self.respond(self.reverse_label.clone()).await
    }

    async fn forward(&self, query: &str) -> Result<Option<GeocodedPlace>> {
        self.calls.lock().unwrap().forward.push(query.into());
        self.respond(self.forward_match.clone()).await
    }
}

#[derive(Default)]
struct MockPages {
    pages: HashMap<u64, Page<ExecutionRecord>>,
    delays: HashMap<u64, Duration>,
    next_delays: HashMap<u64, Duration>,
    fail: bool,
    calls: Vec<(u64, u64)>,
}

#[derive(Clone, Default)]
pub struct MockPageSource {
    inner: Arc<Mutex<MockPages>>,
}

impl MockPageSource {
    pub fn set_page(&self, page_index: u64, page: Page<ExecutionRecord>) {
        self.inner.lock().unwrap().pages.insert(page_index, page);
    }

    pub fn set_delay(&self, page_index: u64, delay: Duration) {
        self.inner.lock().unwrap().delays.insert(page_index, delay);
    }

    /// Delays only the next fetch of `page_index`.
    pub fn set_next_delay(&self, page_index: u64, delay: Duration) {
        self.inner.lock().unwrap().next_delays.insert(page_index, delay);
    }

    pub fn set_failing(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }

    pub fn calls(&self) -> Vec<(u64, u64)> {
        self.inner.lock().unwrap().calls.clone()
    }
}

impl PageSource for MockPageSource {
    async fn fetch_page(&self, page_index: u64, page_size: u64) -> Result<Page<ExecutionRecord>> {
        let delay = {
            let mut inner = self.inner.lock().unwrap();
            inner.calls.push((page_index, page_size));
            inner
                .next_delays
                .remove(&page_index)
                .or_else(|| inner.delays.get(&page_index).copied())
        };
        if let Some(delay) = delay {
            sleep(delay).await;
        }
        let inner = self.inner.lock().unwrap();
        if inner.fail {
            Err(Error::Generic("Backend unavailable".into()))?
        }
        Ok(inner.pages.get(&page_index).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
struct MockPlaces {
    places: Vec<PlaceRecord>,
    fail: bool,
    fetches: Vec<(u64, u64)>,
    status_changes: Vec<(Id, PlaceStatus)>,
}

#[derive(Clone, Default)]
pub struct MockPlaceStore {
    inner: Arc<Mutex<MockPlaces>>,
}

impl MockPlaceStore {
    pub fn with_places(places: Vec<PlaceRecord>) -> Self {
        let store = MockPlaceStore::default();
        store.inner.lock().unwrap().places = places;
        store
    }

    pub fn set_failing(&self, fail: bool) {
        self.inner.lock().unwrap().fail = fail;
    }

    pub fn fetches(&self) -> Vec<(u64, u64)> {
        self.inner.lock().unwrap().fetches.clone()
    }

    pub fn status_changes(&self) -> Vec<(Id, PlaceStatus)> {
        self.inner.lock().unwrap().status_changes.clone()
    }
}

impl PlaceStore for MockPlaceStore {
    async fn fetch_places(&self, page_index: u64, page_size: u64) -> Result<Page<PlaceRecord>> {
        let mut inner = self.inner.lock().unwrap();
        inner.fetches.push((page_index, page_size));
        if inner.fail {
            Err(Error::Generic("Backend unavailable".into()))?
        }
        Ok(mock_page(inner.places.clone(), 1))
    }

    async fn set_place_status(&self, id: &Id, status: PlaceStatus) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail {
            Err(Error::Generic("Backend unavailable".into()))?
        }
        inner.status_changes.push((id.clone(), status));
        Ok(())
    }
}
