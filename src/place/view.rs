use super::{PlaceRecord, PlaceStatus};
use crate::{
    api::{Id, Page},
    Result,
};
use std::future::Future;
use tracing::{info, warn};

pub trait PlaceStore {
    fn fetch_places(
        &self,
        page_index: u64,
        page_size: u64,
    ) -> impl Future<Output = Result<Page<PlaceRecord>>> + Send;

    fn set_place_status(
        &self,
        id: &Id,
        status: PlaceStatus,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// One page of leads.
pub struct LeadsView<S> {
    store: S,
    page_index: u64,
    page_size: u64,
    page: Page<PlaceRecord>,
}

impl<S: PlaceStore> LeadsView<S> {
    pub fn new(store: S, page_size: u64) -> Self {
        LeadsView {
            store,
            page_index: 0,
            page_size: page_size.max(1),
            page: Page::default(),
        }
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn page(&self) -> &Page<PlaceRecord> {
        &self.page
    }

    /// A failed load leaves an empty list behind.
    pub async fn load(&mut self, page_index: u64) -> Result<()> {
        self.page_index = page_index;
        match self.store.fetch_places(page_index, self.page_size).await {
            Ok(page) => {
                self.page = page;
                Ok(())
            }
            Err(e) => {
                warn!(page_index, error = %e, "Failed to load places");
                self.page = Page::default();
                Err(e)
            }
        }
    }

    /// The row changes only after the backend accepted the new status.
    pub async fn set_status(&mut self, id: &Id, status: PlaceStatus) -> Result<()> {
        self.store.set_place_status(id, status).await?;
        info!(%id, %status, "Place status changed");
        if let Some(place) = self.page.data.iter_mut().find(|it| &it.id == id) {
            place.status = Some(status);
        }
        Ok(())
    }
}
