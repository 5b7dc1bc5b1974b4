use super::{Id, Page, Session};
use crate::{
    conf::Conf,
    execution::{DashboardChart, ExecutionRecord, LaunchRequest, PageSource},
    place::{PlaceRecord, PlaceStatus, PlaceStore},
    Error, Result,
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::info;
use url::Url;

/// Typed client for the leads backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: Url, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(ApiClient {
            client,
            base_url,
            token: None,
        })
    }

    /// Picks up the session token exported after `login`, if any.
    pub fn from_conf(conf: &Conf) -> Result<Self> {
        let client = ApiClient::new(conf.api_url.clone(), &conf.user_agent)?;
        Ok(match &conf.token {
            Some(token) => client.with_session(&Session {
                token: token.clone(),
                user: None,
            }),
            None => client,
        })
    }

    pub fn with_session(mut self, session: &Session) -> Self {
        self.token = Some(session.token.clone());
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Generic(format!("Invalid base URL: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        info!(%method, url = url.as_str(), "Querying backend");
        let req = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        })
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T> {
        let res = req.send().await?;
        info!(response_status = ?res.status(), "Got response from backend");
        _parse(res).await
    }

    async fn send_ignoring_body(&self, req: RequestBuilder) -> Result<()> {
        let res = req.send().await?;
        info!(response_status = ?res.status(), "Got response from backend");
        _check(res).await
    }

    fn page_query(page_index: u64, limit: u64) -> [(&'static str, u64); 2] {
        // the backend counts pages from 1
        [("page", page_index + 1), ("limit", limit)]
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let req = self
            .request(Method::POST, &["auth", "login"])?
            .json(&json!({ "username": username, "password": password }));
        self.send(req).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<Session> {
        let req = self
            .request(Method::POST, &["auth", "register"])?
            .json(&json!({ "username": username, "password": password }));
        self.send(req).await
    }

    pub async fn places(&self, page_index: u64, limit: u64) -> Result<Page<PlaceRecord>> {
        let req = self
            .request(Method::GET, &["places"])?
            .query(&Self::page_query(page_index, limit));
        self.send(req).await
    }

    pub async fn place(&self, id: &Id) -> Result<PlaceRecord> {
        let req = self.request(Method::GET, &["places", &id.to_string()])?;
        self.send(req).await
    }

    pub async fn update_place(&self, place: &PlaceRecord) -> Result<()> {
        let req = self
            .request(Method::PUT, &["places", &place.id.to_string()])?
            .json(place);
        self.send_ignoring_body(req).await
    }

    pub async fn set_place_status(&self, id: &Id, status: PlaceStatus) -> Result<()> {
        let req = self
            .request(Method::PATCH, &["places", &id.to_string(), "status"])?
            .json(&json!({ "status": status }));
        self.send_ignoring_body(req).await
    }

    pub async fn delete_place(&self, id: &Id) -> Result<()> {
        let req = self.request(Method::DELETE, &["places", &id.to_string()])?;
        self.send_ignoring_body(req).await
    }

    pub async fn executions(&self, page_index: u64, limit: u64) -> Result<Page<ExecutionRecord>> {
        let req = self
            .request(Method::GET, &["executions"])?
            .query(&Self::page_query(page_index, limit));
        self.send(req).await
    }

    pub async fn execution(&self, id: &Id) -> Result<ExecutionRecord> {
        let req = self.request(Method::GET, &["executions", &id.to_string()])?;
        self.send(req).await
    }

    pub async fn execution_results(
        &self,
        id: &Id,
        page_index: u64,
        limit: u64,
    ) -> Result<Page<PlaceRecord>> {
        let req = self
            .request(Method::GET, &["executions", &id.to_string(), "results"])?
            .query(&Self::page_query(page_index, limit));
        self.send(req).await
    }

    pub async fn categories(&self) -> Result<Vec<String>> {
        let req = self.request(Method::GET, &["executions", "categories"])?;
        self.send(req).await
    }

    pub async fn launch(&self, launch: &LaunchRequest) -> Result<Value> {
        let req = self
            .request(Method::POST, &["executions", "launch"])?
            .json(launch);
        self.send(req).await
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardChart> {
        let req = self.request(Method::GET, &["executions", "stats", "dashboard"])?;
        self.send(req).await
    }
}

impl PageSource for ApiClient {
    async fn fetch_page(&self, page_index: u64, page_size: u64) -> Result<Page<ExecutionRecord>> {
        self.executions(page_index, page_size).await
    }
}

impl PlaceStore for ApiClient {
    async fn fetch_places(&self, page_index: u64, page_size: u64) -> Result<Page<PlaceRecord>> {
        self.places(page_index, page_size).await
    }

    async fn set_place_status(&self, id: &Id, status: PlaceStatus) -> Result<()> {
        ApiClient::set_place_status(self, id, status).await
    }
}

async fn _parse<T: DeserializeOwned>(res: Response) -> Result<T> {
    let status = res.status();
    let body = res.text().await?;
    if !status.is_success() {
        Err(Error::from_response(status, &body))?
    }
    // some endpoints answer 204 or an empty body, treat that as JSON null
    let body = if body.trim().is_empty() { "null" } else { body.as_str() };
    Ok(serde_json::from_str(body)?)
}

async fn _check(res: Response) -> Result<()> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await?;
        Err(Error::from_response(status, &body))?
    }
    Ok(())
}
