use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use super::upstream::{CatalogUpstream, ListedRef, ListingPage, UpstreamCreature, UpstreamError};

const USER_AGENT: &str = concat!("creature-catalog/", env!("CARGO_PKG_VERSION"));

/// `CatalogUpstream` over the public REST catalog.
///
/// `base_url` points at the collection, e.g. `https://pokeapi.co/api/v2/pokemon`;
/// listings are `GET {base_url}?limit=&offset=` and details `GET {base_url}/{id}`.
#[derive(Clone)]
pub struct HttpCatalogUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalogUpstream {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn from_config(cfg: &configs::UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(cfg.connect_timeout())
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        Ok(Self::new(cfg.base_url.clone(), client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T>(&self, request: reqwest::RequestBuilder) -> Result<T, UpstreamError>
    where
        T: serde::de::DeserializeOwned,
    {
        let resp = request.send().await.map_err(map_transport)?;
        match resp.status() {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(UpstreamError::NotFound),
            s => return Err(UpstreamError::Status(s.as_u16())),
        }
        resp.json::<T>().await.map_err(|e| UpstreamError::Decode(e.to_string()))
    }
}

fn map_transport(e: reqwest::Error) -> UpstreamError {
    if e.is_timeout() {
        UpstreamError::Timeout
    } else {
        UpstreamError::Transport(e.to_string())
    }
}

#[async_trait]
impl CatalogUpstream for HttpCatalogUpstream {
    async fn list_page(&self, limit: u32, offset: u64) -> Result<Vec<ListedRef>, UpstreamError> {
        debug!(base_url = %self.base_url, limit, offset, "upstream list request");
        let request = self
            .client
            .get(&self.base_url)
            .query(&[("limit", u64::from(limit)), ("offset", offset)]);
        let page: ListingPage = self.get_json(request).await?;
        Ok(page.results)
    }

    async fn fetch_detail(&self, id: i64) -> Result<UpstreamCreature, UpstreamError> {
        let url = format!("{}/{id}", self.base_url);
        debug!(%url, "upstream detail request");
        self.get_json(self.client.get(&url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn upstream_for(server: &MockServer) -> HttpCatalogUpstream {
        HttpCatalogUpstream::new(format!("{}/pokemon/", server.uri()), reqwest::Client::new())
    }

    #[tokio::test]
    async fn list_page_sends_limit_and_offset() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon"))
            .and(query_param("limit", "2"))
            .and(query_param("offset", "4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "count": 1302,
                "next": null,
                "previous": null,
                "results": [
                    { "name": "charmeleon", "url": "https://pokeapi.co/api/v2/pokemon/5/" },
                    { "name": "charizard", "url": "https://pokeapi.co/api/v2/pokemon/6/" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let refs = upstream_for(&server).list_page(2, 4).await.expect("list ok");
        let ids: Vec<_> = refs.iter().filter_map(ListedRef::id).collect();
        assert_eq!(ids, vec![5, 6]);
    }

    #[tokio::test]
    async fn fetch_detail_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/25"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 25,
                "name": "pikachu",
                "types": [{ "slot": 1, "type": { "name": "electric" } }],
                "stats": [{ "base_stat": 35 }],
                "sprites": { "front_default": "f.png", "back_default": "b.png" }
            })))
            .mount(&server)
            .await;

        let detail = upstream_for(&server).fetch_detail(25).await.expect("detail ok");
        assert_eq!(detail.id, 25);
        assert_eq!(detail.categories[0].category.name, "electric");
        assert_eq!(detail.statistics[0].base_value, 35);
    }

    #[tokio::test]
    async fn fetch_detail_maps_404_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/-1"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let err = upstream_for(&server).fetch_detail(-1).await.unwrap_err();
        assert_eq!(err, UpstreamError::NotFound);
    }

    #[tokio::test]
    async fn server_errors_and_bad_json_are_distinguished() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/1"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pokemon/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let upstream = upstream_for(&server);
        assert_eq!(upstream.fetch_detail(1).await.unwrap_err(), UpstreamError::Status(503));
        assert!(matches!(upstream.fetch_detail(2).await.unwrap_err(), UpstreamError::Decode(_)));
    }

    #[tokio::test]
    async fn client_timeout_is_reported_as_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pokemon/3"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .expect("client");
        let upstream = HttpCatalogUpstream::new(format!("{}/pokemon", server.uri()), client);
        assert_eq!(upstream.fetch_detail(3).await.unwrap_err(), UpstreamError::Timeout);
    }

    #[test]
    fn from_config_trims_trailing_slash() {
        let cfg = configs::UpstreamConfig {
            base_url: "http://localhost:1/pokemon/".into(),
            ..Default::default()
        };
        let upstream = HttpCatalogUpstream::from_config(&cfg).expect("build");
        assert_eq!(upstream.base_url(), "http://localhost:1/pokemon");
    }
}
