//! Neighbor client — the catalog HTTP protocol, seen from the pulling side.
//!
//! One client is bound to one neighbor for one sync stage. Every call
//! returns a [`Reply`] so callers can tell "peer has nothing" from "peer is
//! broken", while still treating both as empty when that is all they need.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::ACCEPT;
use reqwest::{StatusCode, Url};
use thoth_core::entity::EntityKind;
use thoth_core::wire::{
    EntryDescriptor, ImplementationList, InterfaceList, Listing, SpecificationList,
    JSON_CONTENT_TYPE, PLAIN_CONTENT_TYPE,
};
use thoth_core::NeighborAddress;
use tokio::net::TcpStream;

/// Answer to one request against a neighbor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    Found(T),
    /// Non-success status: the neighbor does not have it.
    NotFound,
    /// The body could not be parsed.
    Malformed(String),
    /// The request failed in transport after the neighbor was reachable.
    Unreachable(String),
}

impl<T> Reply<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Reply::Found(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Reply::Found(_))
    }

    /// Reason for a failed reply; `None` for `Found` and `NotFound`.
    pub fn failure(&self) -> Option<String> {
        match self {
            Reply::Malformed(reason) => Some(format!("malformed reply: {reason}")),
            Reply::Unreachable(reason) => Some(format!("request failed: {reason}")),
            _ => None,
        }
    }
}

impl<T: Default> Reply<T> {
    /// Every non-`Found` answer collapses to empty.
    pub fn found_or_default(self) -> T {
        self.found().unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NeighborError {
    #[error("neighbor {addr} unreachable: {source}")]
    Unreachable {
        addr: NeighborAddress,
        #[source]
        source: std::io::Error,
    },
    #[error("neighbor {addr} did not accept a connection within {timeout:?}")]
    ConnectTimeout {
        addr: NeighborAddress,
        timeout: Duration,
    },
    #[error("neighbor {addr} has an unusable address: {reason}")]
    BadAddress { addr: NeighborAddress, reason: String },
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Connect and request timeouts for neighbor calls.
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    pub connect: Duration,
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(2),
            request: Duration::from_secs(10),
        }
    }
}

pub struct NeighborClient {
    addr: NeighborAddress,
    base: Url,
    http: reqwest::Client,
}

impl NeighborClient {
    /// Probe the neighbor and bind a client to it.
    ///
    /// Fails when no TCP connection can be made; callers skip the neighbor.
    pub async fn connect(
        addr: &NeighborAddress,
        timeouts: Timeouts,
    ) -> Result<Self, NeighborError> {
        let base = Url::parse(&addr.base_url()).map_err(|e| NeighborError::BadAddress {
            addr: addr.clone(),
            reason: e.to_string(),
        })?;

        let probe = TcpStream::connect((addr.host.as_str(), addr.port));
        match tokio::time::timeout(timeouts.connect, probe).await {
            Ok(Ok(_stream)) => {}
            Ok(Err(source)) => {
                return Err(NeighborError::Unreachable {
                    addr: addr.clone(),
                    source,
                })
            }
            Err(_) => {
                return Err(NeighborError::ConnectTimeout {
                    addr: addr.clone(),
                    timeout: timeouts.connect,
                })
            }
        }

        let http = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .timeout(timeouts.request)
            .build()?;

        Ok(Self {
            addr: addr.clone(),
            base,
            http,
        })
    }

    pub fn addr(&self) -> &NeighborAddress {
        &self.addr
    }

    /// `GET /interfaces/{name}` as JSON: the descriptor if the neighbor has it.
    pub async fn check_interface_exists(&self, name: &str) -> Reply<EntryDescriptor> {
        self.get_json(&["interfaces", name]).await
    }

    pub async fn list_interfaces(&self) -> Reply<Vec<EntryDescriptor>> {
        self.list::<InterfaceList>(&["interfaces"]).await
    }

    pub async fn fetch_interface_content(&self, name: &str) -> Reply<Bytes> {
        self.get_raw(&["interfaces", name]).await
    }

    pub async fn list_specifications(&self, interface: &str) -> Reply<Vec<EntryDescriptor>> {
        self.list_entries(EntityKind::Specification, interface).await
    }

    pub async fn fetch_specification_content(&self, interface: &str, name: &str) -> Reply<Bytes> {
        self.fetch_entry_content(EntityKind::Specification, interface, name)
            .await
    }

    pub async fn list_implementations(&self, interface: &str) -> Reply<Vec<EntryDescriptor>> {
        self.list_entries(EntityKind::Implementation, interface).await
    }

    pub async fn fetch_implementation_content(&self, interface: &str, name: &str) -> Reply<Bytes> {
        self.fetch_entry_content(EntityKind::Implementation, interface, name)
            .await
    }

    /// Listing of implementations or specifications of `interface`.
    pub async fn list_entries(
        &self,
        kind: EntityKind,
        interface: &str,
    ) -> Reply<Vec<EntryDescriptor>> {
        match kind {
            EntityKind::Interface => self.list::<InterfaceList>(&["interfaces"]).await,
            EntityKind::Implementation => {
                self.list::<ImplementationList>(&["implementations", interface])
                    .await
            }
            EntityKind::Specification => {
                self.list::<SpecificationList>(&["specifications", interface])
                    .await
            }
        }
    }

    /// Raw content of one implementation or specification.
    pub async fn fetch_entry_content(
        &self,
        kind: EntityKind,
        interface: &str,
        name: &str,
    ) -> Reply<Bytes> {
        match kind {
            EntityKind::Interface => self.get_raw(&["interfaces", name]).await,
            EntityKind::Implementation => self.get_raw(&["implementations", interface, name]).await,
            EntityKind::Specification => self.get_raw(&["specifications", interface, name]).await,
        }
    }

    // ── Transport ─────────────────────────────────────────────────────────────

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, segments: &[&str], accept: &str) -> Reply<Bytes> {
        let url = self.url(segments);
        let resp = match self.http.get(url.clone()).header(ACCEPT, accept).send().await {
            Ok(r) => r,
            Err(e) => return Reply::Unreachable(e.to_string()),
        };

        let status = resp.status();
        if status != StatusCode::OK {
            tracing::debug!(neighbor = %self.addr, %url, %status, "neighbor has no entry");
            return Reply::NotFound;
        }

        match resp.bytes().await {
            Ok(body) => Reply::Found(body),
            Err(e) => Reply::Unreachable(e.to_string()),
        }
    }

    async fn get_raw(&self, segments: &[&str]) -> Reply<Bytes> {
        self.get(segments, PLAIN_CONTENT_TYPE).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, segments: &[&str]) -> Reply<T> {
        match self.get(segments, JSON_CONTENT_TYPE).await {
            Reply::Found(body) => match serde_json::from_slice(&body) {
                Ok(v) => Reply::Found(v),
                Err(e) => Reply::Malformed(e.to_string()),
            },
            Reply::NotFound => Reply::NotFound,
            Reply::Malformed(r) => Reply::Malformed(r),
            Reply::Unreachable(r) => Reply::Unreachable(r),
        }
    }

    async fn list<L: Listing>(&self, segments: &[&str]) -> Reply<Vec<EntryDescriptor>> {
        match self.get_json::<L>(segments).await {
            Reply::Found(listing) => Reply::Found(listing.into_entries()),
            Reply::NotFound => Reply::NotFound,
            Reply::Malformed(r) => Reply::Malformed(r),
            Reply::Unreachable(r) => Reply::Unreachable(r),
        }
    }
}
