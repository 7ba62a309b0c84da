//! Outbound target checks.
//!
//! Every URL the fetcher touches is user supplied, so requests to loopback,
//! private and link-local addresses are refused unless explicitly allowed.
//! Literal hosts are checked up front by [`check_target`]; names are checked
//! after resolution by [`PublicResolver`].

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use thiserror::Error;
use url::{Host, Url};

use crate::fetcher::errors::FetchError;

/// A host name whose every address is loopback, private or link-local.
#[derive(Debug, Error)]
#[error("{host} resolves only to non-public addresses")]
pub struct NonPublicResolution {
    pub host: String,
}

/// DNS resolver that drops non-public addresses from every answer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PublicResolver;

impl Resolve for PublicResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let host = name.as_str().to_string();
        Box::pin(async move {
            let resolved = tokio::net::lookup_host((host.as_str(), 0)).await?;
            let addrs: Addrs = Box::new(public_addrs(&host, resolved)?.into_iter());
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}

/// Keep the public addresses of `host`; an answer with none left is refused.
pub fn public_addrs(
    host: &str,
    addrs: impl IntoIterator<Item = SocketAddr>,
) -> Result<Vec<SocketAddr>, NonPublicResolution> {
    let public: Vec<SocketAddr> = addrs
        .into_iter()
        .filter(|addr| !is_private_ip(&addr.ip()))
        .collect();

    if public.is_empty() {
        return Err(NonPublicResolution {
            host: host.to_string(),
        });
    }
    Ok(public)
}

/// Reject URLs the fetcher must never request.
pub fn check_target(url: &Url, allow_private_hosts: bool) -> Result<(), FetchError> {
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(FetchError::UnsupportedScheme(other.to_string())),
    }

    let host = url
        .host()
        .ok_or(FetchError::InvalidUrl(url::ParseError::EmptyHost))?;

    if !allow_private_hosts && is_private_host(&host) {
        return Err(FetchError::BlockedHost(host.to_string()));
    }

    Ok(())
}

pub fn is_private_host(host: &Host<&str>) -> bool {
    match host {
        Host::Domain(domain) => {
            let domain = domain.trim_end_matches('.').to_ascii_lowercase();
            domain == "localhost" || domain.ends_with(".localhost")
        }
        Host::Ipv4(ip) => is_private_v4(ip),
        Host::Ipv6(ip) => is_private_v6(ip),
    }
}

pub fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(ip) => is_private_v4(ip),
        IpAddr::V6(ip) => is_private_v6(ip),
    }
}

fn is_private_v4(ip: &Ipv4Addr) -> bool {
    ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        // 100.64.0.0/10 carrier-grade NAT
        || (ip.octets()[0] == 100 && (ip.octets()[1] & 0xc0) == 64)
}

fn is_private_v6(ip: &Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_v4(&mapped);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        || (first & 0xfe00) == 0xfc00 // unique local
        || (first & 0xffc0) == 0xfe80 // link local
}
