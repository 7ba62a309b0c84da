use crate::fetcher::{
    errors::FetchError,
    guard,
    pipeline::{is_textual, process_response},
    types::RawPage,
};
use bytes::Bytes;
use reqwest::{Client, ClientBuilder, Response, header, redirect};
use std::{sync::Arc, time::Duration};
use tracing::{debug, instrument};
use url::Url;

const MAX_BODY_SIZE: usize = 5 * 1024 * 1024; // 5MB
const MAX_REDIRECTS: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Plenty of sites serve a bot wall to anything that doesn't look like a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Retrieves pages with a bounded timeout and a browser-like identity.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    allow_private_hosts: bool,
}

impl Fetcher {
    pub fn new(timeout: Duration, allow_private_hosts: bool) -> Result<Self, FetchError> {
        let mut builder = ClientBuilder::new()
            .connect_timeout(timeout)
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .redirect(redirect_policy(allow_private_hosts))
            .default_headers(default_headers());
        if !allow_private_hosts {
            builder = builder.dns_resolver(Arc::new(guard::PublicResolver));
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Unknown(e.to_string()))?;

        Ok(Self {
            client,
            allow_private_hosts,
        })
    }

    /// GET `url` and return whatever came back.
    ///
    /// HTTP error statuses are not errors here; the page is returned with its
    /// status so callers can decide. Only connection failures, DNS failures,
    /// timeouts and refused targets produce a [`FetchError`].
    #[instrument(skip_all, fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<RawPage, FetchError> {
        let parsed_url = Url::parse(url)?;
        guard::check_target(&parsed_url, self.allow_private_hosts)?;

        let mut response = self
            .client
            .get(parsed_url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        let final_url = response.url().clone();
        let status = response.status();
        let headers = response.headers().clone();

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        let body = if is_textual(&content_type) {
            read_capped(&mut response).await?
        } else {
            debug!(content_type = %content_type, "skipping non-textual body");
            Bytes::new()
        };

        debug!(
            status = %status,
            final_url = %final_url,
            bytes = body.len(),
            "page fetched"
        );

        Ok(process_response(
            final_url,
            status,
            headers,
            body,
            &content_type,
        ))
    }
}

fn default_headers() -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("en-US,en;q=0.9"),
    );
    headers
}

/// Redirects are re-checked so a public URL can't bounce us onto an internal one.
fn redirect_policy(allow_private_hosts: bool) -> redirect::Policy {
    redirect::Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            return attempt.error("too many redirects");
        }
        match guard::check_target(attempt.url(), allow_private_hosts) {
            Ok(()) => attempt.follow(),
            Err(err) => attempt.error(err),
        }
    })
}

/// Read at most [`MAX_BODY_SIZE`] bytes; anything past the cap is dropped.
async fn read_capped(response: &mut Response) -> Result<Bytes, FetchError> {
    let mut body = Vec::new();

    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(FetchError::from_reqwest_error)?
    {
        let remaining = MAX_BODY_SIZE - body.len();
        if chunk.len() >= remaining {
            body.extend_from_slice(&chunk[..remaining]);
            debug!(limit = MAX_BODY_SIZE, "body truncated at size limit");
            break;
        }
        body.extend_from_slice(&chunk);
    }

    Ok(Bytes::from(body))
}
