//! Content-negotiated request helpers.

use bytes::Bytes;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, Method};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{Client, Codec, Context, Result};

/// A [`Client`] view that encodes request bodies and decodes response bodies
/// with one codec.
///
/// Obtained through [`Client::json`], [`Client::xml`] or [`Client::codec`].
/// `Accept` and `Content-Type` default to the codec's media type unless the
/// caller already set them. Responses outside 200..300 become
/// [`ClientError::Status`](crate::ClientError::Status) carrying the raw body
/// text; the body is never decoded on that path.
pub struct CodecClient<'a, C> {
    client: &'a Client,
    codec: C,
}

impl<'a, C: Codec> CodecClient<'a, C> {
    pub(crate) fn new(client: &'a Client, codec: C) -> Self {
        Self { client, codec }
    }

    /// GET and decode the response.
    pub async fn get<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        service_name: &str,
        path: &str,
        headers: HeaderMap,
    ) -> Result<T> {
        self.request(ctx, service_name, Method::GET, path, None::<&()>, headers)
            .await
    }

    /// POST an encoded body and decode the response.
    pub async fn post<B, T>(
        &self,
        ctx: &Context,
        service_name: &str,
        path: &str,
        body: &B,
        headers: HeaderMap,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, service_name, Method::POST, path, Some(body), headers)
            .await
    }

    /// PUT an encoded body and decode the response.
    pub async fn put<B, T>(
        &self,
        ctx: &Context,
        service_name: &str,
        path: &str,
        body: &B,
        headers: HeaderMap,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(ctx, service_name, Method::PUT, path, Some(body), headers)
            .await
    }

    /// DELETE, checking only the status.
    pub async fn delete(
        &self,
        ctx: &Context,
        service_name: &str,
        path: &str,
        headers: HeaderMap,
    ) -> Result<()> {
        self.send(ctx, service_name, Method::DELETE, path, None::<&()>, headers)
            .await
    }

    /// Send any method and decode the response into `T`.
    pub async fn request<B, T>(
        &self,
        ctx: &Context,
        service_name: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .exchange(ctx, service_name, method, path, body, headers)
            .await?;
        self.codec.decode(&body)
    }

    /// Send any method without decoding the response. The body is still read
    /// to the end.
    pub async fn send<B>(
        &self,
        ctx: &Context,
        service_name: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        self.exchange(ctx, service_name, method, path, body, headers)
            .await
            .map(drop)
    }

    async fn exchange<B>(
        &self,
        ctx: &Context,
        service_name: &str,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: HeaderMap,
    ) -> Result<Bytes>
    where
        B: Serialize + ?Sized,
    {
        // encoding failures never reach the network
        let body = body.map(|b| self.codec.encode(b)).transpose()?;
        let headers = self.negotiate(headers);

        let response = self
            .client
            .execute(ctx, service_name, method, path, body, headers)
            .await?;
        let response = ctx.run(response.error_for_status()).await??;
        ctx.run(response.bytes()).await?
    }

    fn negotiate(&self, mut headers: HeaderMap) -> HeaderMap {
        let media_type = HeaderValue::from_static(self.codec.media_type());
        headers.entry(ACCEPT).or_insert_with(|| media_type.clone());
        headers.entry(CONTENT_TYPE).or_insert(media_type);
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Json;
    use meridian_discovery::InMemoryDirectory;

    fn client() -> Client {
        Client::with_directory(InMemoryDirectory::new()).unwrap()
    }

    #[test]
    fn test_negotiate_defaults() {
        let client = client();
        let headers = client.xml().negotiate(HeaderMap::new());
        assert_eq!(headers[ACCEPT], "application/xml");
        assert_eq!(headers[CONTENT_TYPE], "application/xml");
    }

    #[test]
    fn test_negotiate_keeps_caller_headers() {
        let client = client();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.append(ACCEPT, HeaderValue::from_static("text/plain"));
        headers.append(ACCEPT, HeaderValue::from_static("application/xml"));

        let headers = client.xml().negotiate(headers);
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers.get_all(ACCEPT).iter().count(), 2);
    }

    #[tokio::test]
    async fn test_encode_failure_skips_network() {
        let client = client();
        let mut bad = std::collections::BTreeMap::new();
        bad.insert(vec![0u8], "value");

        // "nowhere" is unknown to the directory, so resolution would fail
        let err = client
            .json()
            .send(
                &Context::background(),
                "nowhere",
                Method::POST,
                "/",
                Some(&bad),
                HeaderMap::new(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::ClientError::Encode { .. }));
        assert!(client.rotation().is_empty());
    }

    #[test]
    fn test_custom_codec_view() {
        let client = client();
        let view = client.codec(Json);
        assert_eq!(view.codec.media_type(), "application/json");
    }
}
