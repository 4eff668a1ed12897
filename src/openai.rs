use futures_util::StreamExt;

pub mod chat;

pub struct Client {
    client: reqwest::Client,
    base_url: String,
}

#[derive(serde::Serialize)]
struct WrappedRequest<'a, T> {
    stream: bool,

    #[serde(flatten)]
    req: &'a T,
}

#[derive(serde::Deserialize, Clone, Debug)]
struct StreamErrorBody {
    message: String,
}

#[derive(serde::Deserialize, Clone, Debug)]
struct StreamError {
    error: StreamErrorBody,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("request: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("request: {0} ({1})")]
    ReqwestWithBody(reqwest::Error, String),

    #[error("header: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("serde: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("stream: {0}")]
    Stream(String),

    #[error("malformed stream item: {}", String::from_utf8_lossy(.0))]
    MalformedStreamItem(Vec<u8>),
}

/// Splits a server-sent event body into the payloads of its `data: ` frames.
fn into_sse_stream(mut resp: reqwest::Response) -> impl futures_core::stream::Stream<Item = Result<Vec<u8>, Error>> {
    let mut buf = bytes::BytesMut::new();

    async_stream::try_stream! {
        while let Some(c) = resp.chunk().await.map_err(|e| e.without_url())? {
            buf.extend_from_slice(&c);

            while let Some(i) = buf.windows(2).position(|x| x == b"\n\n") {
                let payload = buf.split_to(i + 2);
                let payload = &payload[..payload.len() - 2];

                if !payload.starts_with(b"data: ") {
                    Err(Error::MalformedStreamItem(payload.to_vec()))?;
                }

                yield payload[6..].to_vec();
            }
        }
    }
}

impl Client {
    pub fn new(api_key: impl AsRef<str>, base_url: impl Into<String>) -> Result<Self, Error> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(reqwest::header::CONTENT_TYPE, reqwest::header::HeaderValue::from_static("application/json"));
        headers.insert(reqwest::header::AUTHORIZATION, format!("Bearer {}", api_key.as_ref()).parse::<reqwest::header::HeaderValue>()?);
        Ok(Self {
            client: reqwest::ClientBuilder::new().default_headers(headers).build()?,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    pub async fn do_streaming_request<Req, Chunk>(
        &self,
        path: &str,
        req: &Req,
    ) -> Result<impl futures_core::stream::Stream<Item = Result<Chunk, Error>>, Error>
    where
        Req: serde::Serialize,
        Chunk: serde::de::DeserializeOwned,
    {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .json(&WrappedRequest { stream: true, req })
            .send()
            .await
            .map_err(|e| e.without_url())?;

        if let Err(e) = resp.error_for_status_ref() {
            let body = resp.text().await.map_err(|e| e.without_url())?;
            return Err(Error::ReqwestWithBody(e.without_url(), body));
        }

        Ok(async_stream::try_stream! {
            let mut stream = Box::pin(into_sse_stream(resp));

            while let Some(payload) = stream.next().await {
                let payload = payload?;

                if payload == b"[DONE]" {
                    break;
                }

                if let Ok(stream_error) = serde_json::from_slice::<StreamError>(&payload) {
                    Err(Error::Stream(stream_error.error.message))?;
                }

                yield serde_json::from_slice::<Chunk>(&payload)?;
            }
        })
    }

    pub async fn create_chat_completion(
        &self,
        req: &chat::CreateRequest,
    ) -> Result<impl futures_core::stream::Stream<Item = Result<chat::Chunk, Error>>, Error> {
        self.do_streaming_request("/v1/chat/completions", req).await
    }
}
