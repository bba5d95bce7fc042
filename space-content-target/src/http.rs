use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use http_body_util::{BodyExt as _, Full};
use hyper::header::HOST;
use hyper::http::uri::PathAndQuery;
use hyper::http::HeaderValue;
use hyper::{Request, Response, Uri};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tokio_rustls::TlsConnector;
use tracing::{debug, trace};

use crate::error::HttpError;

static TLS_CONNECTOR: OnceLock<TlsConnector> = OnceLock::new();

fn tls_connector() -> &'static TlsConnector {
    TLS_CONNECTOR.get_or_init(|| {
        let mut root_cert_store = RootCertStore::empty();
        root_cert_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let config = ClientConfig::builder()
            .with_root_certificates(root_cert_store)
            .with_no_client_auth();
        TlsConnector::from(Arc::new(config))
    })
}

/// Sends one request over a fresh HTTP/1.1 connection and buffers the response body.
///
/// `request` must carry an absolute `http` or `https` uri.
pub async fn send(request: Request<Bytes>) -> Result<Response<Bytes>, HttpError> {
    let (mut parts, body) = request.into_parts();
    let url = parts.uri.clone();

    let https = match url.scheme_str() {
        Some("https") => true,
        Some("http") => false,
        _ => return Err(HttpError::UnsupportedUrl(url.to_string())),
    };
    let host = url
        .host()
        .ok_or_else(|| HttpError::UnsupportedUrl(url.to_string()))?
        .to_owned();
    let port = url.port_u16().unwrap_or(if https { 443 } else { 80 });
    let authority = url
        .authority()
        .ok_or_else(|| HttpError::UnsupportedUrl(url.to_string()))?;

    parts
        .headers
        .insert(HOST, HeaderValue::from_str(authority.as_str())?);
    parts.uri = url
        .path_and_query()
        .map_or("/", PathAndQuery::as_str)
        .parse::<Uri>()?;
    let request = Request::from_parts(parts, Full::new(body));

    trace!("{} {url}", request.method());

    let stream = TcpStream::connect((host.as_str(), port)).await?;
    if https {
        let dnsname = ServerName::try_from(host.clone())
            .map_err(|_| HttpError::InvalidDnsName(host.clone()))?;
        let stream = tls_connector().connect(dnsname, stream).await?;
        exchange(TokioIo::new(stream), request).await
    } else {
        exchange(TokioIo::new(stream), request).await
    }
}

async fn exchange<I>(io: I, request: Request<Full<Bytes>>) -> Result<Response<Bytes>, HttpError>
where
    I: hyper::rt::Read + hyper::rt::Write + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;
    tokio::task::spawn(async move {
        if let Err(err) = conn.await {
            debug!("upstream connection closed with error: {err}");
        }
    });

    let response = sender.send_request(request).await?;
    let (parts, body) = response.into_parts();
    let body = body.collect().await?.to_bytes();

    trace!("upstream responded {}", parts.status);

    Ok(Response::from_parts(parts, body))
}

/// Adapter so the oauth2 token exchange runs over the same transport.
pub async fn oauth2_http_client(
    request: oauth2::HttpRequest,
) -> Result<oauth2::HttpResponse, HttpError> {
    let mut builder = Request::builder()
        .method(request.method.as_str())
        .uri(request.url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_bytes());
    }
    let response = send(builder.body(Bytes::from(request.body))?).await?;

    let status_code = oauth2::http::StatusCode::from_u16(response.status().as_u16())
        .map_err(|err| HttpError::Oauth2Conversion(err.to_string()))?;
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            Some((
                oauth2::http::HeaderName::from_bytes(name.as_str().as_bytes()).ok()?,
                oauth2::http::HeaderValue::from_bytes(value.as_bytes()).ok()?,
            ))
        })
        .collect();

    Ok(oauth2::HttpResponse {
        status_code,
        headers,
        body: response.into_body().to_vec(),
    })
}
