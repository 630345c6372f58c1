use crate::config::SourceConfig;
use crate::error::{AppError, AppResult};
use crate::external::CandidateSource;
use crate::models::Candidate;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct RandomUser {
    pub id: i64,
    pub email: String,
    pub address: Address,
}

#[derive(Debug, Deserialize)]
pub struct Address {
    pub state: String,
}

impl From<RandomUser> for Candidate {
    fn from(u: RandomUser) -> Self {
        Candidate {
            id: u.id,
            email: u.email,
            state: u.address.state,
        }
    }
}

/// size=1 时接口返回单个对象而不是数组
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UsersPayload {
    Many(Vec<RandomUser>),
    One(RandomUser),
}

#[derive(Clone)]
pub struct RandomDataApi {
    client: Client,
    config: SourceConfig,
}

impl RandomDataApi {
    pub fn new(config: SourceConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn users_url(&self) -> String {
        format!(
            "{}/api/users/random_user",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl CandidateSource for RandomDataApi {
    async fn fetch_batch(&self, size: usize) -> AppResult<Vec<Candidate>> {
        let url = self.users_url();

        let response = self
            .client
            .get(&url)
            .query(&[("size", size)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            log::error!("Random user request failed: {status}, Error: {error_text}");
            return Err(AppError::SourceUnavailable(format!(
                "{url} returned {status}: {error_text}"
            )));
        }

        let body = response.text().await?;
        parse_batch(&body, size)
    }
}

/// 解析响应体并校验批次长度
pub fn parse_batch(body: &str, size: usize) -> AppResult<Vec<Candidate>> {
    let users = match serde_json::from_str::<UsersPayload>(body)? {
        UsersPayload::Many(users) => users,
        UsersPayload::One(user) => vec![user],
    };

    if users.len() != size {
        return Err(AppError::SourceUnavailable(format!(
            "expected {size} users, got {}",
            users.len()
        )));
    }

    Ok(users.into_iter().map(Candidate::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// 单次响应的本地 HTTP 服务；返回 base_url 和收到的请求行
    async fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).await.unwrap();
            stream.shutdown().await.unwrap();
            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });
        (format!("http://{addr}"), handle)
    }

    fn api(base_url: String) -> RandomDataApi {
        RandomDataApi::new(SourceConfig {
            base_url,
            timeout_secs: 5,
            ..SourceConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_batch_sends_size_query() {
        let body = r#"[
            {"id": 1, "email": "a@a.com", "address": {"state": "CA"}},
            {"id": 2, "email": "b@b.com", "address": {"state": "TX"}}
        ]"#;
        let (base_url, server) = serve_once("200 OK", body).await;

        let batch = api(base_url).fetch_batch(2).await.unwrap();

        assert_eq!(
            batch,
            vec![
                Candidate::new(1, "a@a.com", "CA"),
                Candidate::new(2, "b@b.com", "TX"),
            ]
        );
        assert_eq!(
            server.await.unwrap(),
            "GET /api/users/random_user?size=2 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_fetch_batch_error_status_is_source_unavailable() {
        let (base_url, server) = serve_once("503 Service Unavailable", "down").await;

        let err = api(base_url).fetch_batch(5).await.unwrap_err();

        assert!(err.is_source_unavailable());
        assert!(err.to_string().contains("503"));
        assert!(server.await.unwrap().contains("size=5"));
    }

    #[tokio::test]
    async fn test_fetch_batch_short_body_is_source_unavailable() {
        let body = r#"[{"id": 1, "email": "a@a.com", "address": {"state": "CA"}}]"#;
        let (base_url, server) = serve_once("200 OK", body).await;

        let err = api(base_url).fetch_batch(5).await.unwrap_err();

        assert!(err.is_source_unavailable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_fetch_batch_connection_refused_is_source_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = api(format!("http://{addr}")).fetch_batch(5).await.unwrap_err();

        assert!(err.is_source_unavailable());
    }

    #[test]
    fn test_parse_batch_array() {
        let body = r#"[
            {"id": 1, "email": "a@a.com", "address": {"state": "CA", "city": "LA"}, "uid": "x"},
            {"id": 2, "email": "b@b.com", "address": {"state": "Texas"}}
        ]"#;
        let batch = parse_batch(body, 2).unwrap();
        assert_eq!(
            batch,
            vec![
                Candidate::new(1, "a@a.com", "CA"),
                Candidate::new(2, "b@b.com", "Texas"),
            ]
        );
    }

    #[test]
    fn test_parse_batch_single_object() {
        let body = r#"{"id": 7, "email": "g@g.com", "address": {"state": "Ohio"}}"#;
        let batch = parse_batch(body, 1).unwrap();
        assert_eq!(batch, vec![Candidate::new(7, "g@g.com", "Ohio")]);
    }

    #[test]
    fn test_parse_batch_wrong_length() {
        let body = r#"[{"id": 1, "email": "a@a.com", "address": {"state": "CA"}}]"#;
        let err = parse_batch(body, 5).unwrap_err();
        assert!(err.is_source_unavailable());
    }

    #[test]
    fn test_parse_batch_malformed() {
        assert!(parse_batch("<html>503</html>", 5)
            .unwrap_err()
            .is_source_unavailable());
        // 缺少 address
        assert!(parse_batch(r#"[{"id": 1, "email": "a@a.com"}]"#, 1)
            .unwrap_err()
            .is_source_unavailable());
    }

    #[test]
    fn test_users_url_trims_trailing_slash() {
        let api = RandomDataApi::new(SourceConfig {
            base_url: "https://random-data-api.com/".to_string(),
            ..SourceConfig::default()
        })
        .unwrap();
        assert_eq!(
            api.users_url(),
            "https://random-data-api.com/api/users/random_user"
        );
    }
}
