//! 行情接口客户端
//!
//! 对接 Finnhub 风格的报价接口: GET <url>?symbol=<symbol>&token=<token>

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::models::QuoteRecord;

/// 行情数据服务
pub struct QuoteClient {
    client: Client,
    url: String,
    token: String,
}

impl QuoteClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .gzip(true)
            .build()
            .context("创建 HTTP 客户端失败")?;

        Ok(Self {
            client,
            url: config.url.clone(),
            token: config.token.clone(),
        })
    }

    /// 获取单只股票的实时报价
    ///
    /// 网络错误、非 2xx 状态、响应解析失败都会返回错误
    pub async fn fetch_quote(&self, symbol: &str) -> Result<QuoteRecord> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("symbol", symbol), ("token", self.token.as_str())])
            .send()
            .await
            // URL 中带有 token，不写入日志
            .map_err(|e| anyhow!("请求行情接口失败: {}", e.without_url()))?;

        if !response.status().is_success() {
            return Err(anyhow!("获取行情数据失败: {}", response.status()));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| anyhow!("解析行情数据失败: {}", e.without_url()))?;

        QuoteRecord::from_value(value).context("解析行情数据失败")
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! 测试用的模拟行情接口

    use actix_web::dev::ServerHandle;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};

    /// 预设的响应：状态码 + 响应体
    pub type Scripted = (u16, String);

    #[derive(Default)]
    struct State {
        responses: Mutex<VecDeque<Scripted>>,
        requests: Mutex<Vec<HashMap<String, String>>>,
    }

    pub struct MockQuoteServer {
        pub url: String,
        handle: ServerHandle,
        state: Arc<State>,
    }

    async fn quote(
        state: web::Data<Arc<State>>,
        query: web::Query<HashMap<String, String>>,
    ) -> HttpResponse {
        state.requests.lock().unwrap().push(query.into_inner());
        let (status, body) = state
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((404, "no more responses".to_string()));

        HttpResponse::build(actix_web::http::StatusCode::from_u16(status).unwrap())
            .content_type("application/json")
            .body(body)
    }

    impl MockQuoteServer {
        /// 按顺序返回预设响应，耗尽后返回 404
        pub fn start<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = (u16, S)>,
            S: Into<String>,
        {
            let state = Arc::new(State {
                responses: Mutex::new(
                    responses
                        .into_iter()
                        .map(|(status, body)| (status, body.into()))
                        .collect(),
                ),
                requests: Mutex::new(Vec::new()),
            });

            let data = web::Data::new(state.clone());
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(data.clone())
                    .route("/api/v1/quote", web::get().to(quote))
            })
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();

            let addr = server.addrs()[0];
            let server = server.run();
            let handle = server.handle();
            actix_web::rt::spawn(server);

            Self {
                url: format!("http://{}/api/v1/quote", addr),
                handle,
                state,
            }
        }

        pub fn requests(&self) -> Vec<HashMap<String, String>> {
            self.state.requests.lock().unwrap().clone()
        }

        pub async fn stop(self) {
            self.handle.stop(true).await;
        }
    }
}
