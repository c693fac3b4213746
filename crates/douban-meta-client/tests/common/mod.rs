//! In-memory transport and page fixtures shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use douban_meta_client::{
    ClientConfig, ClientError, DoubanClient, Endpoints, Method, Result, TitleResolver, Transport,
    TransportRequest, TransportResponse,
};
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct Call {
    pub method: Method,
    pub url: String,
    pub at: Instant,
}

#[derive(Debug, Clone)]
enum Page {
    Body { status: u16, body: String },
    Redirect { final_url: String },
    Unreachable,
}

/// Serves registered pages and records every request. Unknown URLs get a
/// 404.
#[derive(Default)]
pub struct MockTransport {
    pages: Mutex<HashMap<String, Page>>,
    calls: Mutex<Vec<Call>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn page(&self, url: impl Into<String>, body: impl Into<String>) {
        self.status(url, 200, body);
    }

    pub fn status(&self, url: impl Into<String>, status: u16, body: impl Into<String>) {
        self.pages.lock().unwrap().insert(
            url.into(),
            Page::Body {
                status,
                body: body.into(),
            },
        );
    }

    pub fn redirect(&self, url: impl Into<String>, final_url: impl Into<String>) {
        self.pages.lock().unwrap().insert(
            url.into(),
            Page::Redirect {
                final_url: final_url.into(),
            },
        );
    }

    pub fn unreachable(&self, url: impl Into<String>) {
        self.pages.lock().unwrap().insert(url.into(), Page::Unreachable);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.url).collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        self.calls.lock().unwrap().push(Call {
            method: request.method,
            url: request.url.clone(),
            at: Instant::now(),
        });

        let page = self.pages.lock().unwrap().get(&request.url).cloned();
        match page {
            Some(Page::Body { status, body }) => Ok(TransportResponse {
                status,
                final_url: request.url,
                body: if request.method == Method::Head { String::new() } else { body },
            }),
            Some(Page::Redirect { final_url }) => Ok(TransportResponse {
                status: 200,
                final_url,
                body: String::new(),
            }),
            Some(Page::Unreachable) => Err(ClientError::Transport("connection refused".to_string())),
            None => Ok(TransportResponse {
                status: 404,
                final_url: request.url,
                body: String::new(),
            }),
        }
    }
}

pub fn endpoints() -> Endpoints {
    Endpoints::default()
}

pub fn resolver(config: ClientConfig, transport: &Arc<MockTransport>) -> TitleResolver {
    let client = DoubanClient::with_transport(config, transport.clone()).unwrap();
    TitleResolver::new(Arc::new(client)).unwrap()
}

pub fn search_entry(sid: &str, tag: &str, name: &str, cast: &str) -> String {
    format!(
        r##"<div class="result">
  <div class="pic"><a class="nbg" href="#"><img src="https://img1.doubanio.com/view/photo/s_ratio_poster/public/p{sid}.webp"></a></div>
  <div class="content"><div class="title"><h3><span>[{tag}]</span>&nbsp;<a href="#" onclick="moreurl(this,{{i: '0', query: '', from: 'dou_search_movie', sid: {sid}, qcat: '1002'}})">{name}</a></h3>
    <div class="rating-info"><span class="rating_nums">8.0</span><span class="subject-cast">{cast}</span></div>
  </div></div>
</div>"##
    )
}

pub fn search_page(entries: &[String]) -> String {
    format!(
        r#"<html><body><div class="search-result"><div class="result-list">{}</div></div></body></html>"#,
        entries.concat()
    )
}

/// Detail page. A non-empty `episodes` marks the subject as a series.
pub fn subject_page(name: &str, year: u16, episodes: Option<u32>) -> String {
    let episodes = episodes
        .map(|n| format!(r#"<span class="pl">集数:</span> {n}<br/>"#))
        .unwrap_or_default();
    format!(
        r##"<html><head><title>{name} (豆瓣)</title></head><body>
<div id="content">
  <h1><span property="v:itemreviewed">{name}</span> <span class="year">({year})</span></h1>
  <div id="mainpic"><a class="nbg" href="#"><img src="https://img9.doubanio.com/view/photo/s_ratio_poster/public/p2886492021.webp"></a></div>
  <div id="info">
    <span class="pl">类型:</span> <span property="v:genre">剧情</span><br/>
    {episodes}
  </div>
</div></body></html>"##
    )
}

pub const PERSONAGE_PAGE: &str = r#"<html><body><div id="content">
<h1>张鲁一 Luyi Zhang</h1>
<div id="headline" class="item">
  <div class="pic"><a class="nbg" title="张鲁一"><img src="https://img3.doubanio.com/view/celebrity/raw/public/p1359870466.jpg" alt="张鲁一"/></a></div>
  <div class="info"><ul>
    <li><span>性别</span>:
        男</li>
    <li><span>出生日期</span>:
        1977-03-18</li>
  </ul></div>
</div>
</div></body></html>"#;
