use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

pub const JOURNEY_PATH: &str = "/docs/learning-journeys/linux/";

const INDEX_JSON: &str = r#"[
  {"permalink": "/docs/learning-journeys/linux/", "params": {"title": "Monitor a Linux server"}},
  {"permalink": "/docs/learning-journeys/linux/explore/", "params": {
    "title": "Explore your metrics", "menutitle": "Explore", "step": "3",
    "cta": {"type": "conclusion", "image": {"src": "/media/linux/done.png", "width": 640, "height": 360}},
    "side_journeys": {"heading": "More to explore", "items": [
      {"link": "/docs/grafana/latest/dashboards/", "title": "Dashboards"},
      {"link": "https://community.example/forum/", "title": "Forum"}
    ]}
  }},
  {"permalink": "/docs/learning-journeys/linux/configure/", "params": {"title": "Configure Alloy", "step": 2, "duration": "5 min"}},
  {"permalink": "/docs/learning-journeys/linux/install-agent/", "params": {"title": "Install the agent", "step": 1}}
]"#;

const COVER: &str = r#"<!doctype html>
<html>
  <head><title>Linux</title><style>body { color: red }</style></head>
  <body>
    <h1>Monitor a Linux server</h1>
    <p>Collect metrics from a Linux host and chart them in a dashboard.</p>
    <p>You need shell access to the host and a running Grafana instance.</p>
    <img class="lazyload" data-src="/media/linux/cover.png" alt="Overview">
  </body>
</html>
"#;

const INSTALL: &str = r#"<!doctype html>
<html>
  <body>
    <h1>Install the agent</h1>
    <p>Run <code>sudo apt-get install alloy</code> on the host.</p>
    <p>See <a href="/docs/alloy/latest/">the Alloy docs</a> or <a href="https://github.com/grafana/alloy">the source</a>.</p>
    <table><tr><th>Package</th></tr><tr><td>alloy</td></tr></table>
  </body>
</html>
"#;

const CONFIGURE: &str = r#"<!doctype html>
<html>
  <body>
    <h2>Configure Alloy</h2>
    <div class="collapse"><div class="collapse-trigger">Show the config</div><div class="collapse-content"><pre><code class="language-alloy">prometheus.exporter.unix "host" {}</code></pre></div></div>
  </body>
</html>
"#;

const EXPLORE: &str = r##"<!doctype html>
<html>
  <body>
    <h2>Explore your metrics</h2>
    <p><a href="#panels">Jump to panels</a></p>
  </body>
</html>
"##;

/// Delay for slow responses; longer than the one-second request timeout.
#[allow(dead_code)]
pub const SLOW_RESPONSE: Duration = Duration::from_secs(2);

const RECOVERED: &str = "<h1>Recovered</h1><p>Served by the slash-less variant.</p>";

/// In-process documentation host serving one journey.
///
/// The install step is only reachable without the trailing slash, so the
/// fetcher has to fall back past the primary candidate to find it. The
/// `slow-step` primary answers after [`SLOW_RESPONSE`] while its slash-less
/// variant answers at once, and every path under `/stalled/` is slow.
pub struct DocsStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<Request>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Request {
    pub path: String,
    pub authorization: Option<String>,
}

#[allow(dead_code)]
impl DocsStub {
    pub fn spawn() -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start docs stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let path = url.split('?').next().unwrap_or(&url).to_owned();
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.to_string());
                seen.lock().unwrap().push(Request {
                    path: path.clone(),
                    authorization,
                });

                let (status, body, content_type) = match path.as_str() {
                    "/docs/learning-journeys/linux/index.json" => {
                        (200, INDEX_JSON, "application/json")
                    }
                    "/docs/learning-journeys/linux/unstyled.html" => (200, COVER, "text/html"),
                    "/docs/learning-journeys/linux/install-agent" => (200, INSTALL, "text/html"),
                    "/docs/learning-journeys/linux/configure/unstyled.html" => {
                        (200, CONFIGURE, "text/html")
                    }
                    "/docs/learning-journeys/linux/explore/unstyled.html" => {
                        (200, EXPLORE, "text/html")
                    }
                    "/docs/learning-journeys/empty/unstyled.html" => (200, "   \n", "text/html"),
                    "/docs/learning-journeys/linux/slow-step" => (200, RECOVERED, "text/html"),
                    "/docs/learning-journeys/linux/slow-step/unstyled.html" => {
                        (200, EXPLORE, "text/html")
                    }
                    _ => (404, "not found", "text/plain"),
                };

                let header = tiny_http::Header::from_bytes("Content-Type", content_type)
                    .expect("content-type header");
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);

                let slow = path == "/docs/learning-journeys/linux/slow-step/unstyled.html"
                    || path.starts_with("/stalled/");
                if slow {
                    thread::spawn(move || {
                        thread::sleep(SLOW_RESPONSE);
                        let _ = request.respond(response);
                    });
                } else {
                    let _ = request.respond(response);
                }
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn journey_url(&self, rest: &str) -> String {
        self.url(&format!("{JOURNEY_PATH}{rest}"))
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

impl Drop for DocsStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
