use anyhow::Context;
use log::{info, warn};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinHandle;
use warp::{http::StatusCode, Filter, Rejection, Reply};

const DEFAULT_FEED_NAME: &str = "absensi.json";

/// Serves a local feed file over HTTP so the monitor and board can be tried
/// without the production host. The file is re-read on every request and the
/// cache-busting query string is ignored.
pub struct FeedServer {
    feed_file: PathBuf,
    feed_name: String,
}

impl FeedServer {
    pub fn new(feed_file: PathBuf) -> Self {
        let feed_name = feed_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_FEED_NAME.to_string());
        Self {
            feed_file,
            feed_name,
        }
    }

    pub fn feed_url(&self, addr: SocketAddr) -> String {
        format!("http://{}/{}", addr, self.feed_name)
    }

    pub fn routes(&self) -> impl Filter<Extract = (Box<dyn Reply>,), Error = Rejection> + Clone {
        let feed_file = Arc::new(self.feed_file.clone());
        let feed_name = Arc::new(self.feed_name.clone());

        warp::get()
            .and(warp::path::param::<String>())
            .and(warp::path::end())
            .and_then(move |requested: String| {
                let feed_file = Arc::clone(&feed_file);
                let feed_name = Arc::clone(&feed_name);
                async move {
                    Ok::<Box<dyn Reply>, Rejection>(
                        serve_feed(&feed_file, &feed_name, &requested).await,
                    )
                }
            })
    }

    /// Binds `bind` (port 0 picks a free port) and runs the server on the current runtime.
    pub fn spawn(&self, bind: SocketAddr) -> anyhow::Result<(SocketAddr, JoinHandle<()>)> {
        let (addr, server) = warp::serve(self.routes())
            .try_bind_ephemeral(bind)
            .with_context(|| format!("binding feed server on {}", bind))?;
        info!("serving {} at {}", self.feed_file.display(), self.feed_url(addr));
        Ok((addr, tokio::spawn(server)))
    }
}

async fn serve_feed(feed_file: &Path, feed_name: &str, requested: &str) -> Box<dyn Reply> {
    if requested != feed_name {
        return Box::new(warp::reply::with_status("not found", StatusCode::NOT_FOUND));
    }
    match tokio::fs::read_to_string(feed_file).await {
        Ok(body) => Box::new(warp::reply::with_header(
            body,
            "content-type",
            "application/json",
        )),
        Err(err) => {
            warn!("feed file {} unreadable: {}", feed_file.display(), err);
            Box::new(warp::reply::with_status(
                "feed unavailable",
                StatusCode::SERVICE_UNAVAILABLE,
            ))
        }
    }
}
