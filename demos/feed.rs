//! # Example: feed
//!
//! Demonstrates the full pagination pipeline against a local mock backend.
//!
//! Shows how to:
//! - Wire [`Pager`] + [`HttpFetcher`] + [`LogWriter`].
//! - Drive the loop with scroll events through a [`Delegator`].
//! - Watch the container grow page by page until the feed drains.
//!
//! ## Flow
//! ```text
//! UiEvent::scroll ──► Delegator ──► PagerHandle.try_signal()
//!     └─► Pager::run() ──► on_scroll ──► step(container, viewport)
//!           ├─► GET /items?page=N  (X-Requested-With: XMLHttpRequest)
//!           ├─► splice `.loading_tbody` children after the sentinel
//!           └─► publish events ──► LogWriter
//! ```
//!
//! ## Run
//! Requires the `http` and `logging` features.
//! ```bash
//! cargo run --example feed --features "http logging"
//! ```

use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use scrollvisor::{
    Config, Delegator, Document, HttpFetcher, LogWriter, Pager, Rect, Selector, Subscribe,
    UiEvent, Viewport,
};

const SEED: &str = r#"<table><tbody id="feed">
    <tr><td>item 1</td></tr>
    <tr><td>item 2</td></tr>
    <tr class="next_page_list" data-link="/items?page=2"><td>loading...</td></tr>
</tbody></table>"#;

/// Stands in for the list backend: two more pages, then no sentinel.
fn mock_backend() -> MockServer {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path("/items")
            .query_param("page", "2")
            .header("x-requested-with", "XMLHttpRequest");
        then.status(200).body(
            r#"<tbody class="loading_tbody">
                 <tr><td>item 3</td></tr>
                 <tr><td>item 4</td></tr>
                 <tr class="next_page_list" data-link="/items?page=3"><td>loading...</td></tr>
               </tbody>"#,
        );
    });
    server.mock(|when, then| {
        when.method(GET).path("/items").query_param("page", "3");
        then.status(200).body(
            r#"<tbody class="loading_tbody">
                 <tr><td>item 5</td></tr>
               </tbody>"#,
        );
    });
    server
}

/// Assigns a layout rect to the current sentinel, `row_height` per row deep.
async fn lay_out_sentinel(doc: &Arc<RwLock<Document>>, row_height: f64) {
    let mut d = doc.write().await;
    if let Some(node) = d.query_first(d.root(), &Selector::parse(".next_page_list").unwrap()) {
        let container = d.parent(node).unwrap();
        let rows = d
            .children(container)
            .iter()
            .filter(|row| d.is_element(**row))
            .count() as f64;
        d.set_rect(node, Rect::new(rows * row_height, row_height));
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let server = mock_backend();
    let doc = Arc::new(RwLock::new(Document::parse(SEED)?));

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::default())];
    let fetcher = Arc::new(HttpFetcher::new(&server.base_url())?);
    let pager = Pager::new(Config::default(), Arc::clone(&doc), fetcher, subs);

    let container = {
        let d = doc.read().await;
        d.query_first(d.root(), &Selector::parse("#feed")?)
            .ok_or("missing feed container")?
    };
    pager.watch(container).await?;
    lay_out_sentinel(&doc, 100.0).await;

    let delegator = Delegator::new();
    let _scroll = pager.attach(&delegator);

    let token = CancellationToken::new();
    let worker = pager.run(token.clone());

    // Simulate the user scrolling down in bursts until the feed drains.
    for scroll_top in (0..=400).step_by(100) {
        {
            let mut d = doc.write().await;
            let ev = UiEvent::scroll(Viewport::new(scroll_top as f64, 240.0));
            delegator.dispatch(&mut d, &ev);
        }
        // Give in-flight loads a moment, then lay out whatever arrived.
        tokio::time::sleep(Duration::from_millis(50)).await;
        lay_out_sentinel(&doc, 100.0).await;
    }

    token.cancel();
    worker.await??;

    println!("\nfinal feed:\n{}", doc.read().await.html());
    Ok(())
}
