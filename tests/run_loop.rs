//! End-to-end: host events flow through the delegator into the driven
//! pager loop, and both halves edit the same shared document.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::timeout;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use scrollvisor::{
    Config, Delegator, Document, Event, EventKind, Fetch, FetchError, Pager, Rect, Selector,
    UiEvent, Viewport,
};

const LIST: &str = r#"<table><tbody id="feed">
    <tr id="r1"><td class="title">one</td></tr>
    <tr class="next_page_list" data-link="/items?page=2"><td>loading</td></tr>
</tbody></table>"#;

const FRAGMENT: &str = r#"<tbody class="loading_tbody"><tr id="r2"><td>two</td></tr></tbody>"#;

/// Serves one canned fragment regardless of path.
struct Canned(&'static str);

#[async_trait]
impl Fetch for Canned {
    async fn get_fragment(&self, _path: &str) -> Result<String, FetchError> {
        Ok(self.0.to_string())
    }
}

async fn feed_pager() -> (Arc<RwLock<Document>>, Arc<Pager>, scrollvisor::NodeId) {
    let doc = Arc::new(RwLock::new(Document::parse(LIST).unwrap()));
    let container = {
        let mut d = doc.write().await;
        let container = d
            .query_first(d.root(), &Selector::parse("#feed").unwrap())
            .unwrap();
        let sentinel = d
            .query_first(d.root(), &Selector::parse(".next_page_list").unwrap())
            .unwrap();
        d.set_rect(sentinel, Rect::new(900.0, 40.0));
        container
    };
    let pager = Pager::new(
        Config::default(),
        Arc::clone(&doc),
        Arc::new(Canned(FRAGMENT)),
        Vec::new(),
    );
    pager.watch(container).await.unwrap();
    (doc, pager, container)
}

async fn wait_for(rx: &mut tokio::sync::broadcast::Receiver<Event>, kind: EventKind) -> Event {
    loop {
        let ev = timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("bus closed");
        if ev.kind == kind {
            return ev;
        }
    }
}

#[tokio::test]
async fn test_scroll_event_drives_page_load() {
    let (doc, pager, container) = feed_pager().await;
    let mut rx = pager.bus().subscribe();

    let delegator = Delegator::new();
    let _scroll = pager.attach(&delegator);

    let token = CancellationToken::new();
    let worker = pager.run(token.clone());

    // The host reports a scroll; the delegator fans it into the signal queue.
    {
        let mut d = doc.write().await;
        delegator.dispatch(&mut d, &UiEvent::scroll(Viewport::new(500.0, 600.0)));
    }

    let merged = wait_for(&mut rx, EventKind::PageMerged).await;
    assert_eq!(merged.container, Some(container));
    assert_eq!(merged.appended, Some(1));

    let d = doc.read().await;
    assert!(d.query_first(container, &Selector::parse("#r2").unwrap()).is_some());
    drop(d);

    token.cancel();
    let finished = timeout(Duration::from_secs(1), worker).await.unwrap();
    assert_ok!(assert_ok!(finished));
}

#[tokio::test]
async fn test_signals_queued_before_run_are_consumed() {
    let (_doc, pager, _container) = feed_pager().await;
    let mut rx = pager.bus().subscribe();

    // Queue the signal first; the loop picks it up once started.
    pager.handle().signal(Viewport::new(500.0, 600.0)).await.unwrap();

    let token = CancellationToken::new();
    let worker = pager.run(token.clone());

    wait_for(&mut rx, EventKind::PagerDrained).await;

    token.cancel();
    let finished = timeout(Duration::from_secs(1), worker).await.unwrap();
    assert_ok!(assert_ok!(finished));
}

#[tokio::test]
async fn test_click_delegation_and_pager_share_the_document() {
    let (doc, pager, container) = feed_pager().await;
    let mut rx = pager.bus().subscribe();

    let delegator = Delegator::new();
    let _scroll = pager.attach(&delegator);
    let _click = {
        let d = doc.read().await;
        delegator
            .on(&d, "#feed", "click", "tr", |doc, row, _ev| {
                // Delegated handlers bind the matched row, not the inner target.
                doc.add_class(row, "selected").ok();
            })
            .unwrap()
    };

    let token = CancellationToken::new();
    let worker = pager.run(token.clone());

    // A click lands on the cell inside the first row.
    let cell = {
        let d = doc.read().await;
        d.query_first(container, &Selector::parse(".title").unwrap())
            .unwrap()
    };
    {
        let mut d = doc.write().await;
        delegator.dispatch(&mut d, &UiEvent::click(cell));
    }

    // Then a scroll pulls in the next page.
    {
        let mut d = doc.write().await;
        delegator.dispatch(&mut d, &UiEvent::scroll(Viewport::new(500.0, 600.0)));
    }
    wait_for(&mut rx, EventKind::PageMerged).await;

    let d = doc.read().await;
    let first_row = d
        .query_first(container, &Selector::parse("#r1").unwrap())
        .unwrap();
    assert!(d.has_class(first_row, "selected"));
    assert!(d.query_first(container, &Selector::parse("#r2").unwrap()).is_some());
    drop(d);

    token.cancel();
    let finished = timeout(Duration::from_secs(1), worker).await.unwrap();
    assert_ok!(assert_ok!(finished));
}
