//! Pager over a real HTTP transport.
//!
//! Drives the full path against a local mock server: armed sentinel, reveal,
//! XHR-style GET, fragment splice, re-arm from the merged page.

use std::sync::Arc;

use httpmock::prelude::*;
use tokio::sync::RwLock;

use scrollvisor::{
    Config, Document, FailurePolicy, FetchError, HttpFetcher, Outcome, Pager, PagerError, Rect,
    Selector, Viewport,
};

const LIST: &str = r#"<table><tbody id="feed">
    <tr id="r1"><td>one</td></tr>
    <tr class="next_page_list" data-link="/items?page=2"><td>loading</td></tr>
</tbody></table>"#;

/// Parses the fixture list, lays out its sentinel at y=900, and returns a
/// watching pager wired to the given origin.
async fn armed_pager(
    cfg: Config,
    origin: &str,
) -> (Arc<RwLock<Document>>, Arc<Pager>, scrollvisor::NodeId) {
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

    let fetcher = Arc::new(HttpFetcher::new(origin).unwrap());
    let pager = Pager::new(cfg, Arc::clone(&doc), fetcher, Vec::new());
    pager.watch(container).await.unwrap();
    (doc, pager, container)
}

/// Scrolled far enough that the fixture sentinel at y=900 is visible.
fn revealed() -> Viewport {
    Viewport::new(500.0, 600.0)
}

#[tokio::test]
async fn test_fetches_fragment_as_xhr_and_merges() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET)
            .path("/items")
            .query_param("page", "2")
            .header("x-requested-with", "XMLHttpRequest");
        then.status(200)
            .header("content-type", "text/html")
            .body(r#"<tbody class="loading_tbody"><tr id="r2"><td>two</td></tr></tbody>"#);
    });

    let (doc, pager, container) = armed_pager(Config::default(), &server.base_url()).await;

    let outcome = pager.step(container, revealed()).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Merged {
            appended: 1,
            rearmed: false
        }
    );
    page.assert();

    let d = doc.read().await;
    assert!(d.query_first(container, &Selector::parse("#r2").unwrap()).is_some());
    assert!(d.query_first(container, &Selector::parse(".next_page_list").unwrap()).is_none());
}

#[tokio::test]
async fn test_chains_pages_until_drained() {
    let server = MockServer::start();
    let second = server.mock(|when, then| {
        when.method(GET).path("/items").query_param("page", "2");
        then.status(200).body(
            r#"<tbody class="loading_tbody">
                 <tr id="r2"><td>two</td></tr>
                 <tr class="next_page_list" data-link="/items?page=3"><td>loading</td></tr>
               </tbody>"#,
        );
    });
    let third = server.mock(|when, then| {
        when.method(GET).path("/items").query_param("page", "3");
        then.status(200)
            .body(r#"<tbody class="loading_tbody"><tr id="r3"><td>three</td></tr></tbody>"#);
    });

    let (doc, pager, container) = armed_pager(Config::default(), &server.base_url()).await;

    let outcome = pager.step(container, revealed()).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Merged {
            appended: 2,
            rearmed: true
        }
    );

    // The merged page brought the next sentinel; lay it out and scroll on.
    {
        let mut d = doc.write().await;
        let sentinel = d
            .query_first(container, &Selector::parse(".next_page_list").unwrap())
            .unwrap();
        d.set_rect(sentinel, Rect::new(1300.0, 40.0));
    }
    let outcome = pager
        .step(container, Viewport::new(800.0, 600.0))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        Outcome::Merged {
            appended: 1,
            rearmed: false
        }
    );

    second.assert();
    third.assert();

    // Drained: further scrolling stays idle and fetches nothing.
    assert_eq!(
        pager
            .step(container, Viewport::new(800.0, 600.0))
            .await
            .unwrap(),
        Outcome::Idle
    );
    second.assert_hits(1);
    third.assert_hits(1);
}

#[tokio::test]
async fn test_missing_page_halts_container() {
    let server = MockServer::start();
    let gone = server.mock(|when, then| {
        when.method(GET).path("/items");
        then.status(404).body("not found");
    });

    let (_doc, pager, container) = armed_pager(Config::default(), &server.base_url()).await;

    let err = pager.step(container, revealed()).await.unwrap_err();
    assert!(matches!(
        err,
        PagerError::Fetch(FetchError::Status { status: 404 })
    ));
    assert_eq!(
        pager.step(container, revealed()).await.unwrap(),
        Outcome::Stalled
    );
    // Halted after the first miss: no second request went out.
    gone.assert_hits(1);
}

#[tokio::test]
async fn test_rearm_policy_recovers_over_http() {
    let server = MockServer::start();
    let mut broken = server.mock(|when, then| {
        when.method(GET).path("/items").query_param("page", "2");
        then.status(503).body("try later");
    });

    let mut cfg = Config::default();
    cfg.failure = FailurePolicy::Rearm;
    let (doc, pager, container) = armed_pager(cfg, &server.base_url()).await;

    let err = pager.step(container, revealed()).await.unwrap_err();
    assert!(matches!(
        err,
        PagerError::Fetch(FetchError::Status { status: 503 })
    ));
    broken.assert_hits(1);
    assert!(doc.read().await.query_first(container, &Selector::parse(".next_page_list").unwrap()).is_some());

    // Backend comes back; the restored sentinel triggers again.
    broken.delete();
    let fixed = server.mock(|when, then| {
        when.method(GET).path("/items").query_param("page", "2");
        then.status(200)
            .body(r#"<tbody class="loading_tbody"><tr id="r2"><td>two</td></tr></tbody>"#);
    });

    assert_eq!(
        pager.step(container, revealed()).await.unwrap(),
        Outcome::Merged {
            appended: 1,
            rearmed: false
        }
    );
    fixed.assert();
}

#[tokio::test]
async fn test_markup_contract_is_class_based_not_tag_based() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET)
            .path("/items")
            .query_param("page", "2")
            .header("x-requested-with", "XMLHttpRequest");
        then.status(200)
            .body(r#"<span class="loading_tbody"><li>A</li><li>B</li></span>"#);
    });

    // An unordered list paginated by a div sentinel, answered with a span
    // payload wrapper: the contract lives in class and attribute names, so
    // tag choices are the host's business.
    let doc = Arc::new(RwLock::new(
        Document::parse(
            r#"<ul id="feed">
                 <li>first</li>
                 <div class="next_page_list" data-link="/items?page=2">more</div>
               </ul>"#,
        )
        .unwrap(),
    ));
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
    let fetcher = Arc::new(HttpFetcher::new(&server.base_url()).unwrap());
    let pager = Pager::new(Config::default(), Arc::clone(&doc), fetcher, Vec::new());
    pager.watch(container).await.unwrap();

    let outcome = pager.step(container, revealed()).await.unwrap();
    assert_eq!(
        outcome,
        Outcome::Merged {
            appended: 2,
            rearmed: false
        }
    );

    {
        let d = doc.read().await;
        let items: Vec<String> = d
            .query_all(container, &Selector::parse("li").unwrap())
            .into_iter()
            .map(|li| d.text_content(li))
            .collect();
        assert_eq!(items, ["first", "A", "B"]);
        assert!(d
            .query_first(container, &Selector::parse(".next_page_list").unwrap())
            .is_none());
    }

    // Drained: the next scroll finds nothing to load.
    assert_eq!(
        pager.step(container, revealed()).await.unwrap(),
        Outcome::Idle
    );
    page.assert_hits(1);
}
