//! # Example: delegate
//!
//! Demonstrates root-scoped event delegation on a headless document.
//!
//! Shows how to:
//! - Register a delegated listener with [`Delegator::on`].
//! - Cover rows that did not exist at registration time.
//! - Detach a listener by cancelling its [`Subscription`].
//!
//! ## Flow
//! ```text
//! UiEvent::click(target) ──► Delegator::dispatch(&mut doc, ev)
//!     ├─► window listeners for "click"
//!     └─► for each registration:
//!           query candidates under root ──► walk target's ancestors
//!           └─ first candidate on the chain ──► handler(&mut doc, match, ev)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example delegate
//! ```

use scrollvisor::{Delegator, Document, Selector, UiEvent};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::parse(
        r#"<ul id="menu">
             <li class="item" id="files"><span>Files</span></li>
             <li class="item" id="edit"><span>Edit</span></li>
           </ul>"#,
    )?;

    let delegator = Delegator::new();

    // One registration covers every `.item` under the menu, present and future.
    let toggle = delegator.on(&doc, "#menu", "click", ".item", |doc, item, _ev| {
        let label = doc.text_content(item).trim().to_string();
        if doc.has_class(item, "active") {
            doc.remove_class(item, "active").ok();
            println!("[click] deactivated: {label}");
        } else {
            doc.add_class(item, "active").ok();
            println!("[click] activated:   {label}");
        }
    })?;

    let menu = doc
        .query_first(doc.root(), &Selector::parse("#menu")?)
        .ok_or("missing menu")?;
    let files = doc
        .query_first(doc.root(), &Selector::parse("#files")?)
        .ok_or("missing row")?;
    // Clicks land on the inner <span>; the handler binds the matching <li>.
    let label = doc
        .query_first(files, &Selector::parse("span")?)
        .ok_or("missing label")?;

    delegator.dispatch(&mut doc, &UiEvent::click(label));
    delegator.dispatch(&mut doc, &UiEvent::click(label));

    // A row added after registration is covered by the same listener.
    let view = doc.create_element(menu, "li", &[("class", "item"), ("id", "view")])?;
    doc.create_text(view, "View")?;
    delegator.dispatch(&mut doc, &UiEvent::click(view));

    // Clicking outside any candidate is a silent no-op.
    delegator.dispatch(&mut doc, &UiEvent::click(menu));

    // Disposing the subscription detaches the listener.
    toggle.cancel();
    delegator.dispatch(&mut doc, &UiEvent::click(label));
    println!("[info] listener disposed; that last click went nowhere");

    println!("\nfinal markup:\n{}", doc.html());
    Ok(())
}
