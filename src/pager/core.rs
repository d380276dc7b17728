use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::delegate::{Delegator, Subscription};
use crate::dom::{Document, DomError, NodeId, Selector, Viewport};
use crate::error::{FetchError, PagerError};
use crate::events::{Bus, Event, EventKind};
use crate::fetch::Fetch;
use crate::policy::FailurePolicy;
use crate::subscribers::{Subscribe, SubscriberSet};

use super::{
    handle::PagerHandle,
    sentinel::{self, SentinelRef},
    slot::{Phase, Slot},
};

/// What one [`Pager::step`] call did to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No armed sentinel in the container; nothing to load.
    Idle,

    /// The container is parked after an earlier failed load.
    Stalled,

    /// A sentinel is armed but the viewport has not revealed it.
    NotVisible,

    /// A load is already in flight for this container.
    InFlight,

    /// A page was fetched and spliced in.
    Merged {
        /// Elements inserted where the sentinel was.
        appended: usize,
        /// True if the merged content armed a fresh sentinel.
        rearmed: bool,
    },
}

/// Pager watches containers for pending-load sentinels and turns scroll
/// positions into next-page fetches and merges.
///
/// Each watched container has a slot that moves through
/// `Idle → Armed → Fetching → (Idle | Armed | Stalled)`. At most one load is
/// in flight per container, and a triggered sentinel is consumed before the
/// fetch starts, so it can never fire twice.
pub struct Pager {
    cfg: Config,
    doc: Arc<RwLock<Document>>,
    fetcher: Arc<dyn Fetch>,
    bus: Bus,
    subs: Arc<SubscriberSet>,

    // Internal state. Lock order is slots, then doc; never the reverse.
    slots: RwLock<HashMap<NodeId, Slot>>,

    // Scroll signal queue for the driven loop.
    tx: mpsc::Sender<Viewport>,
    rx: RwLock<Option<mpsc::Receiver<Viewport>>>,
}

impl Pager {
    /// Creates a new pager over a shared document.
    ///
    /// The pager builds its own [`Bus`] and hands it to the subscriber
    /// fan-out, so overflow/panic reports land on the same stream as
    /// pagination events. Must be called inside a Tokio runtime (subscriber
    /// workers spawn immediately).
    pub fn new(
        cfg: Config,
        doc: Arc<RwLock<Document>>,
        fetcher: Arc<dyn Fetch>,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Arc<Self> {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let subs = Arc::new(SubscriberSet::new(subscribers, Some(bus.clone())));
        let (tx, rx) = mpsc::channel(cfg.signal_capacity_clamped());

        let pager = Arc::new(Self {
            cfg,
            doc,
            fetcher,
            bus,
            subs,
            slots: RwLock::new(HashMap::new()),
            tx,
            rx: RwLock::new(Some(rx)),
        });
        pager.subscriber_listener();
        pager
    }

    /// Returns a handle for feeding scroll positions to the driven loop.
    pub fn handle(&self) -> PagerHandle {
        PagerHandle::new(self.tx.clone())
    }

    /// The event bus; subscribe to observe pagination as it happens.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// The shared document this pager edits.
    pub fn document(&self) -> &Arc<RwLock<Document>> {
        &self.doc
    }

    /// Places a container under pagination watch.
    ///
    /// The container must be an element. Re-watching resets the slot to
    /// idle, which also revives a stalled container.
    pub async fn watch(&self, container: NodeId) -> Result<(), PagerError> {
        {
            let doc = self.doc.read().await;
            if !doc.is_element(container) {
                return Err(PagerError::Dom(DomError::NotAnElement));
            }
        }
        self.slots.write().await.insert(container, Slot::new());
        self.bus
            .publish(Event::new(EventKind::ContainerWatched).with_container(container));
        Ok(())
    }

    /// Removes a container from watch. In-flight loads for it are dropped
    /// when they come back.
    pub async fn unwatch(&self, container: NodeId) -> Result<(), PagerError> {
        if self.slots.write().await.remove(&container).is_none() {
            return Err(PagerError::NotWatched { container });
        }
        self.bus
            .publish(Event::new(EventKind::ContainerUnwatched).with_container(container));
        Ok(())
    }

    /// True if the container currently has a pagination slot.
    pub async fn is_watched(&self, container: NodeId) -> bool {
        self.slots.read().await.contains_key(&container)
    }

    /// Advances one container against the given viewport.
    ///
    /// This is the whole state machine in one call: resolve the sentinel,
    /// check visibility, and when the sentinel is revealed commit the load
    /// (consume the marker, fetch, merge). The fetch itself runs with no
    /// locks held; concurrent steps for the same container observe
    /// [`Outcome::InFlight`].
    ///
    /// A failed fetch first applies the configured [`FailurePolicy`] to the
    /// slot, then surfaces as [`PagerError::Fetch`] so the caller sees the
    /// cause.
    pub async fn step(&self, container: NodeId, viewport: Viewport) -> Result<Outcome, PagerError> {
        let triggered = {
            let mut slots = self.slots.write().await;
            let slot = slots
                .get_mut(&container)
                .ok_or(PagerError::NotWatched { container })?;

            match slot.phase {
                Phase::Stalled => return Ok(Outcome::Stalled),
                Phase::Fetching { .. } => return Ok(Outcome::InFlight),
                Phase::Idle | Phase::Armed { .. } => {}
            }

            let mut doc = self.doc.write().await;

            // Keep the armed sentinel while it still holds up; fall back to
            // a container scan only when there is none, or the host removed
            // or rewired it since we last looked.
            let previous = match &slot.phase {
                Phase::Armed { sentinel } => Some(sentinel.clone()),
                _ => None,
            };
            let found = previous
                .as_ref()
                .filter(|sref| sentinel::still_armed(&doc, container, sref, &self.cfg))
                .cloned()
                .or_else(|| sentinel::scan(&doc, container, &self.cfg));
            let Some(found) = found else {
                slot.phase = Phase::Idle;
                return Ok(Outcome::Idle);
            };

            if previous.as_ref() != Some(&found) {
                self.bus.publish(
                    Event::new(EventKind::SentinelArmed)
                        .with_container(container)
                        .with_path(Arc::clone(&found.path)),
                );
            }

            if !viewport.reveals(&doc.rect(found.node)) {
                slot.phase = Phase::Armed { sentinel: found };
                return Ok(Outcome::NotVisible);
            }

            // Commit the load: strip the marker before anything async runs,
            // so this sentinel can never trigger a second fetch.
            doc.remove_class(found.node, &self.cfg.marker_class)?;
            slot.phase = Phase::Fetching {
                sentinel: found.clone(),
            };
            found
        };

        self.bus.publish(
            Event::new(EventKind::SentinelTriggered)
                .with_container(container)
                .with_path(Arc::clone(&triggered.path)),
        );
        self.bus.publish(
            Event::new(EventKind::FetchStarted)
                .with_container(container)
                .with_path(Arc::clone(&triggered.path)),
        );

        match self.fetcher.get_fragment(&triggered.path).await {
            Ok(body) => self.merge(container, &triggered, &body).await,
            Err(err) => self.fail(container, &triggered, err).await,
        }
    }

    /// Steps every watched container against one viewport.
    ///
    /// One broken container must not stop scroll handling for the others,
    /// so every container is stepped and each result comes back paired with
    /// its container. Containers unwatched mid-sweep are skipped.
    pub async fn on_scroll(
        &self,
        viewport: Viewport,
    ) -> Vec<(NodeId, Result<Outcome, PagerError>)> {
        let mut containers: Vec<NodeId> = self.slots.read().await.keys().copied().collect();
        containers.sort_unstable();

        let mut results = Vec::with_capacity(containers.len());
        for container in containers {
            match self.step(container, viewport).await {
                // Unwatched between the snapshot and the step.
                Err(PagerError::NotWatched { .. }) => {}
                result => results.push((container, result)),
            }
        }
        results
    }

    /// Starts the driven loop: consumes scroll signals from the handle until
    /// the token is cancelled. Step failures are logged and do not stop the
    /// loop.
    ///
    /// Returns the loop's join handle; a second call resolves to
    /// [`PagerError::AlreadyRunning`].
    pub fn run(self: &Arc<Self>, token: CancellationToken) -> JoinHandle<Result<(), PagerError>> {
        let pager = Arc::clone(self);
        tokio::spawn(async move { pager.run_inner(token).await })
    }

    async fn run_inner(&self, token: CancellationToken) -> Result<(), PagerError> {
        let mut rx = self
            .rx
            .write()
            .await
            .take()
            .ok_or(PagerError::AlreadyRunning)?;

        loop {
            tokio::select! {
                _ = token.cancelled() => break,

                Some(viewport) = rx.recv() => {
                    for (container, result) in self.on_scroll(viewport).await {
                        if let Err(err) = result {
                            tracing::warn!(?container, error = %err, "pagination step failed");
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Wires the pager to a [`Delegator`]: window `"scroll"` events feed the
    /// signal queue. Dropping the returned subscription detaches it.
    pub fn attach(&self, delegator: &Delegator) -> Subscription {
        let handle = self.handle();
        delegator.on_window("scroll", move |ev| {
            if let Some(viewport) = ev.viewport {
                // Scroll positions are coalescable; a dropped signal is
                // superseded by the next one.
                if let Err(err) = handle.try_signal(viewport) {
                    tracing::debug!(%err, "scroll signal dropped");
                }
            }
        })
    }

    /// Subscribes to the bus and forwards events to the subscriber set
    /// (fire-and-forget).
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => set.emit(&ev),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::warn!(missed, "subscriber listener lagged; events skipped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    /// Splices a fetched fragment in after the consumed sentinel.
    async fn merge(
        &self,
        container: NodeId,
        sref: &SentinelRef,
        body: &str,
    ) -> Result<Outcome, PagerError> {
        let fragment = match Document::parse(body) {
            Ok(fragment) => fragment,
            Err(err) => {
                return self
                    .broken_fragment(container, sref, PagerError::Dom(err))
                    .await;
            }
        };
        let wrapper =
            fragment.query_first(fragment.root(), &Selector::class(&self.cfg.slot_class));
        let Some(wrapper) = wrapper else {
            let err = PagerError::MissingPayload {
                path: sref.path.to_string(),
            };
            return self.broken_fragment(container, sref, err).await;
        };
        // Element children only; formatting whitespace between rows is not
        // content.
        let payload: Vec<NodeId> = fragment
            .children(wrapper)
            .iter()
            .copied()
            .filter(|child| fragment.is_element(*child))
            .collect();

        let mut slots = self.slots.write().await;
        let slot = slots
            .get_mut(&container)
            .ok_or(PagerError::NotWatched { container })?;
        let mut doc = self.doc.write().await;

        if !sentinel_present(&doc, container, sref.node) {
            slot.phase = Phase::Idle;
            tracing::debug!(?container, "sentinel left the tree mid-flight; page dropped");
            return Err(PagerError::SentinelVanished { container });
        }

        let mut anchor = sref.node;
        let mut appended = 0usize;
        for child in payload {
            let copy = doc.adopt_subtree(&fragment, child)?;
            doc.insert_after(anchor, copy)?;
            anchor = copy;
            appended += 1;
        }
        doc.remove(sref.node)?;

        self.bus.publish(
            Event::new(EventKind::PageMerged)
                .with_container(container)
                .with_path(Arc::clone(&sref.path))
                .with_appended(appended),
        );

        // The merged page decides what happens next: a fresh sentinel keeps
        // the chain going, none means the feed is drained.
        let rearmed = match sentinel::scan(&doc, container, &self.cfg) {
            Some(next) => {
                self.bus.publish(
                    Event::new(EventKind::SentinelArmed)
                        .with_container(container)
                        .with_path(Arc::clone(&next.path)),
                );
                slot.phase = Phase::Armed { sentinel: next };
                true
            }
            None => {
                slot.phase = Phase::Idle;
                self.bus
                    .publish(Event::new(EventKind::PagerDrained).with_container(container));
                false
            }
        };

        Ok(Outcome::Merged { appended, rearmed })
    }

    /// Applies the failure policy after a failed fetch, then surfaces the
    /// fetch error to the caller.
    async fn fail(
        &self,
        container: NodeId,
        sref: &SentinelRef,
        err: FetchError,
    ) -> Result<Outcome, PagerError> {
        let mut report = Event::new(EventKind::FetchFailed)
            .with_container(container)
            .with_path(Arc::clone(&sref.path))
            .with_reason(err.to_string());
        if let FetchError::Status { status } = &err {
            report = report.with_status(*status);
        }
        self.bus.publish(report);

        let mut slots = self.slots.write().await;
        let slot = slots
            .get_mut(&container)
            .ok_or(PagerError::NotWatched { container })?;

        match self.cfg.failure {
            FailurePolicy::Halt => {
                slot.phase = Phase::Stalled;
                self.bus.publish(
                    Event::new(EventKind::PagerStalled)
                        .with_container(container)
                        .with_path(Arc::clone(&sref.path))
                        .with_reason(err.to_string()),
                );
            }
            FailurePolicy::Rearm => {
                let mut doc = self.doc.write().await;
                if sentinel_present(&doc, container, sref.node) {
                    doc.add_class(sref.node, &self.cfg.marker_class)?;
                    slot.phase = Phase::Armed {
                        sentinel: sref.clone(),
                    };
                } else {
                    slot.phase = Phase::Idle;
                }
            }
        }
        Err(PagerError::Fetch(err))
    }

    /// Parks the container over a malformed `200 OK` body. Unlike fetch
    /// failures this ignores the failure policy: retrying a broken contract
    /// would loop forever.
    async fn broken_fragment(
        &self,
        container: NodeId,
        sref: &SentinelRef,
        err: PagerError,
    ) -> Result<Outcome, PagerError> {
        if let Some(slot) = self.slots.write().await.get_mut(&container) {
            slot.phase = Phase::Stalled;
        }
        self.bus.publish(
            Event::new(EventKind::PagerStalled)
                .with_container(container)
                .with_path(Arc::clone(&sref.path))
                .with_reason(err.to_string()),
        );
        Err(err)
    }
}

/// The sentinel is still attached and still inside its container.
fn sentinel_present(doc: &Document, container: NodeId, node: NodeId) -> bool {
    doc.is_attached(node) && doc.is_descendant_of(node, container)
}
