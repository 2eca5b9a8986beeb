//! Moderation queue client.
//!
//! Each resource type gets its own lane:
//! - a gate, so an action never overlaps a list fetch of the same type
//!   (other types are not blocked)
//! - a generation counter, bumped by [`ModerationClient::cancel_view`];
//!   fetches started under an older generation resolve to `Cancelled` and
//!   never reach the cache
//! - the in-flight fetches, shared so concurrent refreshes of the same list
//!   cost one request

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::{BoxFuture, FutureExt, Shared};
use mosques_core::confirmations::ThresholdHint;
use mosques_core::validation::{parse_item, parse_items};
use mosques_core::workflow::{FilterSupport, ModerationAction, ModerationMachine, Moderated, Transition};
use mosques_core::{ModerationItem, ModerationStatus, ResourceType, StatusFilter, TargetRef};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{ListCache, ListKey, Page, Snapshot};
use crate::endpoints;
use crate::error::{ClientError, Result};
use crate::session::Session;
use crate::transport::Transport;

type SharedFetch = Shared<BoxFuture<'static, Result<Vec<ModerationItem>>>>;

/// Result of a successful approve, reject or delete.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionOutcome {
    pub target: TargetRef,
    pub action: ModerationAction,
    /// `None` when the entity was not in any cached list beforehand
    pub transition: Option<Transition>,
    /// The entity as the API returned it (approve/reject only)
    pub item: Option<ModerationItem>,
}

/// Result of a successful confirmation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmationOutcome {
    pub target: TargetRef,
    pub confirmations_count: Option<u32>,
    /// Status as reported by the API. The client never promotes it.
    pub status: Option<ModerationStatus>,
    pub hint: Option<ThresholdHint>,
}

#[derive(Default)]
struct Lane {
    gate: tokio::sync::Mutex<()>,
    generation: AtomicU64,
    in_flight: Mutex<HashMap<ListKey, SharedFetch>>,
}

impl Lane {
    fn in_flight(&self) -> MutexGuard<'_, HashMap<ListKey, SharedFetch>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

struct Inner {
    transport: Transport,
    cache: ListCache,
    filters: FilterSupport,
    machine: Mutex<ModerationMachine>,
    lanes: [Lane; 3],
    threshold: u32,
}

impl Inner {
    fn lane(&self, resource: ResourceType) -> &Lane {
        match resource {
            ResourceType::MosqueSuggestion => &self.lanes[0],
            ResourceType::Review => &self.lanes[1],
            ResourceType::EditProposal => &self.lanes[2],
        }
    }

    fn machine(&self) -> MutexGuard<'_, ModerationMachine> {
        self.machine.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn fetch(self: Arc<Self>, key: ListKey, generation: u64) -> Result<Vec<ModerationItem>> {
        let lane = self.lane(key.resource);
        let _gate = lane.gate.lock().await;
        if lane.generation() != generation {
            return Err(ClientError::Cancelled);
        }

        let mut query = vec![("status", key.status.wire_value(key.resource).to_string())];
        query.extend(key.page.query());
        let body = self
            .transport
            .get(&endpoints::moderation_list(key.resource), &query)
            .await?;
        let page = parse_items(key.resource, body)?;
        for rejected in &page.rejected {
            warn!(resource = %key.resource, error = %rejected, "Skipping malformed list entry");
        }
        let items = page.items;

        if lane.generation() != generation {
            debug!(resource = %key.resource, "Discarding list fetched for a cancelled view");
            return Err(ClientError::Cancelled);
        }

        debug!(
            resource = %key.resource,
            status = %key.status,
            count = items.len(),
            "Fetched moderation list"
        );
        self.cache.store(key, items.clone());
        Ok(items)
    }
}

/// Moderation client. Cheap to clone; clones share cache, lanes and the
/// confirmation ledger.
#[derive(Clone)]
pub struct ModerationClient {
    inner: Arc<Inner>,
}

impl ModerationClient {
    pub fn new(transport: Transport) -> Self {
        Self::with_filter_support(transport, FilterSupport::default())
    }

    pub fn with_filter_support(transport: Transport, filters: FilterSupport) -> Self {
        let threshold = transport.config().confirmation_threshold;
        Self {
            inner: Arc::new(Inner {
                transport,
                cache: ListCache::new(),
                filters,
                machine: Mutex::new(ModerationMachine::new()),
                lanes: Default::default(),
                threshold,
            }),
        }
    }

    pub fn session(&self) -> &Session {
        self.inner.transport.session()
    }

    pub fn confirmation_threshold(&self) -> u32 {
        self.inner.threshold
    }

    /// List a moderation queue, from cache when a copy is held.
    pub async fn list_entities(
        &self,
        resource: ResourceType,
        status: StatusFilter,
        page: Page,
    ) -> Result<Vec<ModerationItem>> {
        self.inner.filters.check(resource, status)?;
        let key = ListKey {
            resource,
            status,
            page,
        };
        if let Some(items) = self.inner.cache.get(&key) {
            debug!(resource = %resource, status = %status, "Serving moderation list from cache");
            return Ok(items);
        }
        self.refresh_entities(resource, status, page).await
    }

    /// Fetch a moderation queue, bypassing the cache. Joins an identical
    /// fetch already in flight instead of starting another.
    pub async fn refresh_entities(
        &self,
        resource: ResourceType,
        status: StatusFilter,
        page: Page,
    ) -> Result<Vec<ModerationItem>> {
        self.inner.filters.check(resource, status)?;
        let key = ListKey {
            resource,
            status,
            page,
        };
        let lane = self.inner.lane(resource);

        let fetch = {
            let mut in_flight = lane.in_flight();
            match in_flight.get(&key) {
                Some(fetch) => {
                    debug!(resource = %resource, status = %status, "Joining in-flight fetch");
                    fetch.clone()
                }
                None => {
                    let fetch = self
                        .inner
                        .clone()
                        .fetch(key, lane.generation())
                        .boxed()
                        .shared();
                    in_flight.insert(key, fetch.clone());
                    fetch
                }
            }
        };

        let result = fetch.clone().await;

        let mut in_flight = lane.in_flight();
        if in_flight.get(&key).is_some_and(|f| f.ptr_eq(&fetch)) {
            in_flight.remove(&key);
        }
        result
    }

    /// Abandon every pending fetch of this resource type. Their callers get
    /// `Cancelled`; the cache keeps its previous contents.
    pub fn cancel_view(&self, resource: ResourceType) {
        let lane = self.inner.lane(resource);
        let generation = lane.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let dropped = {
            let mut in_flight = lane.in_flight();
            let n = in_flight.len();
            in_flight.clear();
            n
        };
        debug!(resource = %resource, generation, dropped, "View cancelled");
    }

    /// Approve, reject or delete one entity.
    ///
    /// Approve/reject are applied to cached lists before the request and
    /// rolled back if it fails. Delete waits for the API.
    pub async fn perform_action(
        &self,
        resource: ResourceType,
        id: i64,
        action: ModerationAction,
    ) -> Result<ActionOutcome> {
        let target = TargetRef::new(resource, id);
        let actor = self.session().actor().await;
        self.inner.machine().authorize(&actor, action)?;

        let lane = self.inner.lane(resource);
        let _gate = lane.gate.lock().await;

        let previous = self.inner.cache.find(resource, id).map(|item| item.status());
        let snapshot = match action.target_status() {
            Some(to) if action != ModerationAction::Delete => {
                self.inner.cache.apply_status(resource, id, to)
            }
            _ => Snapshot::default(),
        };

        let path = endpoints::moderation_action(resource, id, action);
        let result = match action {
            ModerationAction::Delete => self.inner.transport.delete(&path).await,
            _ => self.inner.transport.post_empty(&path).await,
        };

        let body = match result {
            Ok(body) => body,
            Err(e) => {
                if !snapshot.is_empty() {
                    self.inner.cache.rollback(snapshot);
                    warn!(target_ref = %target, action = %action, error = %e, "Rolled back optimistic update");
                }
                return Err(e);
            }
        };

        let invalidated = self.inner.cache.invalidate(resource);
        let item = returned_item(resource, body);
        let transition = previous.map(|status| status.apply(action));

        info!(
            target_ref = %target,
            action = %action,
            ?transition,
            invalidated,
            "Moderation action applied"
        );

        Ok(ActionOutcome {
            target,
            action,
            transition,
            item,
        })
    }

    /// Confirm a pending suggestion or edit as the current user.
    pub async fn confirm_entity(&self, resource: ResourceType, id: i64) -> Result<ConfirmationOutcome> {
        let target = TargetRef::new(resource, id);
        let actor = self.session().actor().await;
        let cached = self.inner.cache.find(resource, id);

        let user = self
            .inner
            .machine()
            .check_confirmable(&actor, target, cached.as_ref().map(|item| item.status()))?;
        let path = endpoints::confirmation(resource, id)
            .ok_or_else(|| ClientError::Unsupported(format!("{} cannot be confirmed", resource)))?;

        let lane = self.inner.lane(resource);
        let _gate = lane.gate.lock().await;

        // A concurrent confirm may have landed while we waited.
        if self.inner.machine().has_confirmed(user, target) {
            return Err(ClientError::AlreadyConfirmed(target));
        }

        let body = match self.inner.transport.post_empty(&path).await {
            Ok(body) => body,
            Err(e) if is_duplicate_confirmation(&e) => {
                self.inner.machine().record_confirmation(user, target);
                debug!(target_ref = %target, user = %user, "API reports duplicate confirmation");
                return Err(ClientError::AlreadyConfirmed(target));
            }
            Err(e) => return Err(e),
        };

        self.inner.machine().record_confirmation(user, target);
        self.inner.cache.invalidate(resource);

        let item = returned_item(resource, body);
        let confirmations_count = item
            .as_ref()
            .and_then(ModerationItem::confirmations_count)
            .or_else(|| {
                cached
                    .as_ref()
                    .and_then(ModerationItem::confirmations_count)
                    .map(|count| count + 1)
            });
        let status = item.as_ref().map(|item| item.status());
        let hint = confirmations_count
            .filter(|_| status.map_or(true, |s| s.is_pending()))
            .map(|count| ThresholdHint::for_count(count, self.inner.threshold));

        info!(target_ref = %target, user = %user, ?confirmations_count, "Confirmation submitted");

        Ok(ConfirmationOutcome {
            target,
            confirmations_count,
            status,
            hint,
        })
    }

    /// Threshold hint for a listed item; `None` for reviews and settled items.
    pub fn hint_for(&self, item: &ModerationItem) -> Option<ThresholdHint> {
        if !item.status().is_pending() {
            return None;
        }
        item.confirmations_count()
            .map(|count| ThresholdHint::for_count(count, self.inner.threshold))
    }
}

fn returned_item(resource: ResourceType, body: Value) -> Option<ModerationItem> {
    if !body.is_object() {
        return None;
    }
    match parse_item(resource, body) {
        Ok(item) => Some(item),
        Err(e) => {
            debug!(resource = %resource, error = %e, "Ignoring unparseable action response");
            None
        }
    }
}

/// 409, or the legacy `400 Duplicate confirmation for this user`.
fn is_duplicate_confirmation(err: &ClientError) -> bool {
    match err {
        ClientError::Api { status: 409, .. } => true,
        ClientError::Api { status: 400, message } => {
            message.to_ascii_lowercase().contains("duplicate confirmation")
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_confirmation_detection() {
        assert!(is_duplicate_confirmation(&ClientError::Api {
            status: 409,
            message: "Conflict".into()
        }));
        assert!(is_duplicate_confirmation(&ClientError::Api {
            status: 400,
            message: "Duplicate confirmation for this user".into()
        }));
        assert!(!is_duplicate_confirmation(&ClientError::Api {
            status: 400,
            message: "Only pending suggestions can be confirmed".into()
        }));
        assert!(!is_duplicate_confirmation(&ClientError::Auth("expired".into())));
    }

    #[test]
    fn test_returned_item_ignores_non_entities() {
        assert!(returned_item(ResourceType::Review, Value::Null).is_none());
        assert!(returned_item(ResourceType::Review, serde_json::json!({ "deleted": true })).is_none());
    }
}
