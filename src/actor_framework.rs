use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION (Entity trait with hooks and actions)
// =============================================================================

/// Trait that any document stored in a collection must implement to be managed
/// by [`ResourceActor`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    // --- Custom Actions ---
    type Action: Clone + Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Domain error raised by the hooks below.
    type Error: Clone + Debug + Display + Send + Sync + 'static;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create_params(id: Self::Id, params: Self::CreateParams) -> Result<Self, Self::Error>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), Self::Error> { Ok(()) }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), Self::Error>;
    fn on_delete(&self) -> Result<(), Self::Error> { Ok(()) }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, Self::Error>;
}

/// Failures reported by a collection actor.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError<E> {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Rejected(E),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T, E> = oneshot::Sender<Result<T, FrameworkError<E>>>;

/// Immutable view of a whole collection, in storage order.
pub type Snapshot<T> = Arc<Vec<T>>;

/// Eligibility test evaluated inside the actor, against committed state.
pub struct Predicate<T>(Box<dyn Fn(&T) -> bool + Send + Sync>);

impl<T> Predicate<T> {
    pub fn new(predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(predicate))
    }

    pub fn matches(&self, item: &T) -> bool {
        (self.0)(item)
    }
}

impl<T> Debug for Predicate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Predicate")
    }
}

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id, T::Error>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>, T::Error>,
    },
    List {
        respond_to: Response<Vec<T>, T::Error>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T, T::Error>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<(), T::Error>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult, T::Error>,
    },
    /// All-or-nothing: either every patch commits or none does.
    BatchUpdate {
        patches: Vec<(T::Id, T::Patch)>,
        respond_to: Response<Vec<T>, T::Error>,
    },
    /// All-or-nothing: the same action applied to every id.
    BatchAction {
        ids: Vec<T::Id>,
        action: T::Action,
        respond_to: Response<Vec<T::ActionResult>, T::Error>,
    },
    /// Applies `action` to the selected ids that exist and match `predicate`,
    /// all-or-nothing. The rest of the selection is skipped. Replies with the
    /// advanced ids in storage order; an empty reply means nothing was written.
    BatchActionWhere {
        ids: Vec<T::Id>,
        action: T::Action,
        predicate: Predicate<T>,
        respond_to: Response<Vec<(T::Id, T::ActionResult)>, T::Error>,
    },
    Subscribe {
        respond_to: Response<watch::Receiver<Snapshot<T>>, T::Error>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// One named collection. Requests are handled strictly one at a time, and a
/// snapshot is published after every committed write.
pub struct ResourceActor<T: Entity> {
    collection: &'static str,
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    order: Vec<T::Id>,
    snapshots: watch::Sender<Snapshot<T>>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        collection: &'static str,
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let (snapshots, _) = watch::channel(Arc::new(Vec::new()));
        let actor = Self {
            collection,
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
            snapshots,
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::new(sender);
        (actor, client)
    }

    #[instrument(name = "resource_actor", skip(self))]
    pub async fn run(mut self) {
        info!(collection = self.collection, "Collection actor starting");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.ordered_items()));
                }
                ResourceRequest::Update { id, patch, respond_to } => {
                    let _ = respond_to.send(self.handle_update(id, patch));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let _ = respond_to.send(self.handle_delete(id));
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let _ = respond_to.send(self.handle_action(id, action));
                }
                ResourceRequest::BatchUpdate { patches, respond_to } => {
                    let _ = respond_to.send(self.handle_batch_update(patches));
                }
                ResourceRequest::BatchAction { ids, action, respond_to } => {
                    let _ = respond_to.send(self.handle_batch_action(ids, action));
                }
                ResourceRequest::BatchActionWhere { ids, action, predicate, respond_to } => {
                    let _ = respond_to.send(self.handle_batch_action_where(ids, action, predicate));
                }
                ResourceRequest::Subscribe { respond_to } => {
                    let _ = respond_to.send(Ok(self.snapshots.subscribe()));
                }
            }
        }

        info!(collection = self.collection, "Collection actor stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        let id = (self.next_id_fn)();
        let mut item = T::from_create_params(id.clone(), params).map_err(FrameworkError::Rejected)?;
        item.on_create().map_err(FrameworkError::Rejected)?;

        self.store.insert(id.clone(), item);
        self.order.push(id.clone());
        self.publish();
        debug!(collection = self.collection, id = %id, "Item created");
        Ok(id)
    }

    fn handle_update(&mut self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;

        let mut staged = item.clone();
        staged.on_update(patch).map_err(FrameworkError::Rejected)?;
        *item = staged.clone();

        self.publish();
        Ok(staged)
    }

    fn handle_delete(&mut self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        let item = self
            .store
            .get(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
        item.on_delete().map_err(FrameworkError::Rejected)?;

        self.store.remove(&id);
        self.order.retain(|existing| existing != &id);
        self.publish();
        debug!(collection = self.collection, id = %id, "Item deleted");
        Ok(())
    }

    fn handle_action(&mut self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        let item = self
            .store
            .get_mut(&id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;

        let mut staged = item.clone();
        let result = staged.handle_action(action).map_err(FrameworkError::Rejected)?;
        *item = staged;

        self.publish();
        Ok(result)
    }

    fn handle_batch_update(&mut self, patches: Vec<(T::Id, T::Patch)>) -> Result<Vec<T>, FrameworkError<T::Error>> {
        let mut staged = HashMap::new();
        let mut touched = Vec::new();

        for (id, patch) in patches {
            let item = self.stage(&mut staged, &id)?;
            if let Err(e) = item.on_update(patch) {
                warn!(collection = self.collection, id = %id, error = %e, "Batch update rejected, nothing committed");
                return Err(FrameworkError::Rejected(e));
            }
            if !touched.contains(&id) {
                touched.push(id);
            }
        }

        Ok(self.commit(staged, &touched))
    }

    fn handle_batch_action(&mut self, ids: Vec<T::Id>, action: T::Action) -> Result<Vec<T::ActionResult>, FrameworkError<T::Error>> {
        let mut staged = HashMap::new();
        let mut touched = Vec::new();
        let mut results = Vec::with_capacity(ids.len());

        for id in ids {
            let item = self.stage(&mut staged, &id)?;
            match item.handle_action(action.clone()) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!(collection = self.collection, id = %id, error = %e, "Batch action rejected, nothing committed");
                    return Err(FrameworkError::Rejected(e));
                }
            }
            if !touched.contains(&id) {
                touched.push(id);
            }
        }

        self.commit(staged, &touched);
        Ok(results)
    }

    fn handle_batch_action_where(
        &mut self,
        ids: Vec<T::Id>,
        action: T::Action,
        predicate: Predicate<T>,
    ) -> Result<Vec<(T::Id, T::ActionResult)>, FrameworkError<T::Error>> {
        let eligible: Vec<T::Id> = self
            .order
            .iter()
            .filter(|id| ids.contains(id))
            .filter(|id| self.store.get(*id).map_or(false, |item| predicate.matches(item)))
            .cloned()
            .collect();

        if eligible.is_empty() {
            debug!(collection = self.collection, selected = ids.len(), "No eligible items in selection");
            return Ok(Vec::new());
        }

        let results = self.handle_batch_action(eligible.clone(), action)?;
        Ok(eligible.into_iter().zip(results).collect())
    }

    /// Returns the staged copy of `id`, cloning it from the store on first use.
    fn stage<'a>(&self, staged: &'a mut HashMap<T::Id, T>, id: &T::Id) -> Result<&'a mut T, FrameworkError<T::Error>> {
        if !staged.contains_key(id) {
            let current = self
                .store
                .get(id)
                .cloned()
                .ok_or_else(|| FrameworkError::NotFound(id.to_string()))?;
            staged.insert(id.clone(), current);
        }
        staged
            .get_mut(id)
            .ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }

    fn commit(&mut self, mut staged: HashMap<T::Id, T>, touched: &[T::Id]) -> Vec<T> {
        let mut committed = Vec::with_capacity(touched.len());
        for id in touched {
            if let Some(item) = staged.remove(id) {
                committed.push(item.clone());
                self.store.insert(id.clone(), item);
            }
        }

        if !committed.is_empty() {
            self.publish();
            debug!(collection = self.collection, count = committed.len(), "Batch committed");
        }
        committed
    }

    fn ordered_items(&self) -> Vec<T> {
        self.order
            .iter()
            .filter_map(|id| self.store.get(id).cloned())
            .collect()
    }

    fn publish(&self) {
        self.snapshots.send_replace(Arc::new(self.ordered_items()));
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R, T::Error>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError<T::Error>> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Update { id, patch, respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }

    pub async fn batch_update(&self, patches: Vec<(T::Id, T::Patch)>) -> Result<Vec<T>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::BatchUpdate { patches, respond_to }).await
    }

    pub async fn batch_action(&self, ids: Vec<T::Id>, action: T::Action) -> Result<Vec<T::ActionResult>, FrameworkError<T::Error>> {
        self.request(|respond_to| ResourceRequest::BatchAction { ids, action, respond_to }).await
    }

    pub async fn batch_action_where(
        &self,
        ids: Vec<T::Id>,
        action: T::Action,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<(T::Id, T::ActionResult)>, FrameworkError<T::Error>> {
        let predicate = Predicate::new(predicate);
        self.request(|respond_to| ResourceRequest::BatchActionWhere { ids, action, predicate, respond_to }).await
    }

    /// Registers a live view over the items matching `filter`.
    pub async fn subscribe(
        &self,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Subscription<T>, FrameworkError<T::Error>> {
        let receiver = self.request(|respond_to| ResourceRequest::Subscribe { respond_to }).await?;
        Ok(Subscription::new(receiver, filter))
    }
}

// =============================================================================
// 5. LIVE SUBSCRIPTIONS
// =============================================================================

type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Handle to a live, filtered view of one collection.
///
/// Every value handed out is an owned copy of a committed state, so readers never
/// share mutable state with the actor or with each other. Intermediate states may
/// be skipped when writes arrive faster than the reader polls, but a batch is
/// always observed whole. Dropping the handle (or calling [`Subscription::cancel`])
/// unregisters it.
pub struct Subscription<T: Entity> {
    receiver: watch::Receiver<Snapshot<T>>,
    filter: Filter<T>,
    order_by: Option<Comparator<T>>,
}

impl<T: Entity> Subscription<T> {
    pub fn new(
        receiver: watch::Receiver<Snapshot<T>>,
        filter: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            receiver,
            filter: Box::new(filter),
            order_by: None,
        }
    }

    pub fn order_by(mut self, compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.order_by = Some(Box::new(compare));
        self
    }

    /// The latest committed view.
    pub fn current(&mut self) -> Vec<T> {
        let snapshot = {
            let guard = self.receiver.borrow_and_update();
            Arc::clone(&*guard)
        };
        self.project(&snapshot)
    }

    /// Waits for the next committed write and returns the resulting view.
    /// Returns `None` once the collection actor has stopped.
    pub async fn changed(&mut self) -> Option<Vec<T>> {
        self.receiver.changed().await.ok()?;
        Some(self.current())
    }

    pub fn cancel(self) {
        debug!("Subscription cancelled");
    }

    fn project(&self, snapshot: &[T]) -> Vec<T> {
        let mut items: Vec<T> = snapshot
            .iter()
            .filter(|item| (self.filter)(item))
            .cloned()
            .collect();
        if let Some(compare) = &self.order_by {
            items.sort_by(|a, b| compare(a, b));
        }
        items
    }
}

// =============================================================================
// 6. TESTS
// =============================================================================
