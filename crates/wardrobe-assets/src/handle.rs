//! Counted, disposable ownership handles for loaded resources.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

type ReleaseFn = Box<dyn FnOnce() + Send>;

/// State shared by every hold on one payload. Dropping the last `Arc` runs
/// the release hook exactly once, then drops the retained parent handles,
/// cascading disposal upward.
struct Shared<T> {
    item: T,
    on_release: Mutex<Option<ReleaseFn>>,
    parents: Mutex<Vec<Box<dyn Any + Send>>>,
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        if let Some(release) = self.on_release.lock().take() {
            release();
        }
        // `item` and `parents` drop after this body, in that order.
    }
}

/// A counted ownership handle around a loaded resource.
///
/// Every alive `Ref` (including clones) is one hold on the payload; the
/// payload is released exactly once, when the last hold is disposed or
/// dropped. A `Ref` built with [`Ref::from_dependent_resource`] keeps its
/// parent alive for as long as its own payload is, so derived assets never
/// outlive the container they were extracted from.
///
/// Dropping a `Ref` is equivalent to disposing it; [`Ref::dispose`] exists
/// for early, explicit release and is idempotent.
pub struct Ref<T> {
    shared: Option<Arc<Shared<T>>>,
}

impl<T> Ref<T> {
    /// Wrap any value as a standalone handle. Always succeeds; disposal
    /// simply drops the value.
    pub fn from_any(item: T) -> Self {
        Self::build(item, None, Vec::new())
    }

    /// Wrap a value with a release hook that runs exactly once, when the
    /// last hold on the payload is gone.
    pub fn with_release(item: T, release: impl FnOnce() + Send + 'static) -> Self {
        Self::build(item, Some(Box::new(release)), Vec::new())
    }

    /// Wrap a value whose lifetime depends on `parent`.
    ///
    /// The new handle retains `parent` until its own payload is released.
    /// Several dependents share one parent by each retaining their own
    /// clone of it; the parent's payload is freed only when the last
    /// holder, dependent or direct, is gone.
    pub fn from_dependent_resource<P>(item: T, parent: Ref<P>) -> Self
    where
        P: Send + Sync + 'static,
    {
        Self::build(item, None, vec![Box::new(parent) as Box<dyn Any + Send>])
    }

    /// The canonical "not found" handle: never alive, `item()` is `None`.
    pub fn empty() -> Self {
        Self { shared: None }
    }

    fn build(item: T, on_release: Option<ReleaseFn>, parents: Vec<Box<dyn Any + Send>>) -> Self {
        Self {
            shared: Some(Arc::new(Shared {
                item,
                on_release: Mutex::new(on_release),
                parents: Mutex::new(parents),
            })),
        }
    }

    /// Retain an additional parent for the lifetime of this payload.
    /// On a disposed handle the parent's hold is released immediately.
    pub fn retain<P>(&self, parent: Ref<P>)
    where
        P: Send + Sync + 'static,
    {
        if let Some(shared) = &self.shared {
            shared.parents.lock().push(Box::new(parent));
        }
    }

    /// Whether this handle still holds its payload.
    pub fn is_alive(&self) -> bool {
        self.shared.is_some()
    }

    /// The wrapped value, or `None` once this handle has been disposed.
    pub fn item(&self) -> Option<&T> {
        self.shared.as_ref().map(|shared| &shared.item)
    }

    /// Release this handle's hold on the payload. Idempotent: disposing
    /// twice is a no-op, and clones of this handle are unaffected.
    pub fn dispose(&mut self) {
        self.shared = None;
    }
}

impl<T> Clone for Ref<T> {
    /// An alive handle clones into a second counted hold on the same
    /// payload; a disposed handle clones into another disposed handle.
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("alive", &self.is_alive())
            .finish()
    }
}
