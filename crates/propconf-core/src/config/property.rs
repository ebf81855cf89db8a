//! Observable value holders.
//!
//! A [`Property`] wraps a value and notifies listeners when it changes.
//! [`ReadOnlyProperty`] is a view that can observe but not write, and
//! [`ListProperty`] holds an observable list.  Listeners run on the thread
//! that changed the value, after the internal lock has been released, so a
//! listener may read (or even write) the property again.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

type Listener<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

/// An observable value.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use propconf_core::config::Property;
///
/// let volume = Property::new(50u32);
/// let seen = Arc::new(AtomicU32::new(0));
/// let sink = Arc::clone(&seen);
/// volume.observe(move |_old, new| sink.store(*new, Ordering::SeqCst));
///
/// volume.set(80);
/// assert_eq!(seen.load(Ordering::SeqCst), 80);
/// ```
pub struct Property<T> {
    value: RwLock<T>,
    listeners: Mutex<Vec<Listener<T>>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Property<T> {
    pub fn new(value: T) -> Arc<Self> {
        Arc::new(Self {
            value: RwLock::new(value),
            listeners: Mutex::new(Vec::new()),
        })
    }

    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Stores `value` and notifies listeners if it differs from the current
    /// one.  Returns `true` when the value changed.
    pub fn set(&self, value: T) -> bool {
        let old = {
            let mut current = self.value.write();
            if *current == value {
                return false;
            }
            std::mem::replace(&mut *current, value.clone())
        };
        self.notify(&old, &value);
        true
    }

    /// Registers a listener called with `(old, new)` after every change.
    pub fn observe(&self, listener: impl Fn(&T, &T) + Send + Sync + 'static) {
        self.listeners.lock().push(Arc::new(listener));
    }

    /// A read-only view sharing this property.
    pub fn read_only(self: &Arc<Self>) -> ReadOnlyProperty<T> {
        ReadOnlyProperty {
            inner: Arc::clone(self),
        }
    }

    fn notify(&self, old: &T, new: &T) {
        let listeners: Vec<Listener<T>> = self.listeners.lock().clone();
        for listener in listeners {
            listener(old, new);
        }
    }
}

/// A view of a [`Property`] that cannot write it.
#[derive(Clone)]
pub struct ReadOnlyProperty<T> {
    inner: Arc<Property<T>>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> ReadOnlyProperty<T> {
    pub fn get(&self) -> T {
        self.inner.get()
    }

    pub fn observe(&self, listener: impl Fn(&T, &T) + Send + Sync + 'static) {
        self.inner.observe(listener);
    }
}

/// An observable list.  Listeners receive the whole list before and after
/// each change.
pub struct ListProperty<E> {
    inner: Arc<Property<Vec<E>>>,
}

impl<E: Clone + PartialEq + Send + Sync + 'static> ListProperty<E> {
    pub fn new(items: Vec<E>) -> Arc<Self> {
        Arc::new(Self {
            inner: Property::new(items),
        })
    }

    pub fn get(&self) -> Vec<E> {
        self.inner.get()
    }

    pub fn set_all(&self, items: Vec<E>) -> bool {
        self.inner.set(items)
    }

    pub fn push(&self, item: E) {
        let mut items = self.get();
        items.push(item);
        self.inner.set(items);
    }

    /// Removes every element equal to `item`.  Returns `true` if any was
    /// removed.
    pub fn remove(&self, item: &E) -> bool {
        let mut items = self.get();
        let before = items.len();
        items.retain(|e| e != item);
        before != items.len() && self.inner.set(items)
    }

    pub fn len(&self) -> usize {
        self.inner.value.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn observe(&self, listener: impl Fn(&Vec<E>, &Vec<E>) + Send + Sync + 'static) {
        self.inner.observe(listener);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_set_notifies_only_on_change() {
        // Arrange
        let property = Property::new("a".to_string());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        property.observe(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Act
        let first = property.set("b".to_string());
        let second = property.set("b".to_string());

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_receives_old_and_new() {
        let property = Property::new(1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        property.observe(move |old, new| sink.lock().push((*old, *new)));

        property.set(2);
        property.set(5);

        assert_eq!(*seen.lock(), vec![(1, 2), (2, 5)]);
    }

    #[test]
    fn test_listener_may_read_property_again() {
        let property = Property::new(0u8);
        let reader = Arc::clone(&property);
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        property.observe(move |_, _| *sink.lock() = Some(reader.get()));

        property.set(9);

        assert_eq!(*seen.lock(), Some(9));
    }

    #[test]
    fn test_read_only_view_follows_source() {
        let property = Property::new(3);
        let view = property.read_only();

        property.set(4);

        assert_eq!(view.get(), 4);
    }

    #[test]
    fn test_list_push_and_remove() {
        let list = ListProperty::new(vec!["a".to_string()]);

        list.push("b".to_string());
        list.push("a".to_string());
        let removed = list.remove(&"a".to_string());

        assert!(removed);
        assert_eq!(list.get(), vec!["b".to_string()]);
        assert_eq!(list.len(), 1);
        assert!(!list.remove(&"zzz".to_string()));
    }
}
