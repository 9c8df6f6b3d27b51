use std::cell::{Cell, UnsafeCell};
use std::fmt::{self, Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

/// Holds the cached value of a lazy property.
///
/// The slot starts out empty. Which thread may write it and when a reader may
/// look at it is decided by the written flag that accompanies every storage
/// field in generated code, which is why both accessors are `unsafe`.
pub struct Storage<T>(UnsafeCell<Option<T>>);

impl<T> Storage<T> {
    /// Create an empty slot.
    #[inline]
    pub const fn new() -> Self {
        Self(UnsafeCell::new(None))
    }

    /// Store a freshly computed value.
    ///
    /// If the slot already holds a value, the new one is dropped. A
    /// computation that reads its own property can thus never replace a value
    /// that has already been handed out.
    ///
    /// # Safety
    /// No other thread may access the slot during the call. In generated code
    /// this is guaranteed either by a `!Sync` [`Flag`] or by holding the
    /// property's [`Lock`].
    #[inline]
    pub unsafe fn put(&self, value: T) {
        let slot = self.0.get();
        // Safety: the caller guarantees exclusive access, and an empty slot
        // cannot have outstanding references to its contents.
        unsafe {
            if (*slot).is_none() {
                *slot = Some(value);
            }
        }
    }

    /// Read the stored value.
    ///
    /// # Safety
    /// The slot must have been written and the write must be visible to this
    /// thread, i.e. the written flag was observed as set.
    #[inline]
    pub unsafe fn get(&self) -> &T {
        // Safety: once written, the slot is never mutated again while shared.
        match unsafe { &*self.0.get() } {
            Some(value) => value,
            None => panic!("lazyprop: storage read before it was written"),
        }
    }
}

// Safety: all access to the inner cell follows the written-flag protocol, which
// publishes the value with release/acquire ordering on the thread-safe path.
unsafe impl<T: Send + Sync> Sync for Storage<T> {}

impl<T> Default for Storage<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for Storage<T> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad("Storage(..)")
    }
}

/// Marks whether a non-thread-safe property has been computed.
///
/// Not `Sync`, so a struct holding one cannot be shared across threads.
#[derive(Default)]
pub struct Flag(Cell<bool>);

impl Flag {
    /// Create an unset flag.
    #[inline]
    pub const fn new() -> Self {
        Self(Cell::new(false))
    }

    /// Whether the property has been computed.
    #[inline]
    pub fn get(&self) -> bool {
        self.0.get()
    }

    /// Mark the property as computed.
    #[inline]
    pub fn set(&self) {
        self.0.set(true);
    }
}

impl Debug for Flag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("Flag").field(&self.get()).finish()
    }
}

/// Marks whether a thread-safe property has been computed.
///
/// The flag is set with release ordering after the value was stored and read
/// with acquire ordering, so observing it as set also makes the stored value
/// visible.
#[derive(Default)]
pub struct AtomicFlag(AtomicBool);

impl AtomicFlag {
    /// Create an unset flag.
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Whether the property has been computed.
    #[inline]
    pub fn get(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Publish the stored value.
    #[inline]
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }
}

impl Debug for AtomicFlag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.debug_tuple("AtomicFlag").field(&self.get()).finish()
    }
}

/// The dedicated lock of a single thread-safe property.
///
/// Reentrant: a computation that reads its own property on the same thread
/// recurses instead of deadlocking. Unwinding releases the lock without
/// poisoning it.
#[derive(Default)]
pub struct Lock(ReentrantMutex<()>);

impl Lock {
    /// Create an unlocked lock.
    #[inline]
    pub const fn new() -> Self {
        Self(ReentrantMutex::new(()))
    }

    /// Acquire the lock until the guard is dropped.
    #[inline]
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.0.lock()
    }
}

impl Debug for Lock {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad("Lock(..)")
    }
}
