/// Storage for a value in flight between a writer and a reader.
///
/// A store holds at most one value: `put` fills it, `get` empties it. The
/// runtime never inspects the payload, so a store may move values as-is or
/// map them to an opaque representation (for example bytes) when they cross
/// an isolation boundary.
pub trait Store<T>: Send {
  /// Places `item` in the store.
  ///
  /// Returns the item back if the store is already full.
  fn put(&mut self, item: T) -> Result<(), T>;

  /// Removes and returns the stored item, if any.
  fn get(&mut self) -> Option<T>;

  /// Returns `true` if the store currently holds an item.
  fn is_full(&self) -> bool;
}

/// The default in-memory store: moves values through without copying.
#[derive(Debug)]
pub struct Slot<T> {
  item: Option<T>,
}

impl<T> Slot<T> {
  /// Creates a new, empty slot.
  #[inline]
  pub const fn new() -> Self {
    Self { item: None }
  }
}

impl<T> Default for Slot<T> {
  #[inline]
  fn default() -> Self {
    Self::new()
  }
}

impl<T> Store<T> for Slot<T>
where
  T: Send,
{
  #[inline]
  fn put(&mut self, item: T) -> Result<(), T> {
    if self.item.is_some() {
      return Err(item);
    }

    self.item = Some(item);
    Ok(())
  }

  #[inline]
  fn get(&mut self) -> Option<T> {
    self.item.take()
  }

  #[inline]
  fn is_full(&self) -> bool {
    self.item.is_some()
  }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
