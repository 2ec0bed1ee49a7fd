//! Hand-off cell for moving a value into interrupt context.
//!
//! The foreground code builds a value, installs it once into a static
//! [`IrqCell`] and, from then on, leaves it alone. The interrupt handler
//! borrows it with [`IrqCell::lock`] every time it runs. Borrowing never
//! spins: on a single core, a handler spinning on a lock held by the code it
//! preempted would never return.

#![no_std]

use core::cell::UnsafeCell;
use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicU8, Ordering};

/// Nothing has been installed.
const EMPTY: u8 = 0;

/// A value is being moved in or out.
const MOVING: u8 = 1;

/// A value is installed and nobody borrows it.
const READY: u8 = 2;

/// A value is installed and borrowed through an [`IrqCellGuard`].
const BORROWED: u8 = 3;

/// A cell holding at most one value, shared between the foreground and an
/// interrupt handler.
pub struct IrqCell<T> {
    /// One of [`EMPTY`], [`MOVING`], [`READY`] or [`BORROWED`].
    state: AtomicU8,

    /// Protected data.
    data: UnsafeCell<Option<T>>,
}

/// An RAII borrow of the value stored in an [`IrqCell`]. When this structure
/// is dropped, the value becomes available again.
///
/// This structure is created by the [`IrqCell::lock`] method.
pub struct IrqCellGuard<'a, T> {
    /// State of the cell that created this guard.
    state: &'a AtomicU8,

    /// Borrowed value.
    data: &'a mut T,
}

impl<T> IrqCell<T> {
    /// Returns a new empty [`IrqCell`].
    pub const fn new() -> IrqCell<T> {
        IrqCell {
            state: AtomicU8::new(EMPTY),
            data: UnsafeCell::new(None),
        }
    }

    /// Moves `value` into the cell. If the cell is not empty, the value is
    /// handed back.
    pub fn install(&self, value: T) -> Result<(), T> {
        if self
            .state
            .compare_exchange(EMPTY, MOVING, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(value);
        }

        unsafe { *self.data.get() = Some(value) };
        self.state.store(READY, Ordering::Release);

        Ok(())
    }

    /// Moves the value out of the cell, leaving it empty. Returns `None` if
    /// the cell is empty or the value is currently borrowed.
    pub fn take(&self) -> Option<T> {
        self.state
            .compare_exchange(READY, MOVING, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;

        let value = unsafe { (*self.data.get()).take() };
        self.state.store(EMPTY, Ordering::Release);

        value
    }

    /// Borrows the installed value. Returns `None` if the cell is empty or
    /// the value is already borrowed.
    pub fn lock(&self) -> Option<IrqCellGuard<'_, T>> {
        self.state
            .compare_exchange(READY, BORROWED, Ordering::Acquire, Ordering::Relaxed)
            .ok()?;

        match unsafe { (*self.data.get()).as_mut() } {
            Some(data) => Some(IrqCellGuard {
                state: &self.state,
                data,
            }),
            None => {
                self.state.store(EMPTY, Ordering::Release);
                None
            }
        }
    }

    /// Returns true if a value is installed, borrowed or not.
    pub fn is_installed(&self) -> bool {
        matches!(self.state.load(Ordering::Acquire), READY | BORROWED)
    }
}

impl<T> Default for IrqCell<T> {
    fn default() -> IrqCell<T> {
        IrqCell::new()
    }
}

unsafe impl<T: Send> Send for IrqCell<T> {}
unsafe impl<T: Send> Sync for IrqCell<T> {}

impl<T> Deref for IrqCellGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.data
    }
}

impl<T> DerefMut for IrqCellGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.data
    }
}

impl<T> Drop for IrqCellGuard<'_, T> {
    fn drop(&mut self) {
        self.state.store(READY, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_and_lock() {
        let cell = IrqCell::new();
        assert!(!cell.is_installed());
        assert!(cell.install(0).is_ok());
        assert!(cell.is_installed());

        let mut x = cell.lock().unwrap();
        *x += 1;
        drop(x);

        let mut x = cell.lock().unwrap();
        *x += 1;
        drop(x);

        let x = cell.lock().unwrap();
        assert_eq!(*x, 2);
    }

    #[test]
    fn empty_cell() {
        let cell: IrqCell<u32> = IrqCell::new();
        assert!(cell.lock().is_none());
        assert!(cell.take().is_none());
    }

    #[test]
    fn second_install_is_rejected() {
        let cell = IrqCell::new();
        assert!(cell.install(1).is_ok());
        assert_eq!(cell.install(2), Err(2));
        assert_eq!(*cell.lock().unwrap(), 1);
    }

    #[test]
    fn lock_is_exclusive() {
        let cell = IrqCell::new();
        cell.install(7).unwrap();

        let guard = cell.lock().unwrap();
        assert!(cell.lock().is_none());
        assert!(cell.take().is_none());
        assert!(cell.is_installed());
        drop(guard);

        assert!(cell.lock().is_some());
    }

    #[test]
    fn take_empties_the_cell() {
        let cell = IrqCell::new();
        cell.install(3).unwrap();
        assert_eq!(cell.take(), Some(3));
        assert!(!cell.is_installed());
        assert!(cell.install(4).is_ok());
        assert_eq!(*cell.lock().unwrap(), 4);
    }
}
