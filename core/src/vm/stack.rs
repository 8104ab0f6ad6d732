use crate::Vec;

/// The VM operand stack.
///
/// Unbounded: the VM performs no depth limiting. Popping an empty stack
/// returns `None` and the caller turns that into a `StackUnderflow` error.
///
/// # Examples
///
/// ```ignore
/// let mut stack = Stack::new();
/// stack.push(42);
/// stack.push(17);
/// assert_eq!(stack.pop(), Some(17));
/// assert_eq!(stack.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Stack<T> {
    items: Vec<T>,
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Stack<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    /// Removes and returns the top value, or `None` if the stack is empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Pops the top two values as `(a, b)` where `b` was on top.
    ///
    /// Leaves the stack untouched if it holds fewer than two values.
    pub fn pop_pair(&mut self) -> Option<(T, T)> {
        if self.items.len() < 2 {
            return None;
        }
        let b = self.items.pop()?;
        let a = self.items.pop()?;
        Some((a, b))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Values from bottom to top.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}
