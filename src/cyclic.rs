//! Finite ordered list whose `next` wraps around.

#[derive(Debug, Clone, Copy)]
pub struct CyclicList<'a, T> {
    values: &'a [T],
}

impl<'a, T: PartialEq> CyclicList<'a, T> {
    pub const fn new(values: &'a [T]) -> Self {
        Self { values }
    }

    /// Value after `current`; the first value when `current` is last or absent
    pub fn next(&self, current: &T) -> Option<&'a T> {
        let position = self.values.iter().position(|v| v == current);
        match position {
            Some(i) if i + 1 < self.values.len() => self.values.get(i + 1),
            _ => self.values.first(),
        }
    }

    pub fn first(&self) -> Option<&'a T> {
        self.values.first()
    }

    pub fn values(&self) -> &'a [T] {
        self.values
    }
}
