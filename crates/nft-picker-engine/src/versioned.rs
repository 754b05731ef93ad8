//! Versioned values for change-driven recomputation
//!
//! A [`Versioned`] value carries a counter that moves only when the value
//! actually changes. Derived state remembers the versions it was computed
//! from and skips work when they have not moved.

/// A value paired with a change counter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Versioned<T> {
    value: T,
    version: u64,
}

impl<T: PartialEq> Versioned<T> {
    pub fn new(value: T) -> Self {
        Self { value, version: 0 }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Store `value` and bump the version, unless it equals the current value
    ///
    /// Returns whether the value changed.
    pub fn replace_if_changed(&mut self, value: T) -> bool {
        if self.value == value {
            return false;
        }
        self.value = value;
        self.version += 1;
        true
    }

    /// Store `value` and bump the version unconditionally
    pub fn replace(&mut self, value: T) {
        self.value = value;
        self.version += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_value_keeps_version() {
        let mut v = Versioned::new(vec![1, 2]);
        assert!(!v.replace_if_changed(vec![1, 2]));
        assert_eq!(v.version(), 0);

        assert!(v.replace_if_changed(vec![1]));
        assert_eq!(v.version(), 1);
        assert_eq!(v.get(), &vec![1]);
    }

    #[test]
    fn test_replace_always_bumps() {
        let mut v = Versioned::new(None::<String>);
        v.replace(None);
        assert_eq!(v.version(), 1);
    }
}
