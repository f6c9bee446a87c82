use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::{BuildHasher, Hash};

/// A state record whose fields can be read and written one key at a time.
///
/// This is the contract a [`Model`](crate::Model) needs from its state: a key
/// type naming the fields, a value type for their contents, and accessors.
/// Maps implement it out of the box; plain structs implement it by hand with
/// a key enum and a value enum.
///
/// # Examples
///
/// ```
/// use modelkit::ModelState;
///
/// #[derive(Clone)]
/// struct Counter {
///     count: i64,
/// }
///
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// enum Field {
///     Count,
/// }
///
/// impl ModelState for Counter {
///     type Key = Field;
///     type Value = i64;
///
///     fn field(&self, key: &Field) -> Option<i64> {
///         match key {
///             Field::Count => Some(self.count),
///         }
///     }
///
///     fn set_field(&mut self, key: Field, value: i64) {
///         match key {
///             Field::Count => self.count = value,
///         }
///     }
///
///     fn fields(&self) -> Vec<(Field, i64)> {
///         vec![(Field::Count, self.count)]
///     }
/// }
///
/// let mut counter = Counter { count: 1 };
/// counter.set_field(Field::Count, 2);
/// assert_eq!(counter.field(&Field::Count), Some(2));
/// ```
pub trait ModelState: Clone + 'static {
    type Key: Clone + Eq + Hash + Debug + 'static;
    type Value: Clone + PartialEq + 'static;

    /// Current value of a field, or `None` if the record has no such field.
    fn field(&self, key: &Self::Key) -> Option<Self::Value>;

    /// Replace a single field.
    fn set_field(&mut self, key: Self::Key, value: Self::Value);

    /// Every field currently present, as key/value pairs.
    fn fields(&self) -> Vec<(Self::Key, Self::Value)>;
}

impl<K, V, H> ModelState for HashMap<K, V, H>
where
    K: Clone + Eq + Hash + Debug + 'static,
    V: Clone + PartialEq + 'static,
    H: BuildHasher + Clone + 'static,
{
    type Key = K;
    type Value = V;

    fn field(&self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn set_field(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn fields(&self) -> Vec<(K, V)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

impl<K, V> ModelState for BTreeMap<K, V>
where
    K: Clone + Ord + Hash + Debug + 'static,
    V: Clone + PartialEq + 'static,
{
    type Key = K;
    type Value = V;

    fn field(&self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn set_field(&mut self, key: K, value: V) {
        self.insert(key, value);
    }

    fn fields(&self) -> Vec<(K, V)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn btree_fields_in_key_order() {
        let mut state = BTreeMap::from([("b", 2), ("a", 1)]);
        state.set_field("c", 3);
        assert_eq!(state.fields(), vec![("a", 1), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn undeclared_field_reads_none() {
        let state: HashMap<&str, i32> = HashMap::from([("count", 0)]);
        assert_eq!(state.field(&"count"), Some(0));
        assert_eq!(state.field(&"missing"), None);
    }
}
