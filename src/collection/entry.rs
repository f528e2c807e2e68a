/// An owned copy of one key-value pair, taken when it was read.
///
/// It is detached from the collection it came from: later writes to the
/// collection do not show up here.
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct Entry<V> {
    key: String,
    value: V,
}

impl<V> Entry<V> {
    pub fn new(key: impl Into<String>, value: V) -> Self {
        Entry {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_parts(self) -> (String, V) {
        (self.key, self.value)
    }
}

impl<V> From<(String, V)> for Entry<V> {
    fn from((key, value): (String, V)) -> Self {
        Entry { key, value }
    }
}
