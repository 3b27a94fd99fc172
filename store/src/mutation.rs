//! Write vocabulary shared by every backend.

/// A single write against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Sets the given fields of the hash at `key`, leaving other fields untouched.
    HashSet {
        key: String,
        fields: Vec<(String, String)>,
    },
    /// Removes `key` whatever it holds.
    Delete { key: String },
    /// Sets a plain string value.
    Set { key: String, value: String },
    /// Adds `member` to the sorted set at `key`, or updates its score if already present.
    SortedAdd {
        key: String,
        score: i64,
        member: String,
    },
    /// Removes `member` from the sorted set at `key`.
    SortedRemove { key: String, member: String },
}

/// Ordered list of mutations applied as one atomic unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    mutations: Vec<Mutation>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) -> &mut Self {
        self.mutations.push(mutation);
        self
    }

    pub fn extend<I: IntoIterator<Item = Mutation>>(&mut self, mutations: I) -> &mut Self {
        self.mutations.extend(mutations);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }
}

impl FromIterator<Mutation> for WriteBatch {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        Self {
            mutations: iter.into_iter().collect(),
        }
    }
}
