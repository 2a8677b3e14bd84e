use crate::rbtree::{Color, RbTree};
use crate::Key;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{self, Formatter};

/// One node of a serialized tree. A tree serializes as its preorder sequence of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: Key,
    pub color: Color,
}

impl From<(Key, Color)> for Entry {
    fn from((key, color): (Key, Color)) -> Self {
        Self { key, color }
    }
}

impl Serialize for RbTree {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut s = serializer.serialize_seq(Some(self.len()))?;

        for entry in self.preorder() {
            s.serialize_element(&Entry::from(entry))?;
        }

        s.end()
    }
}

impl<'de> Deserialize<'de> for RbTree {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(TreeVisitor)
    }
}

struct TreeVisitor;

impl<'de> Visitor<'de> for TreeVisitor {
    type Value = RbTree;

    fn expecting(&self, formatter: &mut Formatter) -> fmt::Result {
        write!(formatter, "a preorder sequence of tree entries")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        // the length hint comes from the input, so it is not trusted for preallocation.
        let mut entries = Vec::new();

        while let Some(Entry { key, color }) = seq.next_element::<Entry>()? {
            entries.push((key, color));
        }

        RbTree::from_preorder(entries).map_err(de::Error::custom)
    }
}
