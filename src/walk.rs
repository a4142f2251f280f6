//! Depth-tracked, single-pass walk over raw JSON bytes.
//!
//! [`walk`] drives a [`serde_json`] deserializer through one JSON document
//! and invokes a visitor for every key/value pair encountered, in document
//! order, without materializing a tree. Alongside the raw value token the
//! visitor receives the nesting level and the dotted path from the document
//! root, reconstructed incrementally as the nesting changes.
//!
//! The walker knows nothing about Kubernetes; the dispatcher in
//! [`extract`](crate::extract) supplies all semantics.

use std::fmt;

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};

use crate::{Error, Result};

/// A single value token delivered to the walk visitor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Node<'a> {
    /// A nested JSON object begins at this key.
    ObjectBegin,
    /// A nested JSON array begins at this key.
    ArrayBegin,
    /// A JSON string, with escape sequences resolved.
    String(&'a str),
    /// Any other scalar (number, boolean or null), rendered as literal text.
    Literal(&'a str),
}

impl<'a> Node<'a> {
    /// The text of this token if it is a scalar, `None` for containers.
    pub fn as_scalar(&self) -> Option<&'a str> {
        match *self {
            Node::String(s) | Node::Literal(s) => Some(s),
            Node::ObjectBegin | Node::ArrayBegin => None,
        }
    }
}

/// A keyed value encountered during the walk.
#[derive(Clone, Copy, Debug)]
pub struct Event<'a> {
    /// Nesting depth. The document root is level 0, its keys are level 1.
    pub level: usize,
    /// Unescaped object key; empty for array elements and the document root.
    pub key: &'a str,
    /// Dot-joined path from the document root, e.g. `metadata.labels.app`.
    ///
    /// Array elements contribute an empty segment, so a field of the first
    /// owner reference reads `metadata.ownerReferences..name`.
    pub path: &'a str,
    /// The value token at this key.
    pub node: Node<'a>,
}

/// Walk one JSON document, invoking `visit` for every key/value encountered.
///
/// Returning `false` from the visitor skips the children of the value it was
/// just handed (when that value is an object or array) without aborting the
/// rest of the scan; siblings of the skipped subtree are still delivered.
///
/// The only failure mode is [`Error::MalformedInput`] on input that is not
/// well-formed JSON.
pub fn walk<F>(input: &[u8], visit: F) -> Result<()>
where
    F: FnMut(&Event<'_>) -> bool,
{
    let mut de = serde_json::Deserializer::from_slice(input);
    let mut state = WalkState {
        visit,
        path: PathBuffer::default(),
    };
    NodeSeed {
        state: &mut state,
        level: 0,
    }
    .deserialize(&mut de)
    .map_err(Error::MalformedInput)?;
    de.end().map_err(Error::MalformedInput)?;
    Ok(())
}

/// Reusable buffer of path components plus their cached dotted join.
///
/// `components[level - 1]` holds the key currently open at `level`. Setting a
/// component truncates everything at that level and deeper first, so the
/// buffer never carries stale segments from an already-closed sibling.
#[derive(Default)]
struct PathBuffer {
    components: Vec<String>,
    dotted: String,
}

impl PathBuffer {
    fn set(&mut self, level: usize, key: &str) {
        self.components.truncate(level);
        if self.components.len() < level {
            self.components.push(String::new());
        }
        let slot = &mut self.components[level - 1];
        slot.clear();
        slot.push_str(key);

        self.dotted.clear();
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                self.dotted.push('.');
            }
            self.dotted.push_str(component);
        }
    }
}

struct WalkState<F> {
    visit: F,
    path: PathBuffer,
}

impl<F> WalkState<F>
where
    F: FnMut(&Event<'_>) -> bool,
{
    fn emit(&mut self, level: usize, node: Node<'_>) -> bool {
        let key = level
            .checked_sub(1)
            .and_then(|i| self.path.components.get(i))
            .map_or("", String::as_str);
        (self.visit)(&Event {
            level,
            key,
            path: &self.path.dotted,
            node,
        })
    }
}

/// Seed deserializing one JSON value at a known nesting level.
///
/// Doubles as its own [`Visitor`]: scalars are emitted directly, containers
/// are emitted as begin markers and then recursed into (or drained with
/// [`de::IgnoredAny`] when the visitor declines to descend).
struct NodeSeed<'s, F> {
    state: &'s mut WalkState<F>,
    level: usize,
}

impl<'de, F> DeserializeSeed<'de> for NodeSeed<'_, F>
where
    F: FnMut(&Event<'_>) -> bool,
{
    type Value = ();

    fn deserialize<D>(self, deserializer: D) -> Result<(), D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, F> Visitor<'de> for NodeSeed<'_, F>
where
    F: FnMut(&Event<'_>) -> bool,
{
    type Value = ();

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<(), E> {
        self.state
            .emit(self.level, Node::Literal(if v { "true" } else { "false" }));
        Ok(())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<(), E> {
        let text = v.to_string();
        self.state.emit(self.level, Node::Literal(&text));
        Ok(())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<(), E> {
        let text = v.to_string();
        self.state.emit(self.level, Node::Literal(&text));
        Ok(())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<(), E> {
        let text = v.to_string();
        self.state.emit(self.level, Node::Literal(&text));
        Ok(())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<(), E> {
        self.state.emit(self.level, Node::String(v));
        Ok(())
    }

    fn visit_unit<E: de::Error>(self) -> Result<(), E> {
        self.state.emit(self.level, Node::Literal("null"));
        Ok(())
    }

    fn visit_map<A>(self, mut map: A) -> Result<(), A::Error>
    where
        A: MapAccess<'de>,
    {
        if !self.state.emit(self.level, Node::ObjectBegin) {
            while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
            return Ok(());
        }
        let state = self.state;
        let level = self.level + 1;
        while let Some(key) = map.next_key::<String>()? {
            state.path.set(level, &key);
            map.next_value_seed(NodeSeed {
                state: &mut *state,
                level,
            })?;
        }
        Ok(())
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<(), A::Error>
    where
        A: SeqAccess<'de>,
    {
        if !self.state.emit(self.level, Node::ArrayBegin) {
            while seq.next_element::<de::IgnoredAny>()?.is_some() {}
            return Ok(());
        }
        let state = self.state;
        let level = self.level + 1;
        loop {
            // array elements carry an empty path segment
            state.path.set(level, "");
            let element = seq.next_element_seed(NodeSeed {
                state: &mut *state,
                level,
            })?;
            if element.is_none() {
                break;
            }
        }
        Ok(())
    }
}
