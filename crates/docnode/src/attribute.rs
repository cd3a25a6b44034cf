//! Node attribute.

use std::borrow::Cow;

/// A name/value pair of byte strings attached to a node.
///
/// Names are not validated and duplicates are allowed. Attributes decoded
/// from a buffer borrow their bytes from it; [`into_owned`](Self::into_owned)
/// detaches them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Attribute<'a> {
    name: Cow<'a, [u8]>,
    value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    /// Create an attribute from borrowed or owned bytes.
    pub fn new(name: impl Into<Cow<'a, [u8]>>, value: impl Into<Cow<'a, [u8]>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute name bytes.
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Attribute value bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Name as text, replacing invalid UTF-8.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Value as text, replacing invalid UTF-8.
    pub fn value_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    /// Encoded size: two length prefixes plus both payloads.
    pub(crate) fn packed_len(&self) -> usize {
        2 * docnode_common::INT_FIELD_SIZE + self.name.len() + self.value.len()
    }

    /// Copy any borrowed bytes so the attribute no longer depends on its source buffer.
    pub fn into_owned(self) -> Attribute<'static> {
        Attribute {
            name: Cow::Owned(self.name.into_owned()),
            value: Cow::Owned(self.value.into_owned()),
        }
    }
}

impl<'a, N, V> From<(N, V)> for Attribute<'a>
where
    N: Into<Cow<'a, [u8]>>,
    V: Into<Cow<'a, [u8]>>,
{
    fn from((name, value): (N, V)) -> Self {
        Self::new(name, value)
    }
}
