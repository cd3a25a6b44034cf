//! Ordered node sequence.

use std::ops::{Deref, DerefMut};

use docnode_common::{BinaryReader, BinaryWriter, INT_FIELD_SIZE};
use tracing::{debug, trace};

use crate::header::NodeHeader;
use crate::node::{read_count, Nodes};
use crate::{DecodeLimits, Node, Result};

/// An ordered sequence of nodes.
///
/// Used both as a node's child collection and as the top-level container of
/// a packed tree. Encoded as `count:i32` followed by each node in order.
///
/// # Example
///
/// ```
/// use docnode::{Node, NodeList, NodeType};
///
/// let list: NodeList = [
///     Node::new(NodeType::Pre).with_data(&b"<html>"[..]),
///     Node::new(NodeType::Include).attr(&b"src"[..], &b"/header"[..]),
/// ]
/// .into_iter()
/// .collect();
///
/// let bytes = list.to_bytes();
/// let decoded = NodeList::unpack(&bytes)?;
/// assert_eq!(decoded, list);
/// # Ok::<(), docnode::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeList<'a>(Vec<Node<'a>>);

impl<'a> NodeList<'a> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a node.
    pub fn push(&mut self, node: Node<'a>) {
        self.0.push(node);
    }

    /// Remove all nodes.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Consume the list, returning the nodes.
    pub fn into_vec(self) -> Vec<Node<'a>> {
        self.0
    }

    /// Iterate over every node in the list and all descendants, pre-order.
    pub fn walk(&self) -> Nodes<'_, 'a> {
        Nodes {
            stack: self.0.iter().rev().collect(),
        }
    }

    /// Total number of nodes in the list, including descendants.
    pub fn count(&self) -> usize {
        self.0.iter().map(Node::count).sum()
    }

    /// Number of levels below this list, 0 when empty.
    pub fn depth(&self) -> usize {
        self.0.iter().map(Node::depth).max().unwrap_or(0)
    }

    /// Exact number of bytes [`pack_to_buffer`](Self::pack_to_buffer) will append.
    pub fn packed_len(&self) -> usize {
        INT_FIELD_SIZE + self.0.iter().map(Node::packed_len).sum::<usize>()
    }

    /// Append the encoded list to `buffer`.
    ///
    /// # Panics
    ///
    /// Panics if any node is larger than `i32::MAX` bytes.
    pub fn pack_to_buffer(&self, buffer: &mut Vec<u8>) {
        let mut writer = BinaryWriter::new(buffer);
        self.write_to(&mut writer);
    }

    /// Encode the list into a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.packed_len());
        self.pack_to_buffer(&mut bytes);
        bytes
    }

    pub(crate) fn write_to(&self, writer: &mut BinaryWriter<'_>) {
        writer.write_len(self.0.len());
        for node in &self.0 {
            node.write_to(writer);
        }
    }

    /// Decode a list from the start of `data` with default limits.
    ///
    /// Bytes after the list are ignored. Any failure voids the whole decode.
    pub fn unpack(data: &'a [u8]) -> Result<Self> {
        Self::unpack_prefix(data).map(|(list, _)| list)
    }

    /// Decode a list and report how many bytes it occupied.
    pub fn unpack_prefix(data: &'a [u8]) -> Result<(Self, usize)> {
        Self::unpack_with(data, &DecodeLimits::default())
    }

    /// Decode a list with explicit limits, reporting the bytes consumed.
    pub fn unpack_with(data: &'a [u8], limits: &DecodeLimits) -> Result<(Self, usize)> {
        let (list, consumed) = Self::decode(data, limits, 0)?;
        trace!(nodes = list.len(), consumed, "unpacked node list");
        Ok((list, consumed))
    }

    pub(crate) fn decode(
        data: &'a [u8],
        limits: &DecodeLimits,
        depth: usize,
    ) -> Result<(Self, usize)> {
        let mut reader = BinaryReader::new(data);
        let count = read_count(&mut reader)?;

        let mut nodes =
            Vec::with_capacity(count.min(reader.remaining() / NodeHeader::MIN_NODE_LEN));
        for index in 0..count {
            let (node, len) = Node::decode(reader.remaining_bytes(), limits, depth)
                .inspect_err(|_| debug!(index, count, depth, "could not unpack list element"))?;
            reader.skip(len)?;
            nodes.push(node);
        }

        Ok((Self(nodes), reader.position()))
    }

    /// Copy all borrowed bytes so the list no longer depends on its source buffer.
    pub fn into_owned(self) -> NodeList<'static> {
        NodeList(self.0.into_iter().map(Node::into_owned).collect())
    }
}

impl<'a> Deref for NodeList<'a> {
    type Target = [Node<'a>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for NodeList<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> From<Vec<Node<'a>>> for NodeList<'a> {
    fn from(nodes: Vec<Node<'a>>) -> Self {
        Self(nodes)
    }
}

impl<'a> FromIterator<Node<'a>> for NodeList<'a> {
    fn from_iter<I: IntoIterator<Item = Node<'a>>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> Extend<Node<'a>> for NodeList<'a> {
    fn extend<I: IntoIterator<Item = Node<'a>>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for NodeList<'a> {
    type Item = Node<'a>;
    type IntoIter = std::vec::IntoIter<Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'l, 'a> IntoIterator for &'l NodeList<'a> {
    type Item = &'l Node<'a>;
    type IntoIter = std::slice::Iter<'l, Node<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ErrorKind, NodeType};

    fn siblings() -> NodeList<'static> {
        (0..5)
            .map(|i| {
                Node::new(NodeType::from_raw(i))
                    .with_data(format!("node-{i}").into_bytes())
                    .attr(&b"index"[..], i.to_string().into_bytes())
            })
            .collect()
    }

    #[test]
    fn test_empty_list() {
        let bytes = NodeList::new().to_bytes();
        assert_eq!(bytes, [0, 0, 0, 0]);

        let (decoded, len) = NodeList::unpack_prefix(&bytes).unwrap();
        assert!(decoded.is_empty());
        assert_eq!(len, 4);
    }

    #[test]
    fn test_sibling_order_preserved() {
        let list = siblings();
        let bytes = list.to_bytes();
        let decoded = NodeList::unpack(&bytes).unwrap();

        assert_eq!(decoded.len(), 5);
        for (i, node) in decoded.iter().enumerate() {
            assert_eq!(node.node_type().raw(), i as i32);
            assert_eq!(node.data(), format!("node-{i}").as_bytes());
        }
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_consumed_length() {
        let list = siblings();
        let mut bytes = list.to_bytes();
        let packed = bytes.len();
        assert_eq!(list.packed_len(), packed);

        bytes.extend_from_slice(&[0xFF; 16]);
        let (_, consumed) = NodeList::unpack_prefix(&bytes).unwrap();
        assert_eq!(consumed, packed);
    }

    #[test]
    fn test_pack_appends() {
        let list = siblings();
        let mut buffer = b"prefix".to_vec();
        list.pack_to_buffer(&mut buffer);

        assert_eq!(&buffer[..6], b"prefix");
        assert_eq!(NodeList::unpack(&buffer[6..]).unwrap(), list);
    }

    #[test]
    fn test_too_short_for_count() {
        let err = NodeList::unpack(&[1, 0]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_count_exceeds_nodes() {
        let mut bytes = siblings().to_bytes();
        bytes[..4].copy_from_slice(&6i32.to_le_bytes());

        assert_eq!(
            NodeList::unpack(&bytes).unwrap_err(),
            Error::HeaderTooShort { available: 0 }
        );
    }

    #[test]
    fn test_negative_count() {
        let bytes = (-2i32).to_le_bytes();
        assert_eq!(NodeList::unpack(&bytes).unwrap_err(), Error::NegativeCount(-2));
    }

    #[test]
    fn test_every_prefix_fails() {
        let list: NodeList = [
            Node::new(NodeType::Choose)
                .child(Node::new(NodeType::When).attr(&b"test"[..], &b"1"[..]))
                .child(Node::new(NodeType::Otherwise)),
            Node::new(NodeType::HtmlComment).with_data(&b"<!--x-->"[..]),
        ]
        .into_iter()
        .collect();
        let bytes = list.to_bytes();

        for cut in 0..bytes.len() {
            assert!(NodeList::unpack(&bytes[..cut]).is_err(), "prefix of {cut} bytes decoded");
        }
        assert!(NodeList::unpack(&bytes).is_ok());
    }

    #[test]
    fn test_walk_and_counts() {
        let list: NodeList = [
            Node::new(NodeType::Try).child(Node::new(NodeType::Attempt)),
            Node::new(NodeType::Pre),
        ]
        .into_iter()
        .collect();

        let types: Vec<_> = list.walk().map(Node::node_type).collect();
        assert_eq!(types, [NodeType::Try, NodeType::Attempt, NodeType::Pre]);
        assert_eq!(list.count(), 3);
        assert_eq!(list.depth(), 2);
        assert_eq!(NodeList::new().depth(), 0);
    }
}
