//! Fragment tree node and its binary encoding.
//!
//! # Encoding
//!
//! ```text
//! Node     := version:u8 total_len:i32 type:i32 data:LPString
//!             attr_count:i32 (name:LPString value:LPString){attr_count}
//!             children:NodeList
//! LPString := len:i32 bytes{len}
//! ```
//!
//! Integers are little-endian. `total_len` counts every byte of the node
//! including its descendants, so a reader can step over a whole subtree
//! without looking inside it.

use std::borrow::Cow;

use docnode_common::{BinaryReader, BinaryWriter, INT_FIELD_SIZE};
use tracing::debug;

use crate::header::{NodeHeader, VERSION};
use crate::{Attribute, DecodeLimits, Error, NodeList, NodeType, Result};

/// A node in a markup fragment tree.
///
/// A node has a type tag, an opaque data payload, an ordered attribute list
/// and an ordered list of children it owns exclusively.
///
/// Nodes produced by [`Node::unpack`] borrow their data and attribute bytes
/// from the input buffer, so they cannot outlive it. Call
/// [`into_owned`](Self::into_owned) to detach a decoded tree.
///
/// # Example
///
/// ```
/// use docnode::{Node, NodeType};
///
/// let node = Node::new(NodeType::Include)
///     .with_data(&b"http://x"[..])
///     .attr(&b"src"[..], &b"http://x"[..]);
///
/// let bytes = node.to_bytes();
/// let (decoded, len) = Node::unpack(&bytes)?;
///
/// assert_eq!(len, bytes.len());
/// assert_eq!(decoded, node);
/// # Ok::<(), docnode::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node<'a> {
    node_type: NodeType,
    data: Cow<'a, [u8]>,
    attributes: Vec<Attribute<'a>>,
    children: NodeList<'a>,
}

impl<'a> Node<'a> {
    /// Create an empty node of the given type.
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            ..Self::default()
        }
    }

    /// Set the data payload.
    pub fn with_data(mut self, data: impl Into<Cow<'a, [u8]>>) -> Self {
        self.data = data.into();
        self
    }

    /// Append an attribute.
    pub fn attr(
        mut self,
        name: impl Into<Cow<'a, [u8]>>,
        value: impl Into<Cow<'a, [u8]>>,
    ) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    /// Append a child node.
    pub fn child(mut self, child: Node<'a>) -> Self {
        self.children.push(child);
        self
    }

    /// Append several child nodes.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node<'a>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Get the type tag.
    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    /// Set the type tag.
    pub fn set_node_type(&mut self, node_type: NodeType) {
        self.node_type = node_type;
    }

    /// Get the data payload. Empty when absent.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Replace the data payload.
    pub fn set_data(&mut self, data: impl Into<Cow<'a, [u8]>>) {
        self.data = data.into();
    }

    /// Get the attributes in order.
    pub fn attributes(&self) -> &[Attribute<'a>] {
        &self.attributes
    }

    /// Get mutable access to the attributes.
    pub fn attributes_mut(&mut self) -> &mut Vec<Attribute<'a>> {
        &mut self.attributes
    }

    /// Value of the first attribute called `name`.
    pub fn find_attr(&self, name: &[u8]) -> Option<&[u8]> {
        self.attributes
            .iter()
            .find(|a| a.name() == name)
            .map(|a| a.value())
    }

    /// Get the child nodes.
    pub fn children(&self) -> &NodeList<'a> {
        &self.children
    }

    /// Get mutable access to the child nodes.
    pub fn children_mut(&mut self) -> &mut NodeList<'a> {
        &mut self.children
    }

    /// Add a child node.
    pub fn add_child(&mut self, child: Node<'a>) {
        self.children.push(child);
    }

    /// Check if this node has any children.
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Total number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.count()
    }

    /// Number of levels in this subtree, 1 for a leaf.
    pub fn depth(&self) -> usize {
        1 + self.children.depth()
    }

    /// Iterate over this node and all descendants in pre-order.
    pub fn iter(&self) -> Nodes<'_, 'a> {
        Nodes { stack: vec![self] }
    }

    /// Exact number of bytes [`pack`](Self::pack) will append.
    pub fn packed_len(&self) -> usize {
        NodeHeader::SIZE
            + INT_FIELD_SIZE
            + self.data.len()
            + INT_FIELD_SIZE
            + self.attributes.iter().map(Attribute::packed_len).sum::<usize>()
            + self.children.packed_len()
    }

    /// Append the encoded node to `buffer`.
    ///
    /// # Panics
    ///
    /// Panics if the node, or any byte string in it, is larger than
    /// `i32::MAX` bytes.
    pub fn pack(&self, buffer: &mut Vec<u8>) {
        let mut writer = BinaryWriter::new(buffer);
        self.write_to(&mut writer);
    }

    /// Encode the node into a new buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.packed_len());
        self.pack(&mut bytes);
        bytes
    }

    pub(crate) fn write_to(&self, writer: &mut BinaryWriter<'_>) {
        let start = writer.position();
        writer.write_u8(VERSION);
        let total_len = writer.reserve_i32();
        writer.write_i32(self.node_type.raw());
        writer.write_lp_bytes(&self.data);

        writer.write_len(self.attributes.len());
        for attr in &self.attributes {
            writer.write_lp_bytes(attr.name());
            writer.write_lp_bytes(attr.value());
        }

        self.children.write_to(writer);
        writer.patch_len_since(total_len, start);
    }

    /// Decode one node from the start of `data` with default limits.
    ///
    /// Returns the node and the number of bytes it occupies, which always
    /// equals its declared length. Bytes after the node are ignored.
    pub fn unpack(data: &'a [u8]) -> Result<(Self, usize)> {
        Self::unpack_with(data, &DecodeLimits::default())
    }

    /// Decode one node from the start of `data` with explicit limits.
    pub fn unpack_with(data: &'a [u8], limits: &DecodeLimits) -> Result<(Self, usize)> {
        Self::decode(data, limits, 0)
    }

    pub(crate) fn decode(
        data: &'a [u8],
        limits: &DecodeLimits,
        depth: usize,
    ) -> Result<(Self, usize)> {
        if depth >= limits.max_depth {
            debug!(depth, limit = limits.max_depth, "node nesting too deep");
            return Err(Error::DepthExceeded {
                limit: limits.max_depth,
            });
        }

        let header = NodeHeader::peek(data)?;
        let total_len = header.total_len();

        Self::decode_body(header, &data[..total_len], limits, depth)
            .map(|node| (node, total_len))
            .inspect_err(|e| {
                debug!(node_type = %header.node_type(), depth, error = %e, "could not unpack node");
            })
    }

    fn decode_body(
        header: NodeHeader,
        body: &'a [u8],
        limits: &DecodeLimits,
        depth: usize,
    ) -> Result<Self> {
        let mut reader = BinaryReader::new(body);
        reader.skip(NodeHeader::SIZE)?;

        let data = reader.read_lp_bytes()?;

        let attr_count = read_count(&mut reader)?;
        let mut attributes =
            Vec::with_capacity(attr_count.min(reader.remaining() / (2 * INT_FIELD_SIZE)));
        for _ in 0..attr_count {
            let name = reader.read_lp_bytes()?;
            let value = reader.read_lp_bytes()?;
            attributes.push(Attribute::new(name, value));
        }

        let (children, children_len) =
            NodeList::decode(reader.remaining_bytes(), limits, depth + 1)?;

        let consumed = reader.position() + children_len;
        if consumed != body.len() {
            return Err(Error::LengthMismatch {
                declared: body.len(),
                consumed,
            });
        }

        Ok(Self {
            node_type: header.node_type(),
            data: Cow::Borrowed(data),
            attributes,
            children,
        })
    }

    /// Copy all borrowed bytes so the tree no longer depends on its source buffer.
    pub fn into_owned(self) -> Node<'static> {
        Node {
            node_type: self.node_type,
            data: Cow::Owned(self.data.into_owned()),
            attributes: self
                .attributes
                .into_iter()
                .map(Attribute::into_owned)
                .collect(),
            children: self.children.into_owned(),
        }
    }
}

/// Read an element count, rejecting negative values.
pub(crate) fn read_count(reader: &mut BinaryReader<'_>) -> Result<usize> {
    let count = reader.read_i32()?;
    usize::try_from(count).map_err(|_| {
        debug!(count, "negative element count");
        Error::NegativeCount(count)
    })
}

/// Pre-order iterator over a node tree.
pub struct Nodes<'n, 'a> {
    pub(crate) stack: Vec<&'n Node<'a>>,
}

impl<'n, 'a> Iterator for Nodes<'n, 'a> {
    type Item = &'n Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push children in reverse order so they're visited left-to-right
        for child in node.children.iter().rev() {
            self.stack.push(child);
        }
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    fn sample_tree() -> Node<'static> {
        Node::new(NodeType::Try)
            .attr(&b"id"[..], &b"outer"[..])
            .child(
                Node::new(NodeType::Attempt).child(
                    Node::new(NodeType::Include)
                        .with_data(&b"http://a/b"[..])
                        .attr(&b"src"[..], &b"http://a/b"[..])
                        .attr(&b"alt"[..], &b""[..])
                        .attr(&b"src"[..], &b"dup"[..]),
                ),
            )
            .child(
                Node::new(NodeType::Except)
                    .child(Node::new(NodeType::Pre).with_data(&b"<p>fallback</p>"[..]))
                    .child(Node::new(NodeType::Other(42)).with_data(vec![0u8, 1, 2, 255])),
            )
    }

    #[test]
    fn test_include_scenario() {
        let node = Node::new(NodeType::Include)
            .with_data(&b"http://x"[..])
            .attr(&b"src"[..], &b"http://x"[..]);

        let bytes = node.to_bytes();
        let (decoded, len) = Node::unpack(&bytes).unwrap();

        assert_eq!(len, bytes.len());
        assert_eq!(decoded.node_type(), NodeType::Include);
        assert_eq!(decoded.node_type().raw(), 2);
        assert_eq!(decoded.data(), b"http://x");
        assert_eq!(decoded.attributes().len(), 1);
        assert_eq!(decoded.attributes()[0].name(), b"src");
        assert_eq!(decoded.attributes()[0].value(), b"http://x");
        assert_eq!(decoded.children().len(), 0);
    }

    #[test]
    fn test_choose_scenario() {
        let node = Node::new(NodeType::Choose)
            .child(Node::new(NodeType::When).attr(&b"test"[..], &b"$(x)"[..]))
            .child(Node::new(NodeType::Otherwise).with_data(&b"else"[..]));

        let bytes = node.to_bytes();
        let (decoded, _) = Node::unpack(&bytes).unwrap();

        assert_eq!(decoded.node_type(), NodeType::Choose);
        assert!(decoded.data().is_empty());
        assert!(decoded.attributes().is_empty());
        assert_eq!(decoded.children().len(), 2);
        assert_eq!(decoded.children()[0].node_type(), NodeType::When);
        assert_eq!(decoded.children()[1].node_type(), NodeType::Otherwise);
        assert_eq!(decoded, node);
    }

    #[test]
    fn test_truncated_by_one_byte_fails() {
        let bytes = Node::new(NodeType::Include)
            .with_data(&b"http://x"[..])
            .to_bytes();

        let result = Node::unpack(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(Error::SizeOverflow { .. })));
    }

    #[test]
    fn test_round_trip_tree() {
        let tree = sample_tree();
        let bytes = tree.to_bytes();
        let (decoded, len) = Node::unpack(&bytes).unwrap();

        assert_eq!(len, bytes.len());
        assert_eq!(decoded, tree);
        assert_eq!(decoded.find_attr(b"src"), None);
        let include = &decoded.children()[0].children()[0];
        assert_eq!(include.find_attr(b"src"), Some(&b"http://a/b"[..]));
        assert_eq!(include.attributes()[2].value(), b"dup");
        assert_eq!(decoded.children()[1].children()[1].node_type(), NodeType::Other(42));
    }

    #[test]
    fn test_packed_len_matches_header() {
        let tree = sample_tree();
        let bytes = tree.to_bytes();

        assert_eq!(tree.packed_len(), bytes.len());
        let header = NodeHeader::peek(&bytes).unwrap();
        assert_eq!(header.total_len(), bytes.len());

        // Every subtree's declared length equals its own encoded size
        for node in tree.iter() {
            let sub = node.to_bytes();
            let (_, len) = Node::unpack(&sub).unwrap();
            assert_eq!(len, sub.len());
            assert_eq!(NodeHeader::peek(&sub).unwrap().total_len(), node.packed_len());
        }
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let mut bytes = Node::new(NodeType::Vars).with_data(&b"$(a)"[..]).to_bytes();
        let node_len = bytes.len();
        bytes.extend_from_slice(b"garbage");

        let (decoded, len) = Node::unpack(&bytes).unwrap();
        assert_eq!(len, node_len);
        assert_eq!(decoded.data(), b"$(a)");
    }

    #[test]
    fn test_every_prefix_fails() {
        let bytes = sample_tree().to_bytes();

        for cut in 0..bytes.len() {
            assert!(Node::unpack(&bytes[..cut]).is_err(), "prefix of {cut} bytes decoded");
        }
    }

    #[test]
    fn test_version_gate() {
        let mut bytes = sample_tree().to_bytes();

        for version in (0..=u8::MAX).filter(|v| *v != VERSION) {
            bytes[0] = version;
            let err = Node::unpack(&bytes).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::VersionMismatch);
        }
    }

    #[test]
    fn test_nested_version_gate() {
        let tree = Node::new(NodeType::Choose).child(Node::new(NodeType::When));
        let mut bytes = tree.to_bytes();
        // Outer fixed fields: header, empty data, zero attrs, child count
        let child_offset = NodeHeader::SIZE + 3 * INT_FIELD_SIZE;
        assert_eq!(bytes[child_offset], VERSION);
        bytes[child_offset] = 9;

        assert_eq!(
            Node::unpack(&bytes).unwrap_err(),
            Error::VersionMismatch { found: 9, expected: VERSION }
        );
    }

    #[test]
    fn test_declared_length_too_large() {
        let mut bytes = Node::new(NodeType::Pre).to_bytes();
        let declared = bytes.len() as i32 + 4;
        bytes[1..5].copy_from_slice(&declared.to_le_bytes());
        bytes.extend_from_slice(&[0; 4]);

        assert_eq!(
            Node::unpack(&bytes).unwrap_err(),
            Error::LengthMismatch { declared: declared as usize, consumed: declared as usize - 4 }
        );
    }

    #[test]
    fn test_negative_attribute_count() {
        let mut bytes = Node::new(NodeType::Pre).to_bytes();
        let count_offset = NodeHeader::SIZE + INT_FIELD_SIZE;
        bytes[count_offset..count_offset + 4].copy_from_slice(&(-1i32).to_le_bytes());

        assert_eq!(Node::unpack(&bytes).unwrap_err(), Error::NegativeCount(-1));
    }

    #[test]
    fn test_huge_attribute_count_fails_cleanly() {
        let mut bytes = Node::new(NodeType::Pre).to_bytes();
        let count_offset = NodeHeader::SIZE + INT_FIELD_SIZE;
        bytes[count_offset..count_offset + 4].copy_from_slice(&i32::MAX.to_le_bytes());

        assert_eq!(Node::unpack(&bytes).unwrap_err().kind(), ErrorKind::MalformedInput);
    }

    #[test]
    fn test_zero_length_data_has_no_payload() {
        let empty = Node::new(NodeType::Comment).to_bytes();
        assert_eq!(empty.len(), NodeHeader::MIN_NODE_LEN);

        let (decoded, _) = Node::unpack(&empty).unwrap();
        assert!(decoded.data().is_empty());
    }

    #[test]
    fn test_deep_nesting() {
        let mut node = Node::new(NodeType::Pre).with_data(&b"leaf"[..]);
        for _ in 0..200 {
            node = Node::new(NodeType::Try).child(node);
        }

        let bytes = node.to_bytes();
        let (decoded, _) = Node::unpack(&bytes).unwrap();
        assert_eq!(decoded.depth(), 201);
        assert_eq!(decoded, node);
    }

    #[test]
    fn test_depth_limit() {
        let node = Node::new(NodeType::Try)
            .child(Node::new(NodeType::Attempt).child(Node::new(NodeType::Pre)));
        let bytes = node.to_bytes();

        assert!(Node::unpack_with(&bytes, &DecodeLimits::with_max_depth(3)).is_ok());
        assert_eq!(
            Node::unpack_with(&bytes, &DecodeLimits::with_max_depth(2)).unwrap_err(),
            Error::DepthExceeded { limit: 2 }
        );
        assert!(Node::unpack_with(&bytes, &DecodeLimits::unlimited()).is_ok());
    }

    /// A chain of `levels` TRY nodes, each the only child of the one before,
    /// encoded directly so neither packing nor dropping recurses.
    fn nested_buffer(levels: usize) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(levels * NodeHeader::MIN_NODE_LEN);
        for level in 0..levels {
            let total_len = ((levels - level) * NodeHeader::MIN_NODE_LEN) as i32;
            let child_count = if level + 1 < levels { 1i32 } else { 0 };
            bytes.push(VERSION);
            bytes.extend_from_slice(&total_len.to_le_bytes());
            bytes.extend_from_slice(&NodeType::Try.raw().to_le_bytes());
            bytes.extend_from_slice(&0i32.to_le_bytes());
            bytes.extend_from_slice(&0i32.to_le_bytes());
            bytes.extend_from_slice(&child_count.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_default_depth_limit_fits_thread_stack() {
        let handle = std::thread::spawn(|| {
            let at_limit = nested_buffer(crate::DEFAULT_MAX_DEPTH);
            let (node, len) = Node::unpack(&at_limit).unwrap();
            assert_eq!(len, at_limit.len());
            assert_eq!(node.depth(), crate::DEFAULT_MAX_DEPTH);

            let past_limit = nested_buffer(crate::DEFAULT_MAX_DEPTH + 1);
            assert_eq!(
                Node::unpack(&past_limit).unwrap_err(),
                Error::DepthExceeded { limit: crate::DEFAULT_MAX_DEPTH }
            );
        });

        handle.join().unwrap();
    }

    #[test]
    fn test_into_owned_outlives_buffer() {
        let tree = sample_tree();
        let owned = {
            let bytes = tree.to_bytes();
            let (decoded, _) = Node::unpack(&bytes).unwrap();
            decoded.into_owned()
        };

        assert_eq!(owned, tree);
    }

    #[test]
    fn test_iter_preorder() {
        let types: Vec<_> = sample_tree().iter().map(|n| n.node_type()).collect();

        assert_eq!(
            types,
            [
                NodeType::Try,
                NodeType::Attempt,
                NodeType::Include,
                NodeType::Except,
                NodeType::Pre,
                NodeType::Other(42),
            ]
        );
        assert_eq!(sample_tree().count(), 6);
        assert_eq!(sample_tree().depth(), 3);
    }
}
