/*!
 * Document tree used between parsing and rendering.
 *
 * This module provides an index-based tree where:
 * - every node is owned by one [`Document`] arena
 * - nodes point to their parent and ordered children by [`NodeId`]
 * - extensions add their own node kinds through [`CustomKind`]
 */

pub mod document;
pub mod node;

pub use document::{Document, make_id};
pub use node::{Attributes, BaseKind, CustomKind, Node, NodeId, NodeKind};
