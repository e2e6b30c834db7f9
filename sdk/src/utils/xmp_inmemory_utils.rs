// Copyright 2025 Adobe. All rights reserved.
// This file is licensed to you under the Apache License,
// Version 2.0 (http://www.apache.org/licenses/LICENSE-2.0)
// or the MIT license (http://opensource.org/licenses/MIT),
// at your option.

// Unless required by applicable law or agreed to in writing,
// this software is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR REPRESENTATIONS OF ANY KIND, either express or
// implied. See the LICENSE-MIT and LICENSE-APACHE files for the
// specific language governing permissions and limitations under
// each license.

use roxmltree::{Document, Node};

use crate::{Error, Result};

pub(crate) const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
const RDF_DESCRIPTION: &str = "Description";

/// Parse an XMP packet. An empty packet is not an error and yields `None`.
pub(crate) fn parse_xmp(xmp: &str) -> Result<Option<Document<'_>>> {
    if xmp.is_empty() {
        return Ok(None);
    }
    Document::parse(xmp)
        .map(Some)
        .map_err(|e| Error::XmpParse(e.to_string()))
}

/// Locate `x:xmpmeta` -> `rdf:RDF` -> `rdf:Description`: the first element
/// child of the first element child of the root.
pub(crate) fn description_node<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    first_element_child(doc.root_element())
        .and_then(first_element_child)
        .ok_or_else(|| Error::XmpParse("rdf:Description not found".to_owned()))
}

fn first_element_child<'a, 'input>(node: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    node.children().find(Node::is_element)
}

/// Namespace URI bound to `prefix` in the scope of `node`.
pub(crate) fn namespace<'a>(node: Node<'a, '_>, prefix: &str) -> Option<&'a str> {
    node.lookup_namespace_uri(Some(prefix))
}

fn is_named(node: &Node, ns: &str, name: &str) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(ns) && node.tag_name().name() == name
}

/// First descendant element (excluding `parent` itself) with the given
/// namespace and local name, in document order.
pub(crate) fn find_element<'a, 'input>(
    parent: Node<'a, 'input>,
    ns: &str,
    name: &str,
) -> Option<Node<'a, 'input>> {
    parent.descendants().skip(1).find(|n| is_named(n, ns, name))
}

/// Concatenated text of all descendant text nodes.
pub(crate) fn text_content(node: Node) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|n| n.text())
        .collect()
}

/// `1`, `true` or `yes`, case-insensitively and ignoring surrounding space.
pub(crate) fn parse_bool(value: &str) -> bool {
    let value = value.trim();
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}

pub(crate) fn parse_float(value: &str) -> Option<f64> {
    value.trim().parse().ok()
}

/// How the properties of one XMP struct are serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FieldEncoding {
    /// `<Camera:Image Image:Mime="image/jpeg" .../>`
    Attributes,
    /// `<Camera:Image><Image:Mime>image/jpeg</Image:Mime>...</Camera:Image>`
    Elements,
}

/// Reads namespace-qualified properties from one XMP struct, using the
/// encoding detected once when the source is created.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldSource<'a, 'input> {
    node: Node<'a, 'input>,
    ns: &'a str,
    encoding: FieldEncoding,
}

impl<'a, 'input> FieldSource<'a, 'input> {
    /// Probe `element` for its encoding. A nested `rdf:Description` child
    /// becomes the node properties are read from; if that node carries any
    /// attribute in `ns` the struct is attribute encoded.
    pub fn probe(element: Node<'a, 'input>, ns: &'a str) -> Self {
        let node = element
            .children()
            .find(|c| is_named(c, RDF_NS, RDF_DESCRIPTION))
            .unwrap_or(element);
        let encoding = if node.attributes().any(|a| a.namespace() == Some(ns)) {
            FieldEncoding::Attributes
        } else {
            FieldEncoding::Elements
        };
        Self { node, ns, encoding }
    }

    pub fn attributes(node: Node<'a, 'input>, ns: &'a str) -> Self {
        Self {
            node,
            ns,
            encoding: FieldEncoding::Attributes,
        }
    }

    pub fn value(&self, name: &str) -> Option<String> {
        match self.encoding {
            FieldEncoding::Attributes => self.node.attribute((self.ns, name)).map(str::to_owned),
            FieldEncoding::Elements => find_element(self.node, self.ns, name).map(text_content),
        }
    }

    pub fn string(&self, name: &str) -> Option<String> {
        self.value(name).map(|v| v.trim().to_owned())
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        self.value(name).as_deref().and_then(parse_float)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.value(name).as_deref().map(parse_bool)
    }
}
