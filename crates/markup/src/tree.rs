use crate::tokenizer::tokenize;
use crate::types::{Node, Token};

/// Elements whose start tag implicitly closes an open sibling of the same name.
fn closes_open_sibling(name: &str) -> bool {
    matches!(name, "li" | "option" | "p" | "dt" | "dd" | "tr" | "td" | "th")
}

struct OpenElement {
    name: String,
    attributes: Vec<(String, Option<String>)>,
    children: Vec<Node>,
}

impl OpenElement {
    fn into_node(self) -> Node {
        Node::Element {
            name: self.name,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

struct FragmentBuilder {
    roots: Vec<Node>,
    open: Vec<OpenElement>,
}

impl FragmentBuilder {
    fn append(&mut self, node: Node) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    fn close_top(&mut self) {
        if let Some(top) = self.open.pop() {
            let node = top.into_node();
            self.append(node);
        }
    }

    fn close_until(&mut self, name: &str) {
        let Some(depth) = self.open.iter().rposition(|el| el.name == name) else {
            log::trace!(target: "markup", "ignoring stray end tag </{name}>");
            return;
        };
        while self.open.len() > depth {
            self.close_top();
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.roots
    }
}

/// Parse markup into a forest of nodes in document order.
pub fn parse_fragment(input: &str) -> Vec<Node> {
    let mut builder = FragmentBuilder {
        roots: Vec::new(),
        open: Vec::new(),
    };

    for token in tokenize(input) {
        match token {
            Token::Text(text) => builder.append(Node::Text(text)),
            Token::Comment(text) => builder.append(Node::Comment(text)),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                if closes_open_sibling(&name)
                    && builder.open.last().is_some_and(|top| top.name == name)
                {
                    builder.close_top();
                }
                let element = OpenElement {
                    name,
                    attributes,
                    children: Vec::new(),
                };
                if self_closing {
                    builder.append(element.into_node());
                } else {
                    builder.open.push(element);
                }
            }
            Token::EndTag(name) => builder.close_until(&name),
        }
    }

    builder.finish()
}
