use crate::error::DocumentError;
use crate::node::{Key, Mapping, Node};
use crate::token::{Token, TokenKind};

/// Parse a full document from a token stream into a top-level [`Mapping`], using exactly one
/// token of lookahead. The top-level production is a sequence of `key = value` pairs ending at
/// `Eof` (§4.2 of the design).
pub fn parse_document<I>(tokens: I) -> Result<Mapping, DocumentError>
where
    I: Iterator<Item = Result<Token, DocumentError>>,
{
    let mut parser = Parser::new(tokens);
    let mut root = Mapping::new();
    while parser.peek()?.kind != TokenKind::Eof {
        let (key, value) = parser.parse_kv_pair()?;
        tracing::debug!(key = %key, "node");
        root.insert_or_merge(key, value);
    }
    Ok(root)
}

struct Parser<I> {
    tokens: I,
    lookahead: Option<Token>,
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Token, DocumentError>>,
{
    fn new(tokens: I) -> Self {
        Parser { tokens, lookahead: None }
    }

    fn pull(&mut self) -> Result<Token, DocumentError> {
        self.tokens.next().expect("token stream ends with Eof, never exhausts silently")
    }

    fn next_token(&mut self) -> Result<Token, DocumentError> {
        match self.lookahead.take() {
            Some(token) => Ok(token),
            None => self.pull(),
        }
    }

    fn peek(&mut self) -> Result<&Token, DocumentError> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.pull()?);
        }
        Ok(self.lookahead.as_ref().unwrap())
    }

    fn token_to_key(&self, token: Token) -> Result<Key, DocumentError> {
        match token.kind {
            TokenKind::Eof => Err(DocumentError::UnexpectedEof { line: token.line }),
            TokenKind::String => Ok(Key::String(token.into_string().unwrap())),
            TokenKind::Integer => Ok(Key::Integer(token.as_integer().unwrap())),
            _ => Err(DocumentError::ExpectKey { line: token.line, found: token.kind }),
        }
    }

    fn literal_to_node(&self, token: Token) -> Result<Node, DocumentError> {
        match token.kind {
            TokenKind::Integer => Ok(Node::Integer(token.as_integer().unwrap())),
            TokenKind::Float => Ok(Node::Float(token.as_float().unwrap())),
            TokenKind::String => Ok(Node::String(token.into_string().unwrap())),
            _ => Err(DocumentError::ExpectValue { line: token.line, found: token.kind }),
        }
    }

    fn parse_kv_pair(&mut self) -> Result<(Key, Node), DocumentError> {
        let key_token = self.next_token()?;
        let key = self.token_to_key(key_token)?;
        let eq_token = self.next_token()?;
        if eq_token.kind == TokenKind::Eof {
            return Err(DocumentError::UnexpectedEof { line: eq_token.line });
        }
        if eq_token.kind != TokenKind::Equal {
            return Err(DocumentError::ExpectEqual { line: eq_token.line, found: eq_token.kind });
        }
        let value = self.parse_value()?;
        Ok((key, value))
    }

    fn parse_value(&mut self) -> Result<Node, DocumentError> {
        let next = self.peek()?;
        match next.kind {
            TokenKind::Integer | TokenKind::Float | TokenKind::String => {
                let token = self.next_token()?;
                self.literal_to_node(token)
            }
            TokenKind::BraceOpen => self.parse_block(),
            TokenKind::Eof => Err(DocumentError::UnexpectedEof { line: next.line }),
            _ => Err(DocumentError::ExpectValue { line: next.line, found: next.kind }),
        }
    }

    /// Parse everything following an opening `{`, deciding between empty sequence, sequence, and
    /// mapping with the two-token lookahead described in §4.2. `self.pos` is positioned right
    /// after `{` is consumed.
    fn parse_block(&mut self) -> Result<Node, DocumentError> {
        let brace = self.next_token()?;
        debug_assert_eq!(brace.kind, TokenKind::BraceOpen);

        match self.peek()?.kind {
            TokenKind::BraceClose => {
                self.next_token()?;
                Ok(Node::Sequence(Vec::new()))
            }
            TokenKind::BraceOpen => self.parse_sequence(Vec::new()),
            TokenKind::Eof => {
                let look = self.peek()?;
                Err(DocumentError::UnexpectedEof { line: look.line })
            }
            _ => {
                let first = self.next_token()?;
                match self.peek()?.kind {
                    TokenKind::Equal => {
                        self.next_token()?; // consume '='
                        let key = self.token_to_key(first)?;
                        self.parse_mapping(key)
                    }
                    TokenKind::Integer
                    | TokenKind::Float
                    | TokenKind::String
                    | TokenKind::BraceClose => {
                        let first_value = self.literal_to_node(first)?;
                        self.parse_sequence(vec![first_value])
                    }
                    TokenKind::Eof => {
                        let look = self.peek()?;
                        Err(DocumentError::UnexpectedEof { line: look.line })
                    }
                    _ => {
                        let look = self.peek()?;
                        Err(DocumentError::ExpectValue { line: look.line, found: look.kind })
                    }
                }
            }
        }
    }

    /// Parse the remainder of a mapping block, `first_key` having already been read and its `=`
    /// consumed. Repeated keys are merged per [`Mapping::insert_or_merge`].
    fn parse_mapping(&mut self, first_key: Key) -> Result<Node, DocumentError> {
        let first_value = self.parse_value()?;
        let mut mapping = Mapping::new();
        mapping.insert_or_merge(first_key, first_value);

        loop {
            if self.peek()?.kind == TokenKind::BraceClose {
                self.next_token()?;
                break;
            }
            let (key, value) = self.parse_kv_pair()?;
            mapping.insert_or_merge(key, value);
        }
        Ok(Node::Mapping(mapping))
    }

    /// Parse the remainder of a sequence block, with `items` already primed with any elements
    /// parsed before the branch was recognized as a sequence. A nested `{` encountered while
    /// scanning elements is parsed as a full value and appended — it never resets `items` (see
    /// SPEC_FULL.md §9).
    fn parse_sequence(&mut self, mut items: Vec<Node>) -> Result<Node, DocumentError> {
        loop {
            if self.peek()?.kind == TokenKind::BraceClose {
                self.next_token()?;
                break;
            }
            let value = self.parse_value()?;
            items.push(value);
        }
        Ok(Node::Sequence(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(text: &str) -> Mapping {
        parse_document(Lexer::new(text)).expect("parse should succeed")
    }

    /// Render a parsed tree into a `serde_json::Value` purely for golden-fixture comparison in
    /// tests; the crate does not otherwise depend on `serde` for its data model.
    fn node_to_json(node: &Node) -> serde_json::Value {
        match node {
            Node::Integer(v) => serde_json::json!(v),
            Node::Float(v) => serde_json::json!(v),
            Node::String(v) => serde_json::json!(v),
            Node::Sequence(items) => serde_json::Value::Array(items.iter().map(node_to_json).collect()),
            Node::Mapping(mapping) => {
                let mut object = serde_json::Map::new();
                for (key, value) in mapping.iter() {
                    object.insert(key.to_string(), node_to_json(value));
                }
                serde_json::Value::Object(object)
            }
        }
    }

    fn mapping_to_json(mapping: &Mapping) -> serde_json::Value {
        node_to_json(&Node::Mapping(mapping.clone()))
    }

    #[test]
    fn golden_fixture_mixed_document() {
        let root = parse("name=\"Stellar Empire\"\nfleets={ 1 2 3 }\nhome={ system=Sol }");
        let actual = mapping_to_json(&root);
        let expected = serde_json::json!({
            "name": "Stellar Empire",
            "fleets": [1, 2, 3],
            "home": { "system": "Sol" },
        });
        assert_eq!(actual, expected);
    }

    #[test]
    fn s1_mixed_document() {
        let root = parse("key1=value1\nkey2={ list of values }\nkey3={ {} {1 2 3} }");
        assert_eq!(root.get(&Key::String("key1".into())), Some(&Node::String("value1".into())));
        assert_eq!(
            root.get(&Key::String("key2".into())),
            Some(&Node::Sequence(vec![
                Node::String("list".into()),
                Node::String("of".into()),
                Node::String("values".into()),
            ]))
        );
        assert_eq!(
            root.get(&Key::String("key3".into())),
            Some(&Node::Sequence(vec![
                Node::Sequence(vec![]),
                Node::Sequence(vec![Node::Integer(1), Node::Integer(2), Node::Integer(3)]),
            ]))
        );
    }

    #[test]
    fn s2_repeated_key_merges_mixed_shapes() {
        let root = parse("key=value\nkey={}\nkey={ inner=x }\nkey={ {} {1 2 3} }");
        let mut inner_mapping = Mapping::new();
        inner_mapping.insert_or_merge(Key::String("inner".into()), Node::String("x".into()));
        assert_eq!(
            root.get(&Key::String("key".into())),
            Some(&Node::Sequence(vec![
                Node::String("value".into()),
                Node::Sequence(vec![]),
                Node::Mapping(inner_mapping),
                Node::Sequence(vec![
                    Node::Sequence(vec![]),
                    Node::Sequence(vec![Node::Integer(1), Node::Integer(2), Node::Integer(3)]),
                ]),
            ]))
        );
    }

    #[test]
    fn s3_repeated_key_of_sequences() {
        let root = parse("amount={ 1 2 3 }\namount={ 4 5 6 }\namount={ 7 8 8 }");
        assert_eq!(
            root.get(&Key::String("amount".into())),
            Some(&Node::Sequence(vec![
                Node::Sequence(vec![Node::Integer(1), Node::Integer(2), Node::Integer(3)]),
                Node::Sequence(vec![Node::Integer(4), Node::Integer(5), Node::Integer(6)]),
                Node::Sequence(vec![Node::Integer(7), Node::Integer(8), Node::Integer(8)]),
            ]))
        );
    }

    #[test]
    fn s4_empty_block_across_linebreak() {
        let root = parse("empty_with_linebreak={\n}");
        assert_eq!(
            root.get(&Key::String("empty_with_linebreak".into())),
            Some(&Node::Sequence(vec![]))
        );
    }

    #[test]
    fn integer_keys_are_accepted() {
        let root = parse("42=answer");
        assert_eq!(root.get(&Key::Integer(42)), Some(&Node::String("answer".into())));
    }

    #[test]
    fn expect_equal_on_missing_eq() {
        let err = parse_document(Lexer::new("key value")).unwrap_err();
        assert!(matches!(err, DocumentError::ExpectEqual { .. }));
    }

    #[test]
    fn unexpected_eof_inside_block() {
        let err = parse_document(Lexer::new("key={ inner=1")).unwrap_err();
        assert!(matches!(err, DocumentError::UnexpectedEof { .. }));
    }

    #[test]
    fn unexpected_eof_right_after_bare_key() {
        let err = parse_document(Lexer::new("key")).unwrap_err();
        assert!(matches!(err, DocumentError::UnexpectedEof { .. }));
    }

    #[test]
    fn unexpected_eof_right_after_open_brace() {
        let err = parse_document(Lexer::new("key={")).unwrap_err();
        assert!(matches!(err, DocumentError::UnexpectedEof { .. }));
    }

    #[test]
    fn expect_value_on_stray_equal() {
        let err = parse_document(Lexer::new("key=={}")).unwrap_err();
        assert!(matches!(err, DocumentError::ExpectValue { .. }));
    }
}
