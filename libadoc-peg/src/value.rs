/// Result of a successful match.
///
/// Atomic matches produce the matched `Text`, sequences and repetitions a
/// `List` of their children's values, optional and lookahead expressions
/// `Absent` when they have nothing to report, and semantic actions whatever
/// node type `N` the grammar builds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<N> {
    Absent,
    Text(String),
    List(Vec<Value<N>>),
    Node(N),
}

impl<N> Value<N> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&N> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_node(self) -> Option<N> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// View the value as a list: `Absent` is empty, a scalar is a singleton.
    pub fn into_list(self) -> Vec<Value<N>> {
        match self {
            Value::Absent => Vec::new(),
            Value::List(items) => items,
            other => vec![other],
        }
    }
}

impl<N> From<String> for Value<N> {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl<N> From<&str> for Value<N> {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_list() {
        assert!(Value::<()>::Absent.into_list().is_empty());
        assert_eq!(
            Value::<()>::from("a").into_list(),
            vec![Value::Text("a".to_string())]
        );
        let list = Value::<()>::List(vec![Value::Absent, Value::from("b")]);
        assert_eq!(list.into_list().len(), 2);
    }

    #[test]
    fn test_accessors() {
        let node: Value<u32> = Value::Node(7);
        assert_eq!(node.as_node(), Some(&7));
        assert_eq!(node.as_text(), None);
        assert_eq!(node.into_node(), Some(7));
        assert!(Value::<u32>::Absent.is_absent());
    }
}
