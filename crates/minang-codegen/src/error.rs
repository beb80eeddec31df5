/// A node that has no JavaScript form in the position it appears in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedNodeError {
    pub node: &'static str,
    pub context: &'static str,
}

impl UnsupportedNodeError {
    pub fn new(node: &'static str, context: &'static str) -> Self {
        Self { node, context }
    }
}

impl std::fmt::Display for UnsupportedNodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot emit {} as {}", self.node, self.context)
    }
}

impl std::error::Error for UnsupportedNodeError {}
