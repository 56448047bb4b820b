use std::fmt::Display;

/// Byte range into the source text.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Span {
    start: u32,
    end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Span {
        debug_assert!(start <= end);
        Self { start, end }
    }
    pub fn at(pos: u32) -> Span {
        Self {
            start: pos,
            end: pos,
        }
    }
    pub fn is_empty(self) -> bool {
        self.start >= self.end
    }
    pub fn len(self) -> u32 {
        self.end.saturating_sub(self.start)
    }
    /// Returns `None` if the span doesn't fall on character boundaries of `src`.
    pub fn as_str(self, src: &str) -> Option<&str> {
        src.get(self.start as usize..self.end as usize)
    }
    pub fn start(self) -> u32 {
        self.start
    }
    pub fn end(self) -> u32 {
        self.end
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[test]
fn test_span() {
    let src = "Node = 'x'";
    let span = Span::new(7, 10);
    assert_eq!(span.as_str(src), Some("'x'"));
    assert_eq!(span.len(), 3);
    assert_eq!(span.to_string(), "7..10");
    assert!(Span::at(4).is_empty());
    assert_eq!(Span::new(7, 40).as_str(src), None);
}
