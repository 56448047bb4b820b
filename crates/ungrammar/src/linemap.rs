/// The type of a byte offset in a string
pub type Offset = u32;

/// Use this for human output text spans.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub struct LinePos {
    /// zero-based line index
    pub line: u32,
    /// zero-based column offset relative to the start of the line, unicode code points
    pub character: u32,
}

impl LinePos {
    pub const fn new(line: u32, character: u32) -> LinePos {
        Self { line, character }
    }
}

pub struct LineMap {
    /// byte offset of the line start, whether the line contains non-ascii bytes
    lines: Vec<(Offset, bool)>,
}

impl LineMap {
    pub fn new(src: &str) -> Self {
        let mut lines = Vec::new();

        let mut prev_end = 0;
        let mut saw_unicode = false;
        let mut bytes = src.bytes().enumerate();

        // utf8 continuation bytes are always >=128, so scanning for ascii
        // line breaks over raw bytes never gives false positives
        while let Some((mut i, b)) = bytes.next() {
            match b {
                b'\n' | b'\r' => {
                    if b == b'\r' {
                        if let Some((new_i, b'\n')) = bytes.clone().next() {
                            bytes.next();
                            i = new_i;
                        }
                    }
                    lines.push((prev_end, saw_unicode));
                    saw_unicode = false;
                    prev_end = to_offset(i + 1);
                }
                _ => {
                    if b >= 128 {
                        saw_unicode = true;
                    }
                }
            }
        }

        lines.push((prev_end, saw_unicode));

        Self { lines }
    }

    /// Returns zero-based line and column offset in unicode codepoints. Offset is clamped to the end of `src`
    pub fn offset_to_pos(&self, src: &str, offset: Offset) -> LinePos {
        let offset = Offset::min(offset, to_offset(src.len()));

        let line = match self.lines.binary_search_by_key(&offset, |&(start, _)| start) {
            Ok(line) => line,
            // the first line always starts at 0
            Err(line) => line.saturating_sub(1),
        };
        let (line_start, is_unicode) = self.lines[line];

        let character = if is_unicode {
            let prefix = src
                .get(line_start as usize..offset as usize)
                .unwrap_or_default();
            to_offset(prefix.chars().count())
        } else {
            offset - line_start
        };

        LinePos {
            line: to_offset(line),
            character,
        }
    }
}

fn to_offset(value: usize) -> Offset {
    Offset::try_from(value).unwrap_or(Offset::MAX)
}

#[test]
fn test_line_lookup() {
    let str = "abcd\nì\r\n\nế";
    let mapping = LineMap::new(str);

    let test = |offset: Offset, (l, c): (u32, u32)| {
        let res = mapping.offset_to_pos(str, offset);
        assert_eq!(LinePos::new(l, c), res, "offset {offset}");
    };

    test(0, (0, 0));
    test(4, (0, 4));
    test(5, (1, 0));
    test(7, (1, 1));
    test(9, (2, 0));
    test(10, (3, 0));
    test(13, (3, 1));
    test(100, (3, 1));
}
