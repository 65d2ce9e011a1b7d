use pulldown_cmark::{Event, Parser, Tag, TagEnd};

use super::{FeatureSet, Node, Transformed, Transformer};
use crate::error::ParseError;
use crate::index::LineSpan;

/// Nesting limit beyond which a document is rejected as pathological.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// List items rank below every heading level.
const LIST_RANK_BASE: usize = 6;

/// Builds the diagram tree from markdown headings and list items.
///
/// Headings nest by level; list items nest under the closest heading above
/// them and under their parent item. A document with a single top-level node
/// uses that node as the root, anything else gets an empty synthetic root.
#[derive(Debug, Clone)]
pub struct MarkdownTransformer {
    max_depth: usize,
}

impl Default for MarkdownTransformer {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl MarkdownTransformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self { max_depth }
    }
}

struct Frame {
    rank: usize,
    node: Node,
    capturing: bool,
}

impl Transformer for MarkdownTransformer {
    fn transform(&self, document_text: &str) -> Result<Transformed, ParseError> {
        let lines = LineLocator::new(document_text);
        let mut features = FeatureSet::default();
        let mut stack = vec![Frame {
            rank: 0,
            node: Node::root(),
            capturing: false,
        }];
        let mut list_depth = 0usize;

        for (event, range) in Parser::new(document_text).into_offset_iter() {
            match event {
                Event::Start(Tag::Heading { level, .. }) if list_depth == 0 => {
                    let rank = level as usize;
                    close_frames(&mut stack, rank);
                    self.open_frame(&mut stack, rank, lines.span_at(range.start))?;
                }
                Event::End(TagEnd::Heading(_)) if list_depth == 0 => stop_capture(&mut stack),
                Event::Start(Tag::List(_)) => {
                    list_depth += 1;
                    stop_capture(&mut stack);
                }
                Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
                Event::Start(Tag::Item) => {
                    let rank = LIST_RANK_BASE + list_depth;
                    close_frames(&mut stack, rank);
                    self.open_frame(&mut stack, rank, lines.span_at(range.start))?;
                }
                Event::End(TagEnd::Item) => close_frames(&mut stack, LIST_RANK_BASE + list_depth),
                Event::End(TagEnd::Paragraph) | Event::Start(Tag::CodeBlock(_)) => {
                    stop_capture(&mut stack)
                }
                Event::Start(Tag::Link { .. }) => features.links = true,
                Event::Start(Tag::Emphasis) | Event::Start(Tag::Strong) => {
                    features.emphasis = true
                }
                Event::Text(text) => append_text(&mut stack, &text),
                Event::Code(code) => {
                    features.code = true;
                    append_text(&mut stack, &code);
                }
                Event::SoftBreak | Event::HardBreak => append_text(&mut stack, " "),
                _ => {}
            }
        }

        close_frames(&mut stack, 1);
        let mut root = stack.pop().map(|frame| frame.node).unwrap_or_else(Node::root);
        if root.children.len() == 1 {
            root = root.children.remove(0);
        }
        root.assign_depth(0);
        trim_content(&mut root);

        Ok(Transformed { root, features })
    }
}

impl MarkdownTransformer {
    fn open_frame(
        &self,
        stack: &mut Vec<Frame>,
        rank: usize,
        lines: LineSpan,
    ) -> Result<(), ParseError> {
        let depth = stack.len();
        if depth > self.max_depth {
            return Err(ParseError::TooDeep {
                depth,
                limit: self.max_depth,
            });
        }
        let mut node = Node::new(String::new(), depth);
        node.lines = Some(lines);
        stack.push(Frame {
            rank,
            node,
            capturing: true,
        });
        Ok(())
    }
}

/// Pop every frame ranked at or below `rank` into its parent. The root never pops.
fn close_frames(stack: &mut Vec<Frame>, rank: usize) {
    while stack.len() > 1 && stack.last().is_some_and(|frame| frame.rank >= rank) {
        if let Some(frame) = stack.pop()
            && let Some(parent) = stack.last_mut()
        {
            parent.node.children.push(frame.node);
        }
    }
}

fn stop_capture(stack: &mut [Frame]) {
    if let Some(top) = stack.last_mut() {
        top.capturing = false;
    }
}

fn append_text(stack: &mut [Frame], text: &str) {
    if let Some(top) = stack.last_mut()
        && top.capturing
    {
        top.node.content.push_str(text);
    }
}

fn trim_content(node: &mut Node) {
    let trimmed = node.content.trim();
    if trimmed.len() != node.content.len() {
        node.content = trimmed.to_string();
    }
    node.children.iter_mut().for_each(trim_content);
}

/// Byte offset to zero-based line number.
struct LineLocator {
    newlines: Vec<usize>,
}

impl LineLocator {
    fn new(text: &str) -> Self {
        Self {
            newlines: text.match_indices('\n').map(|(at, _)| at).collect(),
        }
    }

    fn span_at(&self, offset: usize) -> LineSpan {
        LineSpan::single(self.newlines.partition_point(|&nl| nl < offset))
    }
}
