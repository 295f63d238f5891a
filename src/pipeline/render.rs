//! Deterministic markup for story trees.
//!
//! Rendering is a pure function of tree shape: every reply gets a dot-joined
//! path number (`2.1` is the first reply to the second top-level comment)
//! and links to its neighbours, so the output never depends on the order in
//! which fetches completed.
//!
//! ```text
//! <ol>
//!   <li> 1   meta + body
//!     <ol>
//!       <li> 1.1 ...
//!     </ol>
//!   </li>
//!   <li> 2 ...
//! </ol>
//! ```

use quick_xml::escape::escape;

use crate::models::{Item, ItemId, Node, Story};

/// Body shown in place of removed comments.
pub const DELETED_PLACEHOLDER: &str = "[deleted]";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Markup for one reply, without its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub item_id: ItemId,
    /// 1-based sibling positions from the story down to this reply
    pub path: Vec<usize>,
    pub markup: String,
}

impl Fragment {
    /// Dot-joined number, e.g. `2.1`.
    pub fn number(&self) -> String {
        dotted(&self.path)
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// Where a reply sits among its relatives.
struct Position<'a> {
    path: &'a [usize],
    previous: Option<ItemId>,
    next: Option<ItemId>,
    /// `None` when the parent is the story itself
    parent: Option<ItemId>,
}

/// Render every reply under `story` in depth-first order.
pub fn render(story: &Node) -> Vec<Fragment> {
    let op = story.item().author();
    let mut fragments = Vec::with_capacity(story.descendant_count());
    let mut path = Vec::new();
    render_children(story, None, op, &mut path, &mut fragments);
    fragments
}

fn render_children(
    parent: &Node,
    parent_link: Option<ItemId>,
    op: Option<&str>,
    path: &mut Vec<usize>,
    out: &mut Vec<Fragment>,
) {
    let siblings = parent.children();
    for (idx, node) in siblings.iter().enumerate() {
        path.push(idx + 1);
        let position = Position {
            path: path.as_slice(),
            previous: idx.checked_sub(1).map(|i| siblings[i].id()),
            next: siblings.get(idx + 1).map(Node::id),
            parent: parent_link,
        };
        out.push(Fragment {
            item_id: node.id(),
            path: path.clone(),
            markup: render_node(node, &position, op),
        });
        render_children(node, Some(node.id()), op, path, out);
        path.pop();
    }
}

fn dotted(path: &[usize]) -> String {
    path.iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(".")
}

fn render_node(node: &Node, position: &Position<'_>, op: Option<&str>) -> String {
    let number = dotted(position.path);
    let links = nav_links(position);
    let replies = match node.children().len() {
        0 => String::new(),
        n => format!(" <span class=\"replies\">({n})</span>"),
    };

    match node.item() {
        Item::Comment(comment) if op == Some(comment.author.as_str()) => format!(
            "<div id=\"{id}\" class=\"comment-meta comment-op\">\
             <span class=\"number\">{number}</span> \
             <footer class=\"op\">{by}</footer> \
             <span class=\"date\">{date}</span>{replies}\
             <div class=\"comment-links\">{links}</div></div>\
             <div class=\"comment-body op-body\">{text}</div>",
            id = comment.id,
            by = escape(&comment.author),
            date = comment.time.format(DATE_FORMAT),
            text = comment.text,
        ),
        Item::Comment(comment) => format!(
            "<div id=\"{id}\" class=\"comment-meta\">\
             <span class=\"number\">{number}</span> \
             <span class=\"author\">{by}</span> \
             <span class=\"date\">{date}</span>{replies}\
             <div class=\"comment-links\">{links}</div></div>\
             <div class=\"comment-body\">{text}</div>",
            id = comment.id,
            by = escape(&comment.author),
            date = comment.time.format(DATE_FORMAT),
            text = comment.text,
        ),
        // Replies are only ever comments; anything else keeps its slot as a placeholder.
        other => format!(
            "<div id=\"{id}\" class=\"comment-meta comment-deleted\">\
             <span class=\"number\">{number}</span>{replies}\
             <div class=\"comment-links\">{links}</div></div>\
             <div class=\"comment-body\">{DELETED_PLACEHOLDER}</div>",
            id = other.id(),
        ),
    }
}

fn nav_links(position: &Position<'_>) -> String {
    [
        position.previous.map(|id| link(id, "previous")),
        position.parent.map(|id| link(id, "parent")),
        position.next.map(|id| link(id, "next")),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ")
}

fn link(target: ItemId, label: &str) -> String {
    format!("<a href=\"#{target}\">{label}</a>")
}

/// Nest fragments into `<ol>/<li>` lists following their depth.
pub fn comments_html(fragments: &[Fragment]) -> String {
    let mut out = String::from("<ol>");
    let mut depth = 0;

    for fragment in fragments {
        let next = fragment.depth();
        if depth == 0 {
            out.push_str("<li>");
        } else if next > depth {
            out.push_str("<ol><li>");
        } else {
            for _ in next..depth {
                out.push_str("</li></ol>");
            }
            out.push_str("</li><li>");
        }
        out.push_str(&fragment.markup);
        depth = next;
    }

    if depth > 0 {
        for _ in 1..depth {
            out.push_str("</li></ol>");
        }
        out.push_str("</li>");
    }
    out.push_str("</ol>");
    out
}

/// Body of a story: its own text, or a pointer to the linked article.
///
/// `text` is already HTML; only plain fields are escaped.
fn story_body(story: &Story) -> String {
    match &story.text {
        Some(text) => text.clone(),
        None => format!(
            "<p>This story links to an <a href=\"{url}\">external article</a>.</p><pre>{url}</pre>",
            url = escape(&story.source_url())
        ),
    }
}

/// Complete chapter document for one story tree.
pub fn chapter_html(tree: &Node) -> String {
    let comments = comments_html(&render(tree));
    let (title, author, body, source) = match tree.item() {
        Item::Story(story) => (
            story.title.clone(),
            story.author.clone().unwrap_or_default(),
            story_body(story),
            story.source_url(),
        ),
        other => (
            format!("Discussion {}", other.id()),
            other.author().unwrap_or_default().to_string(),
            String::new(),
            format!("https://news.ycombinator.com/item?id={}", other.id()),
        ),
    };

    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"en\">\n\
         <head><title>{title}</title>\
         <link rel=\"stylesheet\" type=\"text/css\" href=\"style/comments.css\"/></head>\n\
         <body>\n\
         <h1 id=\"{id}\">{title}</h1>\n\
         <p class=\"story-meta\">by <span class=\"author\">{author}</span> \
         <a href=\"{source}\">source</a> \
         <a href=\"https://news.ycombinator.com/item?id={id}\">discussion</a></p>\n\
         <section class=\"story-body\">{body}</section>\n\
         <section class=\"comments\">{comments}</section>\n\
         </body>\n</html>\n",
        id = tree.id(),
        title = escape(&title),
        author = escape(&author),
        source = escape(&source),
    )
}
