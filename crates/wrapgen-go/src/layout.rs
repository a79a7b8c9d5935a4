//! Explicit line structure for generated Go.
//!
//! `quote!` only sees the columns of its tokens on a stable compiler, so a
//! multi-line template collapses onto one line. Everything that spans lines
//! is assembled from single-line quotes with these helpers instead.

use genco::{prelude::*, tokens::static_literal};

/// Each item on its own line.
pub fn lines<I>(items: I) -> Tokens<Go>
where
    I: IntoIterator,
    I::Item: FormatInto<Go>,
{
    let mut tokens = Tokens::new();
    for item in items {
        tokens.push();
        tokens.append(item);
    }
    tokens
}

/// Top level declarations separated by a blank line.
pub fn decls<I>(items: I) -> Tokens<Go>
where
    I: IntoIterator,
    I::Item: FormatInto<Go>,
{
    let mut tokens = Tokens::new();
    for (i, item) in items.into_iter().enumerate() {
        if i == 0 {
            tokens.push();
        } else {
            tokens.line();
        }
        tokens.append(item);
    }
    tokens
}

/// `{ body }` with the body indented one level. An empty body renders `{}`.
pub fn block(body: impl FormatInto<Go>) -> Tokens<Go> {
    let mut tokens = Tokens::new();
    tokens.append(static_literal("{"));
    tokens.indent();
    tokens.append(body);
    tokens.unindent();
    tokens.append(static_literal("}"));
    tokens
}

/// A `case`/`default` clause: the head followed by its indented body.
pub fn arm(head: impl FormatInto<Go>, body: impl FormatInto<Go>) -> Tokens<Go> {
    let mut tokens = Tokens::new();
    tokens.append(head);
    tokens.indent();
    tokens.append(body);
    tokens.unindent();
    tokens
}

/// `switch head { arms }` with the clauses aligned to the `switch` keyword.
pub fn switch<I>(head: impl FormatInto<Go>, arms: I) -> Tokens<Go>
where
    I: IntoIterator,
    I::Item: FormatInto<Go>,
{
    let mut tokens = Tokens::new();
    tokens.append(static_literal("switch"));
    tokens.space();
    tokens.append(head);
    tokens.space();
    tokens.append(static_literal("{"));
    for arm in arms {
        tokens.push();
        tokens.append(arm);
    }
    tokens.push();
    tokens.append(static_literal("}"));
    tokens
}
