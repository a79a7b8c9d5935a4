use genco::{prelude::*, tokens::static_literal};

/// A `//` comment block. Entries containing newlines are split, and blank
/// lines are rendered as a bare `//` so gofmt leaves them alone. Every line
/// is terminated, so whatever follows the block starts on a fresh line.
pub struct Comment<T>(T);

impl<T> FormatInto<Go> for Comment<T>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    fn format_into(self, tokens: &mut Tokens<Go>) {
        for entry in self.0 {
            for line in entry.as_ref().lines() {
                tokens.push();
                tokens.append(static_literal("//"));
                let line = line.trim_end();
                if !line.is_empty() {
                    tokens.space();
                    tokens.append(line.to_string());
                }
                tokens.push();
            }
        }
    }
}

pub fn comment<T>(lines: T) -> Comment<T>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    Comment(lines)
}
