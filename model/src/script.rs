use handlebars::Handlebars;
use log::*;
use serde::Serialize;

use crate::error::{Error, Result};

/**
 * Quote the string for a POSIX shell.
 *
 * The result is always a single word: the string wrapped in single quotes,
 * with every embedded single quote closed, escaped and reopened (`'\''`).
 */
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/**
 * Render a template with the given parameters.
 *
 * Output goes into files on the device rather than HTML, so nothing is
 * escaped, and a parameter missing from `parameters` is an error rather than
 * an empty string.
 */
pub fn render<T: Serialize>(template: &str, parameters: &T) -> Result<String> {
    let mut hb = Handlebars::new();
    hb.register_escape_fn(handlebars::no_escape);
    hb.set_strict_mode(true);

    hb.render_template(template, parameters).map_err(|err| {
        error!("Failed to render command ({:?}): {}", err, template);
        Error::Template(err.to_string())
    })
}

/**
 * Command which appends `body` as a line (or lines) to `path`
 */
pub fn append(body: &str, path: &str) -> String {
    format!("printf '%s\\n' {} >> {}", quote(body), quote(path))
}

/**
 * Command which replaces the contents of `path` with `body`
 */
pub fn overwrite(body: &str, path: &str) -> String {
    format!("printf '%s\\n' {} > {}", quote(body), quote(path))
}

/**
 * Command which prints the contents of `path`
 */
pub fn read(path: &str) -> String {
    format!("cat {}", quote(path))
}

/**
 * Undo `quote` on a run of shell words, the inverse used by the fake host in
 * tests.
 *
 * Only understands single quotes, backslash escapes outside of quotes and
 * whitespace separated words, which is everything `quote` produces.
 */
#[cfg(test)]
pub(crate) fn split_words(s: &str) -> Vec<String> {
    let mut words = vec![];
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' => {
                in_word = true;
                for q in chars.by_ref() {
                    if q == '\'' {
                        break;
                    }
                    current.push(q);
                }
            }
            '\\' => {
                in_word = true;
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                in_word = true;
                current.push(c);
            }
        }
    }

    if in_word {
        words.push(current);
    }
    words
}
