//! Message template resolution
//!
//! Placeholders are `{Name}` (named) or `{}` / `{0}` (positional). `{{`
//! writes a literal `{`; a lone `}` is copied as-is. Positional placeholders
//! consume arguments strictly in call order, the digits are never used as an
//! index. A named placeholder that has no entry in the named bag falls back
//! to the next positional argument. Anything left unused is reported in an
//! `(Extra args: ...)` suffix.
//!
//! # Example
//!
//! ```
//! use rust_log_pipeline::core::template::render_template;
//! use rust_log_pipeline::{ArgValue, NamedArgs};
//!
//! let args = vec![ArgValue::from(NamedArgs::new().with("Id", 7).with("Name", "x"))];
//! assert_eq!(render_template("{Id}", &args), "7 (Extra args: Name=x)");
//! ```

use super::arg_value::{ArgValue, NamedArgs};
use std::fmt::Write;

/// Render `template` against `args`
pub fn render_template(template: &str, args: &[ArgValue]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    render_template_into(&mut out, template, args);
    out
}

/// Render `template` against `args`, appending to `out`
pub fn render_template_into(out: &mut String, template: &str, args: &[ArgValue]) {
    let mut resolver = Resolver::new(args);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        if let Some(escaped) = after_open.strip_prefix('{') {
            out.push('{');
            rest = escaped;
            continue;
        }

        let Some(close) = after_open.find('}') else {
            // Unterminated placeholder: keep the remainder verbatim
            out.push_str(&rest[open..]);
            rest = "";
            break;
        };

        let name = &after_open[..close];
        match resolver.resolve(name) {
            Some(value) => {
                let _ = write!(out, "{}", value);
            }
            None => {
                out.push('{');
                out.push_str(name);
                out.push('}');
            }
        }
        rest = &after_open[close + 1..];
    }
    out.push_str(rest);

    resolver.write_extras(out);
}

fn is_positional(name: &str) -> bool {
    name.bytes().all(|b| b.is_ascii_digit())
}

/// Tracks which arguments a single render has consumed
struct Resolver<'a> {
    positional: &'a [ArgValue],
    next_positional: usize,
    named: Option<&'a NamedArgs>,
    named_used: Vec<bool>,
}

impl<'a> Resolver<'a> {
    fn new(args: &'a [ArgValue]) -> Self {
        let bag = args.last().and_then(ArgValue::as_named);
        let (positional, named) = match bag {
            Some(bag) => (&args[..args.len() - 1], Some(bag)),
            None => (args, None),
        };

        Self {
            positional,
            next_positional: 0,
            named,
            named_used: vec![false; named.map_or(0, NamedArgs::len)],
        }
    }

    fn resolve(&mut self, name: &str) -> Option<&'a ArgValue> {
        if !is_positional(name) {
            if let Some(value) = self.lookup_named(name) {
                return Some(value);
            }
        }
        self.next_positional()
    }

    fn lookup_named(&mut self, name: &str) -> Option<&'a ArgValue> {
        let bag = self.named?;
        let idx = bag.position(name)?;
        self.named_used[idx] = true;
        Some(&bag.pairs()[idx].1)
    }

    fn next_positional(&mut self) -> Option<&'a ArgValue> {
        let value = self.positional.get(self.next_positional)?;
        self.next_positional += 1;
        Some(value)
    }

    fn write_extras(&self, out: &mut String) {
        let unused_positional = &self.positional[self.next_positional.min(self.positional.len())..];
        let unused_named = self.named.into_iter().flat_map(|bag| {
            bag.pairs()
                .iter()
                .zip(&self.named_used)
                .filter(|(_, used)| !**used)
                .map(|(pair, _)| pair)
        });

        let mut first = true;
        for value in unused_positional {
            out.push_str(if first { " (Extra args: " } else { ", " });
            first = false;
            let _ = write!(out, "{}", value);
        }
        for (name, value) in unused_named {
            out.push_str(if first { " (Extra args: " } else { ", " });
            first = false;
            let _ = write!(out, "{}={}", name, value);
        }
        if !first {
            out.push(')');
        }
    }
}
