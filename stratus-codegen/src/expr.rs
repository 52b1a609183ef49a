//! Expression trees for declaration initializers and their Rust text.

use serde_json::Value as Json;

/// Where an expression is placed, which decides the conversions it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// A struct field or list element with a concrete target type.
    Field,
    /// An argument to a function taking `impl Into<Expr>`.
    Arg,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A plain string literal (names, delimiters, templates).
    Str(String),
    /// A scalar literal.
    Literal(Json),
    List(Vec<Expr>),
    /// Free-form JSON, rendered with `json!`.
    Json(Json),
    /// Another generated static.
    Static(String),
    /// `Ref`; `ident` is set while the reference goes through the static.
    Ref {
        target: String,
        ident: Option<String>,
    },
    /// `Fn::GetAtt`; `ident` as for `Ref`.
    Attr {
        target: String,
        attribute: String,
        ident: Option<String>,
    },
    Call {
        func: &'static str,
        args: Vec<Expr>,
    },
    /// `[("key", value), ...]`
    Pairs(Vec<(String, Expr)>),
    Some(Box<Expr>),
    Struct {
        type_path: String,
        fields: Vec<(String, Expr)>,
    },
}

/// Longest single-line rendering before arguments are split over lines.
const INLINE_LIMIT: usize = 72;

impl Expr {
    pub fn call(func: &'static str, args: Vec<Expr>) -> Self {
        Expr::Call { func, args }
    }

    pub fn str(s: impl Into<String>) -> Self {
        Expr::Str(s.into())
    }

    pub fn literal(s: impl Into<String>) -> Self {
        Expr::Literal(Json::String(s.into()))
    }

    /// Statics this expression initializes through, each flagged with
    /// whether the edge can be rewritten as a by-name reference.
    pub fn direct_references(&self) -> Vec<(&str, bool)> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<(&'a str, bool)>) {
        match self {
            Expr::Static(ident) => out.push((ident.as_str(), false)),
            Expr::Ref {
                ident: Some(ident), ..
            }
            | Expr::Attr {
                ident: Some(ident), ..
            } => out.push((ident.as_str(), true)),
            Expr::List(items) | Expr::Call { args: items, .. } => {
                items.iter().for_each(|e| e.collect_references(out))
            }
            Expr::Pairs(fields) | Expr::Struct { fields, .. } => {
                fields.iter().for_each(|(_, e)| e.collect_references(out))
            }
            Expr::Some(inner) => inner.collect_references(out),
            _ => {}
        }
    }

    /// Turn every direct `Ref`/`GetAtt` of `ident` into a by-name
    /// reference. Returns the number of rewritten nodes.
    pub fn demote(&mut self, ident: &str) -> usize {
        match self {
            Expr::Ref { ident: slot, .. } | Expr::Attr { ident: slot, .. } => {
                if slot.as_deref() == Some(ident) {
                    *slot = None;
                    1
                } else {
                    0
                }
            }
            Expr::List(items) | Expr::Call { args: items, .. } => {
                items.iter_mut().map(|e| e.demote(ident)).sum()
            }
            Expr::Pairs(fields) | Expr::Struct { fields, .. } => {
                fields.iter_mut().map(|(_, e)| e.demote(ident)).sum()
            }
            Expr::Some(inner) => inner.demote(ident),
            _ => 0,
        }
    }

    /// Whether rendering needs the `json!` macro.
    pub fn uses_json(&self) -> bool {
        match self {
            Expr::Json(_) => true,
            Expr::Literal(Json::Null) => true,
            Expr::List(items) | Expr::Call { args: items, .. } => items.iter().any(Expr::uses_json),
            Expr::Pairs(fields) | Expr::Struct { fields, .. } => {
                fields.iter().any(|(_, e)| e.uses_json())
            }
            Expr::Some(inner) => inner.uses_json(),
            _ => false,
        }
    }

    /// Rust source for this expression; may span several lines.
    pub fn render(&self, position: Position) -> String {
        match self {
            Expr::Str(s) => format!("{:?}", s),
            Expr::Literal(json) => into(literal(json), position),
            Expr::Json(json) => into(format!("json!({})", json), position),
            Expr::Static(ident) => into(format!("{}.clone()", ident), position),
            Expr::Ref {
                ident: Some(ident), ..
            } => into(format!("{}.to_ref()", ident), position),
            Expr::Ref { target, ident: None } => {
                into(format!("reference({:?})", target), position)
            }
            Expr::Attr {
                attribute,
                ident: Some(ident),
                ..
            } => into(format!("{}.attr({:?})", ident, attribute), position),
            Expr::Attr {
                target,
                attribute,
                ident: None,
            } => into(format!("get_att({:?}, {:?})", target, attribute), position),
            Expr::Call { func, args } => {
                let args: Vec<String> = args.iter().map(|a| a.render(Position::Arg)).collect();
                into(wrap(&format!("{}(", func), &args, ")"), position)
            }
            Expr::List(items) => {
                let items: Vec<String> = items
                    .iter()
                    .map(|item| match position {
                        Position::Field => item.render(Position::Field),
                        Position::Arg => item.render_as_expr(),
                    })
                    .collect();
                wrap("vec![", &items, "]")
            }
            Expr::Pairs(fields) => {
                let items: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("({:?}, {})", k, v.render_as_expr()))
                    .collect();
                wrap("[", &items, "]")
            }
            Expr::Some(inner) => format!("Some({})", inner.render(Position::Field)),
            Expr::Struct { type_path, fields } => {
                let mut out = format!("{} {{\n", type_path);
                for (name, value) in fields {
                    let rendered = value.render(Position::Field);
                    out.push_str(&indent(&format!("{}: {},", name, rendered)));
                    out.push('\n');
                }
                out.push_str("    ..Default::default()\n}");
                out
            }
        }
    }

    /// Rendering typed as the library's `Expr`, for heterogeneous lists.
    fn render_as_expr(&self) -> String {
        match self {
            Expr::Literal(_) | Expr::Str(_) | Expr::Static(_) => {
                format!("Expr::from({})", self.render(Position::Arg))
            }
            _ => self.render(Position::Arg),
        }
    }
}

fn into(text: String, position: Position) -> String {
    match position {
        Position::Field => format!("{}.into()", text),
        Position::Arg => text,
    }
}

fn literal(json: &Json) -> String {
    match json {
        Json::String(s) => format!("{:?}", s),
        Json::Null => "json!(null)".to_string(),
        other => other.to_string(),
    }
}

/// `open a, b close` on one line when short, otherwise one item per line.
fn wrap(open: &str, items: &[String], close: &str) -> String {
    let inline = format!("{}{}{}", open, items.join(", "), close);
    if inline.len() <= INLINE_LIMIT && !inline.contains('\n') {
        return inline;
    }
    let mut out = format!("{}\n", open);
    for item in items {
        out.push_str(&indent(&format!("{},", item)));
        out.push('\n');
    }
    out.push_str(close);
    out
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("    {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
