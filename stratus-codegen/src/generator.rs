//! Rust module tree generation.

use std::collections::{BTreeMap, BTreeSet};

use stratus_core::{File, LanguageCodegen};
use stratus_ir::Template;

use crate::{
    Result,
    code::{CodeFragment, RawCode, Renderable, RustFile, Use},
    cycles::{BrokenEdge, break_cycles},
    expr::Position,
    lower::{Decl, FileGroup, Lowering},
    schema::{InferredSchema, SchemaLookup},
    state::{ImportReport, ResourceState},
};

/// Crate path of the resource library the generated code targets.
pub const DEFAULT_PACKAGE: &str = "stratus_cfn";

static INFERRED: InferredSchema = InferredSchema;

/// Generated files together with per-resource progress.
#[derive(Debug)]
pub struct Rendered {
    pub files: Vec<File>,
    pub report: ImportReport,
    pub broken_cycles: Vec<BrokenEdge>,
}

/// Generates a Rust module of `LazyLock` statics from a template.
///
/// ```
/// use stratus_codegen::RustGenerator;
/// use stratus_ir::{ResourceDef, Template, Value};
///
/// let mut template = Template::new();
/// template.resources.insert(
///     "DataBucket".into(),
///     ResourceDef::new("AWS::S3::Bucket", Value::Null),
/// );
///
/// let rendered = RustGenerator::new(&template).render().unwrap();
/// let paths: Vec<_> = rendered.files.iter().map(|f| f.path().to_path_buf()).collect();
/// assert_eq!(paths, ["mod.rs", "storage.rs"].map(std::path::PathBuf::from));
/// ```
pub struct RustGenerator<'a> {
    template: &'a Template,
    schema: &'a dyn SchemaLookup,
    package: String,
}

impl<'a> RustGenerator<'a> {
    pub fn new(template: &'a Template) -> Self {
        Self {
            template,
            schema: &INFERRED,
            package: DEFAULT_PACKAGE.to_string(),
        }
    }

    pub fn with_schema(mut self, schema: &'a dyn SchemaLookup) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn render(&self) -> Result<Rendered> {
        let (mut decls, mut report) = Lowering::new(self.template, self.schema).run()?;

        let broken_cycles = break_cycles(&mut decls);
        report.advance_all(
            &ResourceState::ValueFlattened,
            ResourceState::ReferencesRewritten,
        );

        let mut groups: BTreeMap<FileGroup, Vec<&Decl>> = BTreeMap::new();
        for decl in &decls {
            groups.entry(decl.group).or_default().push(decl);
        }

        let mut files = vec![File::generated("mod.rs", self.render_mod(groups.keys()))];
        for (group, members) in &groups {
            let path = format!("{}.rs", group.stem());
            tracing::debug!(%path, statics = members.len(), "rendering file");
            files.push(File::generated(path, self.render_group(members)));
        }

        report.advance_all(&ResourceState::ReferencesRewritten, ResourceState::Emitted);
        Ok(Rendered {
            files,
            report,
            broken_cycles,
        })
    }

    fn render_mod<'g>(&self, groups: impl Iterator<Item = &'g FileGroup>) -> String {
        let stems: Vec<&str> = groups.map(FileGroup::stem).collect();
        let mods: Vec<String> = stems.iter().map(|stem| format!("mod {};", stem)).collect();
        let uses: Vec<String> = stems
            .iter()
            .map(|stem| format!("pub use {}::*;", stem))
            .collect();

        let mut file =
            RustFile::new().inner_attribute("allow(non_upper_case_globals, unused_imports)");
        if !stems.is_empty() {
            file = file
                .add(RawCode::new(mods.join("\n")))
                .add(RawCode::new(uses.join("\n")));
        }
        file.render()
    }

    fn render_group(&self, decls: &[&Decl]) -> String {
        let modules: BTreeSet<&str> = decls.iter().filter_map(|d| d.module.as_deref()).collect();

        let mut file = RustFile::new().use_stmt(Use::new("std::sync").symbol("LazyLock"));
        if decls.iter().any(|d| d.body.uses_json()) {
            file = file.use_stmt(Use::new("serde_json").symbol("json"));
        }
        file = file.use_stmt(Use::new(format!("{}::prelude::*", self.package)));
        if !modules.is_empty() {
            file = file.use_stmt(Use::new(self.package.as_str()).symbols(modules));
        }
        file.use_stmt(Use::new("super::*"))
            .add_all(decls.iter().map(|decl| StaticItem(*decl)))
            .render()
    }
}

impl LanguageCodegen for RustGenerator<'_> {
    fn language(&self) -> &'static str {
        "rust"
    }

    fn file_extension(&self) -> &'static str {
        "rs"
    }

    fn files(&self) -> eyre::Result<Vec<File>> {
        Ok(self.render()?.files)
    }
}

/// One `pub static` with its docs.
struct StaticItem<'d>(&'d Decl);

impl Renderable for StaticItem<'_> {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let decl = self.0;
        let mut out: Vec<CodeFragment> = decl.docs.iter().map(CodeFragment::doc).collect();
        out.extend(decl.comment.iter().map(CodeFragment::comment));
        out.push(CodeFragment::line(format!(
            "pub static {}: LazyLock<{}> = LazyLock::new(|| {});",
            decl.ident,
            decl.type_path,
            decl.body.render(Position::Arg)
        )));
        out
    }
}
