//! Lowering of a template into static declarations.
//!
//! Every resource, parameter, mapping, condition and output becomes one
//! top-level static. Nested typed objects are flattened into statics of
//! their own named `<Parent><Property>`; references to resources and
//! parameters go through the referenced static until cycle breaking
//! demotes them.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value as Json;
use stratus_core::{Category, declared_for, to_pascal_case, to_snake_case};
use stratus_ir::{Intrinsic, Output, Parameter, ResourceDef, Template, Value};

use crate::{
    Error, Result,
    expr::Expr,
    naming::{NameTable, declaration_name, field_name},
    schema::{SchemaLookup, Shape, TypeContext},
    state::{ImportReport, ResourceState},
};

/// Names the generated files import by glob; statics never take them.
pub const RESERVED_NAMES: &[&str] = &[
    "Box",
    "Condition",
    "Default",
    "Export",
    "Expr",
    "LazyLock",
    "Mapping",
    "None",
    "Option",
    "Output",
    "Parameter",
    "RawResource",
    "ResourceMeta",
    "Some",
    "String",
    "Tag",
    "Vec",
];

/// Generated file a declaration is written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileGroup {
    Category(Category),
    /// Parameters, mappings and conditions.
    Params,
    Outputs,
}

impl FileGroup {
    pub fn stem(&self) -> &'static str {
        match self {
            FileGroup::Category(category) => category.as_str(),
            FileGroup::Params => "params",
            FileGroup::Outputs => "outputs",
        }
    }
}

/// One generated `pub static`.
#[derive(Debug, Clone)]
pub struct Decl {
    pub ident: String,
    pub type_path: String,
    pub body: Expr,
    pub docs: Vec<String>,
    pub comment: Option<String>,
    pub group: FileGroup,
    /// Namespace module the type lives in, for imports.
    pub module: Option<String>,
    /// False for statics produced by flattening.
    pub top_level: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Section {
    Resources,
    Parameters,
    Mappings,
    Conditions,
    Outputs,
}

impl Section {
    /// Suffix used when a name is already taken by another section.
    fn suffix(&self) -> &'static str {
        match self {
            Section::Resources => "Resource",
            Section::Parameters => "Parameter",
            Section::Mappings => "Mapping",
            Section::Conditions => "Condition",
            Section::Outputs => "Output",
        }
    }

    /// Resources and parameters share one namespace in a template.
    fn shares_names(&self) -> bool {
        matches!(self, Section::Resources | Section::Parameters)
    }
}

pub(crate) struct Lowering<'a> {
    template: &'a Template,
    schema: &'a dyn SchemaLookup,
    names: NameTable,
    /// Logical resource or parameter name to static identifier.
    idents: HashMap<String, String>,
    section_idents: HashMap<(Section, String), String>,
    decls: Vec<Decl>,
    report: ImportReport,
}

impl<'a> Lowering<'a> {
    pub(crate) fn new(template: &'a Template, schema: &'a dyn SchemaLookup) -> Self {
        let mut names = NameTable::new();
        for reserved in RESERVED_NAMES {
            names.claim(reserved);
        }
        Self {
            template,
            schema,
            names,
            idents: HashMap::new(),
            section_idents: HashMap::new(),
            decls: Vec::new(),
            report: ImportReport::new(template.resources.keys()),
        }
    }

    /// Lower the whole template. Declarations come back in emission order,
    /// each flattened static right after its parent.
    pub(crate) fn run(mut self) -> Result<(Vec<Decl>, ImportReport)> {
        let template = self.template;
        self.assign_names()?;

        for (name, def) in &template.resources {
            self.lower_resource(name, def)?;
        }
        for (name, param) in &template.parameters {
            self.lower_parameter(name, param);
        }
        for (name, mapping) in &template.mappings {
            let ident = self.ident_of(Section::Mappings, name);
            self.decls.push(Decl {
                ident,
                type_path: "Mapping".to_string(),
                body: Expr::call("Mapping::new", vec![Expr::Json(mapping.to_json())]),
                docs: Vec::new(),
                comment: None,
                group: FileGroup::Params,
                module: None,
                top_level: true,
            });
        }
        for (name, condition) in &template.conditions {
            let ident = self.ident_of(Section::Conditions, name);
            let body = Expr::call("Condition::new", vec![self.lower_arg(condition)]);
            self.decls.push(Decl {
                ident,
                type_path: "Condition".to_string(),
                body,
                docs: Vec::new(),
                comment: None,
                group: FileGroup::Params,
                module: None,
                top_level: true,
            });
        }
        for (name, output) in &template.outputs {
            self.lower_output(name, output);
        }

        Ok((self.decls, self.report))
    }

    fn assign_names(&mut self) -> Result<()> {
        let template = self.template;
        let sections: [(Section, Vec<&String>); 5] = [
            (Section::Resources, template.resources.keys().collect()),
            (Section::Parameters, template.parameters.keys().collect()),
            (Section::Mappings, template.mappings.keys().collect()),
            (Section::Conditions, template.conditions.keys().collect()),
            (Section::Outputs, template.outputs.keys().collect()),
        ];
        for (section, logical_names) in sections {
            for logical in logical_names {
                let ident = self.claim(section, logical)?;
                if section.shares_names() {
                    self.idents.insert(logical.clone(), ident.clone());
                }
                self.section_idents.insert((section, logical.clone()), ident);
            }
        }
        Ok(())
    }

    /// Resources and parameters keep their sanitized name; other sections
    /// take a section suffix when that name is already in use. Whatever is
    /// still taken gets a numeric discriminator.
    fn claim(&mut self, section: Section, logical: &str) -> Result<String> {
        let base = declaration_name(logical).ok_or_else(|| {
            Box::new(Error::InvalidIdentifier {
                name: logical.to_string(),
            })
        })?;

        let mut candidate = base;
        if !section.shares_names() && self.names.contains(&candidate) {
            candidate.push_str(section.suffix());
        }
        let ident = self.names.derive(&candidate);
        if ident != candidate {
            tracing::warn!(logical, %ident, "identifier collision, added a discriminator");
        }
        Ok(ident)
    }

    fn ident_of(&self, section: Section, logical: &str) -> String {
        self.section_idents
            .get(&(section, logical.to_string()))
            .cloned()
            .unwrap_or_else(|| logical.to_string())
    }

    fn lower_resource(&mut self, logical: &str, def: &ResourceDef) -> Result<()> {
        let ident = self.ident_of(Section::Resources, logical);
        let resource_type = def.resource_type.as_str();
        let group = FileGroup::Category(Category::of(resource_type));
        let at = self.decls.len();

        let declared = declared_for(resource_type).filter(|_| self.schema.supports(resource_type));
        let Some(declared) = declared else {
            let reason = format!("unsupported resource type {}", resource_type);
            tracing::warn!(resource = logical, %reason, "emitting untyped placeholder");
            self.report
                .advance(logical, ResourceState::Skipped(reason.clone()));

            let mut fields = vec![("resource_type".to_string(), Expr::literal(resource_type))];
            if !def.properties.is_null() {
                fields.push(("properties".to_string(), Expr::Json(def.properties.to_json())));
            }
            fields.extend(self.lower_meta(def).map(|meta| ("meta".to_string(), meta)));
            self.decls.push(Decl {
                ident,
                type_path: "RawResource".to_string(),
                body: Expr::Struct {
                    type_path: "RawResource".to_string(),
                    fields,
                },
                docs: Vec::new(),
                comment: Some(reason),
                group: FileGroup::Category(Category::Misc),
                module: None,
                top_level: true,
            });
            return Ok(());
        };
        self.report.advance(logical, ResourceState::TypeResolved);

        let module = field_name(declared.namespace.short);
        let type_path = format!("{}::{}", module, declared.kind);
        let context = TypeContext::resource(resource_type);
        let mut fields = self.lower_properties(&context, &def.properties, &ident, group)?;
        fields.extend(self.lower_meta(def).map(|meta| ("meta".to_string(), meta)));

        tracing::debug!(resource = logical, %type_path, "lowered resource");
        self.decls.insert(
            at,
            Decl {
                ident,
                type_path: type_path.clone(),
                body: Expr::Struct { type_path, fields },
                docs: vec![resource_type.to_string()],
                comment: None,
                group,
                module: Some(module),
                top_level: true,
            },
        );
        self.report.advance(logical, ResourceState::ValueFlattened);
        Ok(())
    }

    fn lower_properties(
        &mut self,
        context: &TypeContext,
        properties: &Value,
        base: &str,
        group: FileGroup,
    ) -> Result<Vec<(String, Expr)>> {
        let map = match properties {
            Value::Null => return Ok(Vec::new()),
            Value::Object(map) => map,
            other => {
                tracing::warn!(
                    resource_type = %context.resource_type,
                    "properties are not a mapping, keeping them as JSON"
                );
                return Ok(vec![("properties".to_string(), Expr::Json(other.to_json()))]);
            }
        };
        self.lower_fields(context, map, base, group)
    }

    fn lower_fields(
        &mut self,
        context: &TypeContext,
        map: &IndexMap<String, Value>,
        base: &str,
        group: FileGroup,
    ) -> Result<Vec<(String, Expr)>> {
        let mut fields = Vec::with_capacity(map.len());
        for (property, value) in map {
            let child_base = format!("{}{}", base, to_pascal_case(property));
            let expr = self.lower_property(context, property, value, &child_base, group)?;
            fields.push((field_name(property), expr));
        }
        Ok(fields)
    }

    /// Lower one property value. Each branch of a conditional is shaped on
    /// its own, so the branches may resolve to different nested types.
    fn lower_property(
        &mut self,
        context: &TypeContext,
        property: &str,
        value: &Value,
        base: &str,
        group: FileGroup,
    ) -> Result<Expr> {
        if let Some(Intrinsic::If {
            condition,
            if_true,
            if_false,
        }) = value.as_intrinsic()
        {
            let when_true = self.lower_property(context, property, if_true, base, group)?;
            let when_false = self.lower_property(context, property, if_false, base, group)?;
            return Ok(Expr::call(
                "if_",
                vec![Expr::str(condition), when_true, when_false],
            ));
        }
        let shape = self.schema.property(context, property, value)?;
        self.lower_shaped(context, property, &shape, value, base, group)
    }

    fn lower_shaped(
        &mut self,
        context: &TypeContext,
        property: &str,
        shape: &Shape,
        value: &Value,
        base: &str,
        group: FileGroup,
    ) -> Result<Expr> {
        match (shape, value) {
            (Shape::Json, v) => Ok(Expr::Json(v.to_json())),
            (Shape::List(_), Value::Intrinsic(intrinsic))
                if !intrinsic.yields_list() && !matches!(**intrinsic, Intrinsic::If { .. }) =>
            {
                Ok(Expr::List(vec![self.lower_intrinsic(intrinsic)]))
            }
            (_, Value::Intrinsic(intrinsic)) => Ok(self.lower_intrinsic(intrinsic)),
            (Shape::Map(_), v) => Ok(Expr::Json(v.to_json())),
            (Shape::List(item), Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for item_value in items {
                    out.push(self.lower_item(context, property, item, item_value, base, group)?);
                }
                Ok(Expr::List(out))
            }
            (Shape::List(item), v) => Ok(Expr::List(vec![
                self.lower_item(context, property, item, v, base, group)?,
            ])),
            (Shape::Nested(name), Value::Object(map)) => self.flatten(context, name, map, base, group),
            (_, Value::Array(_) | Value::Object(_)) => Ok(Expr::Json(value.to_json())),
            (_, scalar) => Ok(scalar_expr(scalar)),
        }
    }

    fn lower_item(
        &mut self,
        context: &TypeContext,
        property: &str,
        shape: &Shape,
        value: &Value,
        base: &str,
        group: FileGroup,
    ) -> Result<Expr> {
        if let Some(Intrinsic::If {
            condition,
            if_true,
            if_false,
        }) = value.as_intrinsic()
            && *shape != Shape::Json
        {
            let when_true = self.lower_item(context, property, shape, if_true, base, group)?;
            let when_false = self.lower_item(context, property, shape, if_false, base, group)?;
            return Ok(Expr::call(
                "if_",
                vec![Expr::str(condition), when_true, when_false],
            ));
        }
        self.lower_shaped(context, property, shape, value, base, group)
    }

    /// Emit a nested object as its own static and refer to it.
    fn flatten(
        &mut self,
        context: &TypeContext,
        type_name: &str,
        map: &IndexMap<String, Value>,
        base: &str,
        group: FileGroup,
    ) -> Result<Expr> {
        let ident = self.names.derive(base);
        let nested = context.nested(type_name);
        let at = self.decls.len();
        let fields = self.lower_fields(&nested, map, &ident, group)?;
        let (type_path, module) = nested_type_path(&context.resource_type, type_name);

        self.decls.insert(
            at,
            Decl {
                ident: ident.clone(),
                type_path: type_path.clone(),
                body: Expr::Struct { type_path, fields },
                docs: Vec::new(),
                comment: None,
                group,
                module,
                top_level: false,
            },
        );
        Ok(Expr::Static(ident))
    }

    fn lower_meta(&mut self, def: &ResourceDef) -> Option<Expr> {
        let mut fields = Vec::new();
        if !def.depends_on.is_empty() {
            let names = def.depends_on.iter().map(Expr::literal).collect();
            fields.push(("depends_on".to_string(), Expr::List(names)));
        }
        let optional = [
            ("condition", &def.condition),
            ("deletion_policy", &def.deletion_policy),
            ("update_replace_policy", &def.update_replace_policy),
        ];
        for (field, value) in optional {
            if let Some(value) = value {
                fields.push((field.to_string(), Expr::Some(Box::new(Expr::literal(value)))));
            }
        }
        if let Some(metadata) = &def.metadata {
            fields.push((
                "metadata".to_string(),
                Expr::Some(Box::new(Expr::Json(metadata.to_json()))),
            ));
        }
        if fields.is_empty() {
            return None;
        }
        Some(Expr::Struct {
            type_path: "ResourceMeta".to_string(),
            fields,
        })
    }

    fn lower_parameter(&mut self, logical: &str, param: &Parameter) {
        let ident = self.ident_of(Section::Parameters, logical);
        let some = |expr: Expr| Expr::Some(Box::new(expr));

        let mut fields = vec![("param_type".to_string(), Expr::literal(&param.param_type))];
        if let Some(description) = &param.description {
            fields.push(("description".to_string(), some(Expr::literal(description))));
        }
        if let Some(default) = &param.default {
            fields.push(("default".to_string(), some(self.lower_arg(default))));
        }
        if !param.allowed_values.is_empty() {
            let values = param.allowed_values.iter().map(|v| self.lower_arg(v)).collect();
            fields.push(("allowed_values".to_string(), Expr::List(values)));
        }
        if let Some(pattern) = &param.allowed_pattern {
            fields.push(("allowed_pattern".to_string(), some(Expr::literal(pattern))));
        }
        if let Some(text) = &param.constraint_description {
            fields.push(("constraint_description".to_string(), some(Expr::literal(text))));
        }
        let lengths = [("min_length", param.min_length), ("max_length", param.max_length)];
        for (field, bound) in lengths {
            if let Some(bound) = bound {
                fields.push((field.to_string(), some(Expr::Literal(Json::from(bound)))));
            }
        }
        let values = [("min_value", &param.min_value), ("max_value", &param.max_value)];
        for (field, bound) in values {
            if let Some(bound) = bound {
                fields.push((field.to_string(), some(Expr::Literal(Json::Number(bound.clone())))));
            }
        }
        if param.no_echo {
            fields.push(("no_echo".to_string(), Expr::Literal(Json::Bool(true))));
        }

        self.decls.push(Decl {
            ident,
            type_path: "Parameter".to_string(),
            body: Expr::Struct {
                type_path: "Parameter".to_string(),
                fields,
            },
            docs: param.description.iter().cloned().collect(),
            comment: None,
            group: FileGroup::Params,
            module: None,
            top_level: true,
        });
    }

    fn lower_output(&mut self, logical: &str, output: &Output) {
        let ident = self.ident_of(Section::Outputs, logical);
        let mut fields = Vec::new();
        if let Some(description) = &output.description {
            fields.push((
                "description".to_string(),
                Expr::Some(Box::new(Expr::literal(description))),
            ));
        }
        fields.push(("value".to_string(), self.lower_arg(&output.value)));
        if let Some(export) = &output.export {
            let name = self.lower_arg(&export.name);
            fields.push((
                "export".to_string(),
                Expr::Some(Box::new(Expr::call("Export::new", vec![name]))),
            ));
        }
        if let Some(condition) = &output.condition {
            fields.push((
                "condition".to_string(),
                Expr::Some(Box::new(Expr::literal(condition))),
            ));
        }

        self.decls.push(Decl {
            ident,
            type_path: "Output".to_string(),
            body: Expr::Struct {
                type_path: "Output".to_string(),
                fields,
            },
            docs: output.description.iter().cloned().collect(),
            comment: None,
            group: FileGroup::Outputs,
            module: None,
            top_level: true,
        });
    }

    /// Untyped lowering for intrinsic arguments and outputs.
    fn lower_arg(&self, value: &Value) -> Expr {
        match value {
            Value::Intrinsic(intrinsic) => self.lower_intrinsic(intrinsic),
            Value::Array(items) => Expr::List(items.iter().map(|v| self.lower_arg(v)).collect()),
            Value::Object(_) => Expr::Json(value.to_json()),
            scalar => scalar_expr(scalar),
        }
    }

    fn lower_intrinsic(&self, intrinsic: &Intrinsic) -> Expr {
        let arg = |v: &Value| self.lower_arg(v);
        match intrinsic {
            Intrinsic::Ref(target) => Expr::Ref {
                target: target.clone(),
                ident: self.idents.get(target).cloned(),
            },
            Intrinsic::GetAtt(attr) => Expr::Attr {
                target: attr.resource.clone(),
                attribute: attr.attribute.clone(),
                ident: self
                    .template
                    .resources
                    .contains_key(&attr.resource)
                    .then(|| self.idents.get(&attr.resource).cloned())
                    .flatten(),
            },
            Intrinsic::Sub {
                template,
                variables,
            } if variables.is_empty() => Expr::call("sub", vec![Expr::str(template)]),
            Intrinsic::Sub {
                template,
                variables,
            } => Expr::call(
                "sub_with",
                vec![
                    Expr::str(template),
                    Expr::Pairs(variables.iter().map(|(k, v)| (k.clone(), arg(v))).collect()),
                ],
            ),
            Intrinsic::Join { delimiter, values } => {
                Expr::call("join", vec![Expr::str(delimiter), arg(values)])
            }
            Intrinsic::Select { index, list } => Expr::call("select", vec![arg(index), arg(list)]),
            Intrinsic::If {
                condition,
                if_true,
                if_false,
            } => Expr::call(
                "if_",
                vec![Expr::str(condition), arg(if_true), arg(if_false)],
            ),
            Intrinsic::Equals(left, right) => Expr::call("equals", vec![arg(left), arg(right)]),
            Intrinsic::And(conditions) => Expr::call(
                "and",
                vec![Expr::List(conditions.iter().map(arg).collect())],
            ),
            Intrinsic::Or(conditions) => Expr::call(
                "or",
                vec![Expr::List(conditions.iter().map(arg).collect())],
            ),
            Intrinsic::Not(condition) => Expr::call("not", vec![arg(condition)]),
            Intrinsic::Condition(name) => Expr::call("condition", vec![Expr::str(name)]),
            Intrinsic::Split { delimiter, source } => {
                Expr::call("split", vec![Expr::str(delimiter), arg(source)])
            }
            Intrinsic::Base64(value) => Expr::call("base64", vec![arg(value)]),
            Intrinsic::Cidr {
                ip_block,
                count,
                cidr_bits,
            } => Expr::call("cidr", vec![arg(ip_block), arg(count), arg(cidr_bits)]),
            Intrinsic::ImportValue(name) => Expr::call("import_value", vec![arg(name)]),
            Intrinsic::FindInMap {
                map_name,
                top_key,
                second_key,
            } => Expr::call(
                "find_in_map",
                vec![arg(map_name), arg(top_key), arg(second_key)],
            ),
            Intrinsic::Transform { name, parameters } => {
                let params: serde_json::Map<String, Json> = parameters
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                Expr::call("transform", vec![Expr::str(name), Expr::Json(Json::Object(params))])
            }
            Intrinsic::GetAZs(region) => Expr::call("get_azs", vec![arg(region)]),
            Intrinsic::Unknown { .. } => Expr::call("raw", vec![Expr::Json(intrinsic.to_json())]),
        }
    }
}

fn scalar_expr(value: &Value) -> Expr {
    match value {
        Value::Bool(b) => Expr::Literal(Json::Bool(*b)),
        Value::Number(n) => Expr::Literal(Json::Number(n.clone())),
        Value::String(s) => Expr::literal(s.clone()),
        other => Expr::Json(other.to_json()),
    }
}

/// Rust path of a nested property type, with the namespace module it needs.
fn nested_type_path(resource_type: &str, type_name: &str) -> (String, Option<String>) {
    if type_name == "Tag" {
        return ("Tag".to_string(), None);
    }
    match declared_for(resource_type) {
        Some(declared) => {
            let module = field_name(declared.namespace.short);
            let path = format!(
                "{}::{}::{}",
                module,
                to_snake_case(&declared.kind),
                type_name
            );
            (path, Some(module))
        }
        None => (type_name.to_string(), None),
    }
}
