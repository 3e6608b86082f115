//! Lowering: raw documents to model arenas.
//!
//! Lowering is a single pass per document. It records what was written
//! (the declared view) and every name reference it meets; names are not
//! resolved here. Structural problems found on the way (duplicate or
//! reserved names, unknown annotation targets) become diagnostics.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use text_size::{TextRange, TextSize};

use crate::base::{Name, NodePath};
use crate::config::ModelConfig;
use crate::hir::declarations::{
    ResourceType, SecurityScheme, SecuritySchemeKind, SecuritySchemeSettings, Trait,
};
use crate::hir::diagnostics::{Diagnostic, DiagnosticCollector, codes};
use crate::hir::document::{Document, DocumentationItem};
use crate::hir::ids::{DocId, MethodId, ResourceId, ResourceTypeId, SchemeId, TraitId, TypeId};
use crate::hir::model::{ModelData, ReferenceKind, ReferenceSite};
use crate::hir::refs::{
    AnnotationRef, Reference, ResourceTypeRef, SecuritySchemeRef, TraitRef, annotation_name,
};
use crate::hir::resource::{
    Method, MethodBase, MethodOwner, Resource, ResourceBase, Response, method_key,
};
use crate::hir::template::template_parameters;
use crate::hir::types::{
    AnnotationFacets, AnnotationTarget, ExampleSpec, LocationKind, ModelLocation, TypeDeclaration,
    TypeSource, is_builtin,
};
use crate::hir::uri::template_parameter_names;
use crate::parser::{TypeExpr, TypeExprError, is_inline_schema, parse_type_expr};
use crate::syntax::{DocumentKind, RawDocument, RawNode, Value};

/// Body name when neither the body, the API nor the config gives a media type.
const FALLBACK_BODY_NAME: &str = "body";

/// Keys of an example written in its expanded form.
const EXAMPLE_KEYS: &[&str] = &["value", "strict", "displayName", "description"];

/// Lower loaded documents into model data. `sources[0]` is the root.
pub(crate) fn lower_documents(
    sources: Vec<RawDocument>,
    config: ModelConfig,
    expanded: bool,
    diagnostics: Vec<Diagnostic>,
) -> ModelData {
    let mut lowerer = Lowerer::new(&sources, &config);
    lowerer.diagnostics.extend(diagnostics);
    for index in 0..sources.len() {
        lowerer.lower_document(DocId::new(index));
    }
    let Lowerer {
        documents,
        types,
        traits,
        resource_types,
        schemes,
        resources,
        methods,
        references,
        diagnostics,
        ..
    } = lowerer;

    ModelData {
        config,
        expanded,
        sources,
        documents,
        types,
        traits,
        resource_types,
        schemes,
        resources,
        methods,
        references,
        diagnostics: diagnostics.finish(),
    }
}

/// Where a type declaration appears and how its name is read.
#[derive(Debug, Clone, Copy)]
struct TypeContext {
    location: ModelLocation,
    kind: LocationKind,
    target: AnnotationTarget,
    /// `name?` marks the declaration optional.
    optional_marker: bool,
    is_body: bool,
    annotation_type: bool,
}

impl TypeContext {
    fn declaration() -> Self {
        Self {
            location: ModelLocation::Model,
            kind: LocationKind::Declarations,
            target: AnnotationTarget::TypeDeclaration,
            optional_marker: false,
            is_body: false,
            annotation_type: false,
        }
    }

    fn parameter(location: ModelLocation) -> Self {
        Self {
            location,
            kind: LocationKind::ApiStructure,
            target: AnnotationTarget::TypeDeclaration,
            optional_marker: true,
            is_body: false,
            annotation_type: false,
        }
    }

    fn body(target: AnnotationTarget) -> Self {
        Self {
            location: ModelLocation::Body,
            kind: LocationKind::ApiStructure,
            target,
            optional_marker: false,
            is_body: true,
            annotation_type: false,
        }
    }

    /// Context of a nested declaration (property, items, facet).
    fn nested(self, optional_marker: bool) -> Self {
        Self {
            kind: LocationKind::Models,
            target: AnnotationTarget::TypeDeclaration,
            optional_marker,
            is_body: false,
            annotation_type: false,
            ..self
        }
    }
}

struct Lowerer<'s> {
    sources: &'s [RawDocument],
    doc_ids: FxHashMap<&'s str, DocId>,
    default_media_type: String,

    documents: Vec<Document>,
    types: Vec<TypeDeclaration>,
    traits: Vec<Trait>,
    resource_types: Vec<ResourceType>,
    schemes: Vec<SecurityScheme>,
    resources: Vec<Resource>,
    methods: Vec<Method>,
    references: Vec<ReferenceSite>,
    diagnostics: DiagnosticCollector,

    doc: DocId,
    doc_path: Arc<str>,
}

impl<'s> Lowerer<'s> {
    fn new(sources: &'s [RawDocument], config: &ModelConfig) -> Self {
        let doc_ids = sources
            .iter()
            .enumerate()
            .map(|(i, source)| (source.path(), DocId::new(i)))
            .collect();
        let default_media_type = sources
            .first()
            .and_then(|root| root.root().get("mediaType"))
            .and_then(|media| media.string_list().into_iter().next())
            .or_else(|| config.default_media_type.clone())
            .unwrap_or_else(|| FALLBACK_BODY_NAME.to_string());

        Self {
            sources,
            doc_ids,
            default_media_type,
            documents: Vec::new(),
            types: Vec::new(),
            traits: Vec::new(),
            resource_types: Vec::new(),
            schemes: Vec::new(),
            resources: Vec::new(),
            methods: Vec::new(),
            references: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
            doc: DocId::ROOT,
            doc_path: Arc::from(""),
        }
    }

    // ========================================================================
    // DOCUMENTS
    // ========================================================================

    fn lower_document(&mut self, id: DocId) {
        let sources = self.sources;
        let source = &sources[id.index()];
        self.doc = id;
        self.doc_path = Arc::from(source.path());
        let root = RawNode::root(source.root());
        let mut doc = Document::new(id, source.kind(), source.path());

        for (namespace, path) in source.uses() {
            if let Some(&target) = self.doc_ids.get(path.as_str()) {
                doc.uses.insert(namespace.clone(), target);
            }
        }

        doc.title = root.attr_str("title").map(str::to_string);
        doc.description = root.attr_str("description").map(str::to_string);
        doc.version = root
            .attr("version")
            .filter(|v| !v.is_null())
            .map(|v| v.value().to_display_string());
        doc.base_uri = root.attr_str("baseUri").map(str::to_string);
        doc.protocols = string_list(&root, "protocols");
        doc.media_types = string_list(&root, "mediaType");
        doc.usage = root.attr_str("usage").map(str::to_string);
        doc.master_ref = root.attr_str("extends").map(str::to_string);
        doc.secured_by = self
            .lower_refs(root.attr("securedBy"), ReferenceKind::SecurityScheme)
            .into_iter()
            .map(SecuritySchemeRef::from)
            .collect();
        doc.documentation = self.lower_documentation(root.attr("documentation"));
        let target = match source.kind() {
            DocumentKind::Api => AnnotationTarget::Api,
            DocumentKind::Library => AnnotationTarget::Library,
            DocumentKind::Overlay => AnnotationTarget::Overlay,
            DocumentKind::Extension => AnnotationTarget::Extension,
        };
        doc.annotations = self.lower_annotations(&root, target);

        self.lower_type_declarations(&root, "types", &mut doc);
        self.lower_type_declarations(&root, "schemas", &mut doc);
        self.lower_annotation_types(&root, &mut doc);
        self.lower_traits(&root, &mut doc);
        self.lower_resource_types(&root, &mut doc);
        self.lower_security_schemes(&root, &mut doc);

        let declared = self.lower_params(root.attr("baseUriParameters"), ModelLocation::BaseUriParameter);
        doc.base_uri_parameters = match doc.base_uri.clone() {
            Some(base_uri) => self.pair_uri_parameters(
                &base_uri,
                &declared,
                &root.path().key("baseUriParameters"),
                ModelLocation::BaseUriParameter,
            ),
            None => declared,
        };

        if source.kind().is_api_like() {
            let entries: Vec<_> = root.entries().filter(|(k, _)| k.starts_with('/')).collect();
            for (key, node) in entries {
                let resource = self.lower_resource(key, node, None);
                doc.resources.push(resource);
            }
        }

        tracing::trace!(
            "[LOWER] '{}': {} types, {} traits, {} resource types, {} resources",
            source.path(),
            doc.types.len(),
            doc.traits.len(),
            doc.resource_types.len(),
            doc.resources.len()
        );
        self.documents.push(doc);
    }

    fn lower_documentation(&mut self, node: Option<RawNode<'s>>) -> Vec<DocumentationItem> {
        let Some(node) = node else {
            return Vec::new();
        };
        node.items()
            .into_iter()
            .map(|item| DocumentationItem {
                title: item.attr_str("title").unwrap_or_default().to_string(),
                content: item.attr_str("content").unwrap_or_default().to_string(),
                annotations: self.lower_annotations(&item, AnnotationTarget::DocumentationItem),
            })
            .collect()
    }

    fn lower_type_declarations(&mut self, root: &RawNode<'s>, key: &str, doc: &mut Document) {
        let Some(section) = root.attr(key) else {
            return;
        };
        let entries: Vec<_> = section.entries().collect();
        for (name, node) in entries {
            if is_builtin(name) {
                self.diagnostics.error(
                    &self.doc_path,
                    node.path(),
                    codes::RESERVED_NAME,
                    format!("'{name}' is a built-in type name and cannot be redeclared"),
                );
            }
            let existing = doc.types.get(name).or_else(|| doc.schemas.get(name)).copied();
            if let Some(existing) = existing {
                let existing_path = self.types[existing.index()].path.clone();
                self.diagnostics
                    .duplicate_declaration(&self.doc_path, node.path(), name, &existing_path);
                continue;
            }
            let id = self.lower_type(name, node, TypeContext::declaration());
            let map = if key == "schemas" {
                &mut doc.schemas
            } else {
                &mut doc.types
            };
            map.insert(Name::new(name), id);
        }
    }

    fn lower_annotation_types(&mut self, root: &RawNode<'s>, doc: &mut Document) {
        let Some(section) = root.attr("annotationTypes") else {
            return;
        };
        let entries: Vec<_> = section.entries().collect();
        for (name, node) in entries {
            let ctx = TypeContext {
                location: ModelLocation::Annotation,
                target: AnnotationTarget::AnnotationType,
                annotation_type: true,
                ..TypeContext::declaration()
            };
            let id = self.lower_type(name, node, ctx);
            doc.annotation_types.insert(Name::new(name), id);
        }
    }

    fn lower_traits(&mut self, root: &RawNode<'s>, doc: &mut Document) {
        let Some(section) = root.attr("traits") else {
            return;
        };
        let entries: Vec<_> = section.entries().collect();
        for (name, node) in entries {
            let id = TraitId::new(self.traits.len());
            let body = self.lower_method("", node.clone(), MethodOwner::Trait(id));
            self.traits.push(Trait {
                name: Name::new(name),
                doc: self.doc,
                path: node.path().clone(),
                usage: node.attr_str("usage").map(str::to_string),
                parameters: template_parameters(node.value()),
                body,
                raw: node.value().clone(),
            });
            doc.traits.insert(Name::new(name), id);
        }
    }

    fn lower_resource_types(&mut self, root: &RawNode<'s>, doc: &mut Document) {
        let Some(section) = root.attr("resourceTypes") else {
            return;
        };
        let entries: Vec<_> = section.entries().collect();
        for (name, node) in entries {
            let id = ResourceTypeId::new(self.resource_types.len());
            let base = self.lower_resource_base(
                &node,
                MethodOwner::ResourceType(id),
                AnnotationTarget::ResourceType,
            );
            self.resource_types.push(ResourceType {
                name: Name::new(name),
                doc: self.doc,
                path: node.path().clone(),
                usage: node.attr_str("usage").map(str::to_string),
                parameters: template_parameters(node.value()),
                base,
                raw: node.value().clone(),
            });
            doc.resource_types.insert(Name::new(name), id);
        }
    }

    fn lower_security_schemes(&mut self, root: &RawNode<'s>, doc: &mut Document) {
        let Some(section) = root.attr("securitySchemes") else {
            return;
        };
        let entries: Vec<_> = section.entries().collect();
        for (name, node) in entries {
            let id = SchemeId::new(self.schemes.len());
            let kind = node.attr_str("type").and_then(SecuritySchemeKind::parse);
            let described_by = node.attr("describedBy").map(|described| {
                self.lower_method("describedBy", described, MethodOwner::SecurityScheme(id))
            });
            let settings = node
                .attr("settings")
                .map(|settings| SecuritySchemeSettings::from_value(kind.as_ref(), settings.value()));
            let annotations = self.lower_annotations(&node, AnnotationTarget::SecurityScheme);
            self.schemes.push(SecurityScheme {
                name: Name::new(name),
                doc: self.doc,
                path: node.path().clone(),
                kind,
                display_name: node.attr_str("displayName").map(str::to_string),
                description: node.attr_str("description").map(str::to_string),
                described_by,
                settings,
                annotations,
            });
            doc.security_schemes.insert(Name::new(name), id);
        }
    }

    // ========================================================================
    // RESOURCES & METHODS
    // ========================================================================

    fn lower_resource(
        &mut self,
        key: &str,
        node: RawNode<'s>,
        parent: Option<ResourceId>,
    ) -> ResourceId {
        let id = ResourceId::new(self.resources.len());
        self.resources.push(Resource {
            relative_uri: key.to_string(),
            parent,
            children: Vec::new(),
            doc: self.doc,
            path: node.path().clone(),
            base: ResourceBase::default(),
            uri_parameters: Vec::new(),
        });

        let base = self.lower_resource_base(&node, MethodOwner::Resource(id), AnnotationTarget::Resource);
        let uri_parameters = self.pair_uri_parameters(
            key,
            &base.declared_uri_parameters,
            &node.path().key("uriParameters"),
            ModelLocation::UriParameter,
        );
        let children: Vec<_> = node.entries().filter(|(k, _)| k.starts_with('/')).collect();
        let children = children
            .into_iter()
            .map(|(child_key, child)| self.lower_resource(child_key, child, Some(id)))
            .collect();

        let resource = &mut self.resources[id.index()];
        resource.base = base;
        resource.uri_parameters = uri_parameters;
        resource.children = children;
        id
    }

    fn lower_resource_base(
        &mut self,
        node: &RawNode<'s>,
        owner: MethodOwner,
        target: AnnotationTarget,
    ) -> ResourceBase {
        let methods: Vec<_> = node
            .entries()
            .filter(|(k, _)| method_key(k).is_some())
            .collect();
        let methods = methods
            .into_iter()
            .map(|(key, method)| self.lower_method(key, method, owner))
            .collect();

        let type_ref = node.attr("type").and_then(|t| {
            let reference = Reference::from_value(t.value(), self.doc, t.path().clone())?;
            self.record_reference(ReferenceKind::ResourceType, &reference);
            Some(ResourceTypeRef::from(reference))
        });

        ResourceBase {
            display_name: node.attr_str("displayName").map(str::to_string),
            description: node.attr_str("description").map(str::to_string),
            methods,
            is: self
                .lower_refs(node.attr("is"), ReferenceKind::Trait)
                .into_iter()
                .map(TraitRef::from)
                .collect(),
            type_ref,
            secured_by: self
                .lower_refs(node.attr("securedBy"), ReferenceKind::SecurityScheme)
                .into_iter()
                .map(SecuritySchemeRef::from)
                .collect(),
            declared_uri_parameters: self
                .lower_params(node.attr("uriParameters"), ModelLocation::UriParameter),
            annotations: self.lower_annotations(node, target),
        }
    }

    fn lower_method(&mut self, key: &str, node: RawNode<'s>, owner: MethodOwner) -> MethodId {
        let (name, optional) = method_key(key).unwrap_or((key, false));
        let base = self.lower_method_base(&node);
        let id = MethodId::new(self.methods.len());
        self.methods.push(Method {
            method: Name::new(name),
            optional,
            owner,
            doc: self.doc,
            path: node.path().clone(),
            base,
        });
        id
    }

    fn lower_method_base(&mut self, node: &RawNode<'s>) -> MethodBase {
        let query_string = node.attr("queryString").map(|qs| {
            self.lower_type("queryString", qs, TypeContext::parameter(ModelLocation::Query))
        });
        let responses: Vec<_> = node
            .attr("responses")
            .map(|r| r.entries().collect())
            .unwrap_or_default();
        let responses = responses
            .into_iter()
            .map(|(code, response)| Response {
                code: Name::new(code),
                description: response.attr_str("description").map(str::to_string),
                headers: self.lower_params(response.attr("headers"), ModelLocation::Header),
                body: self.lower_body(response.attr("body"), AnnotationTarget::ResponseBody),
                annotations: self.lower_annotations(&response, AnnotationTarget::Response),
                path: response.path().clone(),
            })
            .collect();

        MethodBase {
            display_name: node.attr_str("displayName").map(str::to_string),
            description: node.attr_str("description").map(str::to_string),
            headers: self.lower_params(node.attr("headers"), ModelLocation::Header),
            query_parameters: self.lower_params(node.attr("queryParameters"), ModelLocation::Query),
            query_string,
            body: self.lower_body(node.attr("body"), AnnotationTarget::RequestBody),
            responses,
            protocols: string_list(node, "protocols"),
            is: self
                .lower_refs(node.attr("is"), ReferenceKind::Trait)
                .into_iter()
                .map(TraitRef::from)
                .collect(),
            secured_by: self
                .lower_refs(node.attr("securedBy"), ReferenceKind::SecurityScheme)
                .into_iter()
                .map(SecuritySchemeRef::from)
                .collect(),
            annotations: self.lower_annotations(node, AnnotationTarget::Method),
        }
    }

    fn lower_params(&mut self, node: Option<RawNode<'s>>, location: ModelLocation) -> Vec<TypeId> {
        let Some(node) = node else {
            return Vec::new();
        };
        let entries: Vec<_> = node.entries().collect();
        entries
            .into_iter()
            .map(|(name, param)| self.lower_type(name, param, TypeContext::parameter(location)))
            .collect()
    }

    fn lower_body(&mut self, node: Option<RawNode<'s>>, target: AnnotationTarget) -> Vec<TypeId> {
        let Some(node) = node else {
            return Vec::new();
        };
        let ctx = TypeContext::body(target);
        let by_media_type = node
            .value()
            .as_mapping()
            .is_some_and(|map| !map.is_empty() && map.keys().all(|k| k.contains('/')));
        if by_media_type {
            let entries: Vec<_> = node.entries().collect();
            entries
                .into_iter()
                .map(|(media_type, body)| self.lower_type(media_type, body, ctx))
                .collect()
        } else {
            let name = self.default_media_type.clone();
            vec![self.lower_type(&name, node, ctx)]
        }
    }

    /// Pair the `{name}` tokens of a URI template with declared parameters,
    /// synthesizing a `string` declaration for each undeclared token.
    /// Declared parameters missing from the template follow in declaration order.
    fn pair_uri_parameters(
        &mut self,
        template: &str,
        declared: &[TypeId],
        path: &NodePath,
        location: ModelLocation,
    ) -> Vec<TypeId> {
        let mut out = Vec::new();
        for name in template_parameter_names(template) {
            let explicit = declared
                .iter()
                .copied()
                .find(|id| self.types[id.index()].name == name);
            let id = match explicit {
                Some(id) => id,
                None => self.push_type(TypeDeclaration {
                    path: path.key(name.as_str()),
                    ..self.synthetic_declaration(&name, location)
                }),
            };
            out.push(id);
        }
        for &id in declared {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }

    fn synthetic_declaration(&self, name: &str, location: ModelLocation) -> TypeDeclaration {
        TypeDeclaration {
            name: Name::new(name),
            doc: self.doc,
            path: NodePath::root(),
            location,
            location_kind: LocationKind::ApiStructure,
            source: TypeSource::Default,
            declared_types: Vec::new(),
            inline: Vec::new(),
            properties: Vec::new(),
            pattern_properties: Vec::new(),
            items: None,
            facet_declarations: IndexMap::new(),
            required: true,
            repeat: false,
            display_name: None,
            description: None,
            default: None,
            examples: Vec::new(),
            annotations: Vec::new(),
            annotation: None,
            is_body: false,
            raw: Value::Null,
        }
    }

    // ========================================================================
    // TYPE DECLARATIONS
    // ========================================================================

    fn lower_type(&mut self, name: &str, node: RawNode<'s>, ctx: TypeContext) -> TypeId {
        let (name, optional) = match name.strip_suffix('?') {
            Some(stripped) if ctx.optional_marker => (stripped, true),
            _ => (name, false),
        };
        let mut decl = TypeDeclaration {
            path: node.path().clone(),
            location_kind: ctx.kind,
            required: !optional,
            is_body: ctx.is_body,
            raw: node.value().clone(),
            ..self.synthetic_declaration(name, ctx.location)
        };

        match node.value() {
            Value::Null => {}
            Value::String(_) | Value::Sequence(_) => {
                decl.source = self.lower_type_source(&node, name, ctx, &mut decl);
            }
            Value::Mapping(_) => self.lower_type_facets(&node, name, ctx, &mut decl),
            other => {
                decl.source = TypeSource::Invalid(TypeExprError {
                    message: format!("expected a type expression, found {}", other.type_name()),
                    range: TextRange::empty(TextSize::from(0)),
                });
            }
        }

        self.push_type(decl)
    }

    fn lower_type_facets(
        &mut self,
        node: &RawNode<'s>,
        name: &str,
        ctx: TypeContext,
        decl: &mut TypeDeclaration,
    ) {
        if let Some(source) = node.attr("type").or_else(|| node.attr("schema")) {
            decl.source = self.lower_type_source(&source, name, ctx, decl);
        }

        if let Some(properties) = node.attr("properties") {
            let entries: Vec<_> = properties.entries().collect();
            for (key, property) in entries {
                if let Some(pattern) = pattern_property(key) {
                    let id = self.lower_type(pattern, property, ctx.nested(false));
                    decl.pattern_properties.push((pattern.to_string(), id));
                } else {
                    decl.properties.push(self.lower_type(key, property, ctx.nested(true)));
                }
            }
        }
        if let Some(items) = node.attr("items") {
            decl.items = Some(self.lower_type("items", items, ctx.nested(false)));
        }
        if let Some(facets) = node.attr("facets") {
            let entries: Vec<_> = facets.entries().collect();
            for (key, facet) in entries {
                let id = self.lower_type(key, facet, ctx.nested(true));
                let facet_name = self.types[id.index()].name.clone();
                decl.facet_declarations.insert(facet_name, id);
            }
        }

        if let Some(required) = node.attr("required").and_then(|r| r.as_bool()) {
            decl.required = required;
        }
        decl.repeat = node.attr("repeat").and_then(|r| r.as_bool()).unwrap_or(false);
        decl.display_name = node.attr_str("displayName").map(str::to_string);
        decl.description = node.attr_str("description").map(str::to_string);
        decl.default = node.attr("default").map(|d| d.value().clone());

        if let Some(example) = node.attr("example") {
            decl.examples.push(lower_example(None, &example));
        }
        if let Some(examples) = node.attr("examples") {
            for (key, example) in examples.entries() {
                decl.examples.push(lower_example(Some(key), &example));
            }
        }

        decl.annotations = self.lower_annotations(node, ctx.target);

        if ctx.annotation_type {
            let mut facets = AnnotationFacets {
                usage: node.attr_str("usage").map(str::to_string),
                ..AnnotationFacets::default()
            };
            if let Some(targets) = node.attr("allowedTargets") {
                for target in targets.items() {
                    match target.as_str().and_then(AnnotationTarget::parse) {
                        Some(parsed) => facets.allowed_targets.push(parsed),
                        None => self.diagnostics.error(
                            &self.doc_path,
                            target.path(),
                            codes::INVALID_FACET,
                            format!(
                                "unknown annotation target {}",
                                target.value()
                            ),
                        ),
                    }
                }
            }
            decl.annotation = Some(facets);
        }
    }

    fn lower_type_source(
        &mut self,
        node: &RawNode<'s>,
        name: &str,
        ctx: TypeContext,
        decl: &mut TypeDeclaration,
    ) -> TypeSource {
        let mut exprs = Vec::new();
        for item in node.items() {
            match item.value() {
                Value::String(text) => {
                    decl.declared_types.push(text.clone());
                    if text.contains("<<") {
                        return TypeSource::Template(text.clone());
                    }
                    match self.parse_expr(text, &item) {
                        Ok(expr) => exprs.push(expr),
                        Err(error) => return TypeSource::Invalid(error),
                    }
                }
                Value::Mapping(_) => {
                    let inline = self.lower_type(name, item.clone(), ctx.nested(false));
                    exprs.push(TypeExpr::Inline(decl.inline.len() as u32));
                    decl.inline.push(inline);
                }
                other => {
                    return TypeSource::Invalid(TypeExprError {
                        message: format!("expected a type expression, found {}", other.type_name()),
                        range: TextRange::empty(TextSize::from(0)),
                    });
                }
            }
        }
        if exprs.is_empty() {
            TypeSource::Default
        } else {
            TypeSource::Exprs(exprs)
        }
    }

    fn parse_expr(&mut self, text: &str, node: &RawNode<'s>) -> Result<TypeExpr, TypeExprError> {
        if is_inline_schema(text) {
            return parse_type_expr(text);
        }
        let expr = parse_type_expr(text)?;
        for name in expr.names() {
            if !is_builtin(name) {
                self.references.push(ReferenceSite {
                    kind: ReferenceKind::Type,
                    name: name.clone(),
                    scope: self.doc,
                    path: node.path().clone(),
                });
            }
        }
        Ok(expr)
    }

    fn push_type(&mut self, decl: TypeDeclaration) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(decl);
        id
    }

    // ========================================================================
    // REFERENCES & ANNOTATIONS
    // ========================================================================

    fn lower_refs(&mut self, node: Option<RawNode<'s>>, kind: ReferenceKind) -> Vec<Reference> {
        let Some(node) = node else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for item in node.items() {
            if item.is_null() && kind != ReferenceKind::SecurityScheme {
                continue;
            }
            let Some(reference) = Reference::from_value(item.value(), self.doc, item.path().clone())
            else {
                continue;
            };
            self.record_reference(kind, &reference);
            out.push(reference);
        }
        out
    }

    fn record_reference(&mut self, kind: ReferenceKind, reference: &Reference) {
        let anonymous = kind == ReferenceKind::SecurityScheme && reference.name == "null";
        if anonymous || reference.name.contains("<<") {
            return;
        }
        self.references.push(ReferenceSite {
            kind,
            name: reference.name.clone(),
            scope: self.doc,
            path: reference.path.clone(),
        });
    }

    fn lower_annotations(&mut self, node: &RawNode<'s>, target: AnnotationTarget) -> Vec<AnnotationRef> {
        let entries: Vec<_> = node
            .entries()
            .filter_map(|(key, value)| annotation_name(key).map(|name| (name, value)))
            .collect();
        entries
            .into_iter()
            .map(|(name, value)| {
                let annotation =
                    AnnotationRef::new(name, value.value(), target, self.doc, value.path().clone());
                self.record_reference(ReferenceKind::AnnotationType, &annotation);
                annotation
            })
            .collect()
    }
}

/// `/regex/` property names.
fn pattern_property(key: &str) -> Option<&str> {
    if key.len() < 2 {
        return None;
    }
    key.strip_prefix('/')?.strip_suffix('/')
}

fn string_list(node: &RawNode<'_>, key: &str) -> Vec<String> {
    node.attr(key)
        .map(|n| n.value().string_list())
        .unwrap_or_default()
}

fn lower_example(name: Option<&str>, node: &RawNode<'_>) -> ExampleSpec {
    let value = node.value();
    let expanded = value.as_mapping().is_some_and(|map| {
        map.contains_key("value")
            && map
                .keys()
                .all(|k| EXAMPLE_KEYS.contains(&k.as_str()) || annotation_name(k).is_some())
    });
    if expanded {
        ExampleSpec {
            name: name.map(Name::new),
            display_name: node.attr_str("displayName").map(str::to_string),
            description: node.attr_str("description").map(str::to_string),
            strict: node.attr("strict").and_then(|s| s.as_bool()).unwrap_or(true),
            value: value.get("value").cloned().unwrap_or_default(),
            path: node.path().key("value"),
        }
    } else {
        ExampleSpec {
            name: name.map(Name::new),
            display_name: None,
            description: None,
            strict: true,
            value: value.clone(),
            path: node.path().clone(),
        }
    }
}
