//! URI templates, resource paths and inherited parameters.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RamlError;
use crate::hir::ids::{MethodId, ResourceId, TypeId};
use crate::hir::model::Model;
use crate::hir::refs::SecuritySchemeRef;
use crate::hir::resource::MethodOwner;

static URI_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("valid URI token pattern"));

/// `{name}` tokens of a URI template in order, each name once.
pub fn template_parameter_names(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in URI_TOKEN.captures_iter(template) {
        let name = caps[1].trim();
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

impl Model {
    /// Parameters of `baseUri`, in template order.
    pub fn base_uri_parameters(&self) -> &[TypeId] {
        &self.api().base_uri_parameters
    }

    /// Parameters of a resource's own relative URI.
    pub fn uri_parameters(&self, resource: ResourceId) -> &[TypeId] {
        &self.resource(resource).uri_parameters
    }

    /// Parameters of every relative URI from the top-level resource down,
    /// first declaration of a name wins.
    pub fn all_uri_parameters(&self, resource: ResourceId) -> Vec<TypeId> {
        self.collect_parameters(Vec::new(), resource)
    }

    /// Base URI parameters followed by [`Model::all_uri_parameters`],
    /// skipping names already taken.
    pub fn absolute_uri_parameters(&self, resource: ResourceId) -> Vec<TypeId> {
        self.collect_parameters(self.base_uri_parameters().to_vec(), resource)
    }

    fn collect_parameters(&self, mut out: Vec<TypeId>, resource: ResourceId) -> Vec<TypeId> {
        for id in self.resource_chain(resource) {
            for &param in &self.resource(id).uri_parameters {
                let name = &self.type_decl(param).name;
                if !out.iter().any(|&seen| self.type_decl(seen).name == *name) {
                    out.push(param);
                }
            }
        }
        out
    }

    /// The resource and its ancestors, outermost first.
    pub fn resource_chain(&self, resource: ResourceId) -> Vec<ResourceId> {
        let mut chain = vec![resource];
        let mut current = self.resource(resource).parent;
        while let Some(parent) = current {
            chain.push(parent);
            current = self.resource(parent).parent;
        }
        chain.reverse();
        chain
    }

    /// Concatenated relative URIs, e.g. `/users/{id}`.
    pub fn complete_relative_uri(&self, resource: ResourceId) -> String {
        self.resource_chain(resource)
            .into_iter()
            .map(|id| self.resource(id).relative_uri.as_str())
            .collect()
    }

    /// `baseUri` (without a trailing slash) plus the complete relative URI.
    pub fn absolute_uri(&self, resource: ResourceId) -> String {
        let base = self.api().base_uri.as_deref().unwrap_or("");
        format!(
            "{}{}",
            base.trim_end_matches('/'),
            self.complete_relative_uri(resource)
        )
    }

    /// Every resource, depth first in declaration order.
    pub fn all_resources(&self) -> Vec<ResourceId> {
        let mut out = Vec::new();
        let mut stack: Vec<ResourceId> = self.api().resources.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.resource(id).children.iter().rev().copied());
        }
        out
    }

    /// Child of `parent` (or a top-level resource) with the given relative URI.
    pub fn child_resource(&self, parent: Option<ResourceId>, relative_uri: &str) -> Option<ResourceId> {
        let candidates = match parent {
            Some(parent) => &self.resource(parent).children,
            None => &self.api().resources,
        };
        candidates
            .iter()
            .copied()
            .find(|&id| self.resource(id).relative_uri == relative_uri)
    }

    pub fn child_method(&self, resource: ResourceId, method: &str) -> Option<MethodId> {
        self.resource(resource)
            .base
            .methods
            .iter()
            .copied()
            .find(|&id| self.method(id).method == method)
    }

    /// Declared `protocols`, else the scheme of `baseUri` upper-cased.
    pub fn all_protocols(&self) -> Vec<String> {
        let api = self.api();
        if !api.protocols.is_empty() {
            return api.protocols.iter().map(|p| p.to_uppercase()).collect();
        }
        api.base_uri
            .as_deref()
            .and_then(|uri| uri.split_once("://"))
            .map(|(scheme, _)| vec![scheme.to_uppercase()])
            .unwrap_or_default()
    }

    /// Security in effect for a method: its own `securedBy`, else the
    /// resource's, else the API's.
    pub fn all_secured_by(&self, method: MethodId) -> Vec<SecuritySchemeRef> {
        let method = self.method(method);
        if !method.base.secured_by.is_empty() {
            return method.base.secured_by.clone();
        }
        let mut current = method.parent_resource();
        while let Some(id) = current {
            let resource = self.resource(id);
            if !resource.base.secured_by.is_empty() {
                return resource.base.secured_by.clone();
            }
            current = resource.parent;
        }
        self.api().secured_by.clone()
    }

    /// Stable identifier of a method: `"/users/{id} get"` for resource
    /// methods, `"collection get"` for resource type methods.
    pub fn method_id(&self, method: MethodId) -> Result<String, RamlError> {
        if !self.contains_method(method) {
            return Err(RamlError::invalid_usage(format!(
                "{method:?} does not belong to this model"
            )));
        }
        let decl = self.method(method);
        match decl.owner {
            MethodOwner::Resource(resource) => Ok(format!(
                "{} {}",
                self.complete_relative_uri(resource),
                decl.method
            )),
            MethodOwner::ResourceType(rt) => {
                Ok(format!("{} {}", self.resource_type(rt).name, decl.method))
            }
            MethodOwner::Trait(_) | MethodOwner::SecurityScheme(_) => {
                Err(RamlError::invalid_usage(format!(
                    "method '{}' belongs to neither a resource nor a resource type",
                    decl.method
                )))
            }
        }
    }
}
