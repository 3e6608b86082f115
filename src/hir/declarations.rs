//! Traits, resource types and security schemes.

use std::fmt;

use crate::base::{Name, NodePath};
use crate::hir::ids::{DocId, MethodId};
use crate::hir::refs::AnnotationRef;
use crate::hir::resource::ResourceBase;
use crate::syntax::Value;

/// A named, parametrized fragment of method shape.
#[derive(Debug, Clone)]
pub struct Trait {
    pub name: Name,
    pub doc: DocId,
    pub path: NodePath,
    pub usage: Option<String>,
    /// `<<parameters>>` used by the body, reserved ones excluded.
    pub parameters: Vec<Name>,
    /// The body lowered as a method owned by this trait.
    pub body: MethodId,
    /// The body as written, the input of expansion.
    pub raw: Value,
}

impl Trait {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A named, parametrized fragment of resource shape.
#[derive(Debug, Clone)]
pub struct ResourceType {
    pub name: Name,
    pub doc: DocId,
    pub path: NodePath,
    pub usage: Option<String>,
    pub parameters: Vec<Name>,
    pub base: ResourceBase,
    pub raw: Value,
}

impl ResourceType {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The `type` of a security scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecuritySchemeKind {
    OAuth1,
    OAuth2,
    Basic,
    Digest,
    PassThrough,
    /// `x-{other}`
    Custom(String),
}

impl SecuritySchemeKind {
    pub fn parse(kind: &str) -> Option<Self> {
        Some(match kind {
            "OAuth 1.0" => Self::OAuth1,
            "OAuth 2.0" => Self::OAuth2,
            "Basic Authentication" => Self::Basic,
            "Digest Authentication" => Self::Digest,
            "Pass Through" => Self::PassThrough,
            other if other.starts_with("x-") => Self::Custom(other.to_string()),
            _ => return None,
        })
    }
}

impl fmt::Display for SecuritySchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OAuth1 => f.write_str("OAuth 1.0"),
            Self::OAuth2 => f.write_str("OAuth 2.0"),
            Self::Basic => f.write_str("Basic Authentication"),
            Self::Digest => f.write_str("Digest Authentication"),
            Self::PassThrough => f.write_str("Pass Through"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuth1Settings {
    pub request_token_uri: Option<String>,
    pub authorization_uri: Option<String>,
    pub token_credentials_uri: Option<String>,
    pub signatures: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OAuth2Settings {
    pub access_token_uri: Option<String>,
    pub authorization_uri: Option<String>,
    pub authorization_grants: Vec<String>,
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PassThroughSettings {
    pub query_parameter_name: Option<String>,
    pub header_name: Option<String>,
}

/// `settings` of a security scheme, typed by the scheme kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SecuritySchemeSettings {
    OAuth1(OAuth1Settings),
    OAuth2(OAuth2Settings),
    PassThrough(PassThroughSettings),
    /// Settings of Basic, Digest and custom schemes, kept as written.
    Other(Value),
}

impl SecuritySchemeSettings {
    pub(crate) fn from_value(kind: Option<&SecuritySchemeKind>, value: &Value) -> Self {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let list = |key: &str| value.get(key).map(Value::string_list).unwrap_or_default();
        match kind {
            Some(SecuritySchemeKind::OAuth1) => Self::OAuth1(OAuth1Settings {
                request_token_uri: text("requestTokenUri"),
                authorization_uri: text("authorizationUri"),
                token_credentials_uri: text("tokenCredentialsUri"),
                signatures: list("signatures"),
            }),
            Some(SecuritySchemeKind::OAuth2) => Self::OAuth2(OAuth2Settings {
                access_token_uri: text("accessTokenUri"),
                authorization_uri: text("authorizationUri"),
                authorization_grants: list("authorizationGrants"),
                scopes: list("scopes"),
            }),
            Some(SecuritySchemeKind::PassThrough) => Self::PassThrough(PassThroughSettings {
                query_parameter_name: text("queryParameterName"),
                header_name: text("headerName"),
            }),
            _ => Self::Other(value.clone()),
        }
    }
}

/// A security scheme declaration.
#[derive(Debug, Clone)]
pub struct SecurityScheme {
    pub name: Name,
    pub doc: DocId,
    pub path: NodePath,
    /// `None` when `type` is missing or not a known scheme kind.
    pub kind: Option<SecuritySchemeKind>,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// `describedBy`, lowered as a method owned by this scheme.
    pub described_by: Option<MethodId>,
    pub settings: Option<SecuritySchemeSettings>,
    pub annotations: Vec<AnnotationRef>,
}

impl SecurityScheme {
    pub fn name(&self) -> &str {
        &self.name
    }
}
