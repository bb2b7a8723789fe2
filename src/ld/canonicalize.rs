// Copyright 2025 Fondazione LINKS

// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at

//     http://www.apache.org/licenses/LICENSE-2.0

// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.


use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use super::loader::DocumentLoader;
use crate::errors::Error;

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
pub const XSD_PREFIX: &str = "http://www.w3.org/2001/XMLSchema#";
/// Prefix of the skolem identifiers given to blank nodes before a document is framed
pub const BNID_PREFIX: &str = "urn:bnid:";

const MAX_CONTEXT_DEPTH: usize = 8;

/// An ordered, index-addressable set of canonical statements.
///
/// Statements are kept sorted and de-duplicated, so the position of a statement depends only on the
/// content of the set and never on the layout of the source document.
#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub struct CanonicalStatementSet {
    statements: Vec<String>,
}

impl CanonicalStatementSet {
    pub fn from_statements<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut statements: Vec<String> = statements.into_iter().map(Into::into).collect();
        statements.sort();
        statements.dedup();
        Self { statements }
    }

    /// Parses one statement per line, ignoring blank lines.
    pub fn from_nquads(text: &str) -> Self {
        Self::from_statements(text.lines().map(str::trim).filter(|l| !l.is_empty()))
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.statements.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.statements.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.statements
    }

    pub fn position(&self, statement: &str) -> Option<usize> {
        self.statements.binary_search_by(|s| s.as_str().cmp(statement)).ok()
    }

    /// Statements as BBS messages, in order.
    pub fn to_messages(&self) -> Vec<Vec<u8>> {
        self.statements.iter().map(|s| s.as_bytes().to_vec()).collect()
    }

    /// Returns the statements at `indexes`.
    pub fn select(&self, indexes: &[usize]) -> Result<CanonicalStatementSet, Error> {
        let selected = indexes
            .iter()
            .map(|&i| {
                self.statements
                    .get(i)
                    .cloned()
                    .ok_or_else(|| Error::FrameMismatch(format!("index {} out of bounds for {} statements", i, self.len())))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_statements(selected))
    }

    pub fn to_nquads(&self) -> String {
        self.statements.iter().map(|s| format!("{}\n", s)).collect()
    }
}

/// Turns a JSON document into its canonical statement set.
pub trait Canonicalizer: Send + Sync {
    fn canonicalize(&self, document: &Value, loader: &dyn DocumentLoader) -> Result<CanonicalStatementSet, Error>;
}

/// Built-in [`Canonicalizer`] emitting N-Triples-like statements.
///
/// Supports a small subset of JSON-LD: remote and inline contexts, term definitions with `@id`, `@type`
/// and scoped `@context`, compact IRIs, `@vocab`, value objects and native literals. Terms that cannot
/// be expanded are reported as [`Error::InvalidDocument`].
#[derive(Clone, Copy, Default, Debug)]
pub struct StatementCanonicalizer;

impl Canonicalizer for StatementCanonicalizer {
    fn canonicalize(&self, document: &Value, loader: &dyn DocumentLoader) -> Result<CanonicalStatementSet, Error> {
        let skolemized = skolemize(document)?;
        let root = skolemized
            .as_object()
            .ok_or_else(|| Error::InvalidDocument("document must be a JSON object".to_owned()))?;

        let mut emitter = Emitter { loader, statements: Vec::new() };
        emitter.emit_node(root, &ActiveContext::default())?;

        let set = CanonicalStatementSet::from_statements(emitter.statements);
        log::debug!("canonicalized document into {} statements", set.len());
        Ok(set)
    }
}

/// Gives every blank node of `document` a `urn:bnid:_:c14nN` identifier.
///
/// Nodes are labelled depth first, visiting properties in key order and array items in the order of
/// their content, so reordering an array does not change the labels. Labels already present in the
/// document are kept and never reused, so skolemizing twice yields the same document.
pub fn skolemize(document: &Value) -> Result<Value, Error> {
    let root = document
        .as_object()
        .ok_or_else(|| Error::InvalidDocument("document must be a JSON object".to_owned()))?;

    let mut existing = HashSet::new();
    collect_skolem_labels(document, &mut existing);

    let mut labeler = BlankNodeLabeler { next: 0, existing, renamed: HashMap::new() };
    let mut root = root.clone();
    labeler.label_node(&mut root);

    let mut skolemized = Value::Object(root);
    if !labeler.renamed.is_empty() {
        labeler.rewrite_references(&mut skolemized);
    }
    Ok(skolemized)
}

fn collect_skolem_labels(value: &Value, labels: &mut HashSet<String>) {
    match value {
        Value::String(s) => {
            if let Some(label) = s.strip_prefix(BNID_PREFIX).and_then(|b| b.strip_prefix("_:")) {
                labels.insert(label.to_owned());
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_skolem_labels(v, labels)),
        Value::Object(map) => map
            .iter()
            .filter(|(k, _)| k.as_str() != "@context")
            .for_each(|(_, v)| collect_skolem_labels(v, labels)),
        _ => {}
    }
}

struct BlankNodeLabeler {
    next: usize,
    existing: HashSet<String>,
    renamed: HashMap<String, String>,
}

impl BlankNodeLabeler {
    fn next_label(&mut self) -> String {
        loop {
            let label = format!("c14n{}", self.next);
            self.next += 1;
            if !self.existing.contains(&label) {
                return label;
            }
        }
    }

    fn rename(&mut self, blank: &str) -> String {
        if let Some(label) = self.renamed.get(blank) {
            return label.clone();
        }
        let label = self.next_label();
        self.renamed.insert(blank.to_owned(), label.clone());
        label
    }

    fn label_node(&mut self, node: &mut Map<String, Value>) {
        let id_key = if node.contains_key("@id") { "@id" } else { "id" };
        match node.get(id_key) {
            None => {
                let label = self.next_label();
                node.insert("id".to_owned(), Value::String(format!("{}_:{}", BNID_PREFIX, label)));
            }
            Some(Value::String(id)) if id.starts_with("_:") => {
                let label = self.rename(id);
                node.insert(id_key.to_owned(), Value::String(format!("{}_:{}", BNID_PREFIX, label)));
            }
            _ => {}
        }

        let mut keys: Vec<String> = node.keys().filter(|k| !is_id_or_context(k)).cloned().collect();
        keys.sort();
        for key in keys {
            if let Some(value) = node.get_mut(&key) {
                self.label_value(value);
            }
        }
    }

    fn label_value(&mut self, value: &mut Value) {
        match value {
            Value::Array(items) => {
                // labels follow content order, not array order
                let mut order: Vec<(String, usize)> = items.iter().map(content_key).zip(0..).collect();
                order.sort();
                for (_, i) in order {
                    self.label_value(&mut items[i]);
                }
            }
            Value::Object(map) if !is_value_object(map) => self.label_node(map),
            _ => {}
        }
    }

    fn rewrite_references(&self, value: &mut Value) {
        match value {
            Value::String(s) => {
                if let Some(label) = self.renamed.get(s.as_str()) {
                    *s = format!("{}_:{}", BNID_PREFIX, label);
                }
            }
            Value::Array(items) => items.iter_mut().for_each(|v| self.rewrite_references(v)),
            Value::Object(map) => map
                .iter_mut()
                .filter(|(k, _)| k.as_str() != "@context")
                .for_each(|(_, v)| self.rewrite_references(v)),
            _ => {}
        }
    }
}

/// Serialized form of `value` with blank node identifiers removed.
fn content_key(value: &Value) -> String {
    fn strip(value: &Value) -> Value {
        match value {
            Value::Array(items) => Value::Array(items.iter().map(strip).collect()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .filter(|(k, v)| !(matches!(k.as_str(), "id" | "@id") && v.as_str().map_or(false, |id| id.starts_with("_:"))))
                    .map(|(k, v)| (k.clone(), strip(v)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
    strip(value).to_string()
}

fn is_id_or_context(key: &str) -> bool {
    matches!(key, "id" | "@id" | "@context")
}

fn is_value_object(map: &Map<String, Value>) -> bool {
    map.contains_key("@value")
}

#[derive(Clone, Debug)]
struct TermDefinition {
    id: String,
    type_mapping: Option<String>,
    context: Option<Value>,
}

#[derive(Clone, Default, Debug)]
struct ActiveContext {
    terms: HashMap<String, TermDefinition>,
    vocab: Option<String>,
}

impl ActiveContext {
    fn process(&mut self, context: &Value, loader: &dyn DocumentLoader, depth: usize) -> Result<(), Error> {
        if depth > MAX_CONTEXT_DEPTH {
            return Err(Error::InvalidDocument("context nesting too deep".to_owned()));
        }

        match context {
            Value::Null => *self = ActiveContext::default(),
            Value::String(url) => {
                let remote = loader.load(url)?;
                let inner = remote.document.get("@context").unwrap_or(&remote.document);
                self.process(inner, loader, depth + 1)?;
            }
            Value::Array(items) => {
                for item in items {
                    self.process(item, loader, depth + 1)?;
                }
            }
            Value::Object(definitions) => {
                for (term, definition) in definitions {
                    self.define(term, definition)?;
                }
            }
            other => return Err(Error::InvalidDocument(format!("invalid context entry: {}", other))),
        }
        Ok(())
    }

    fn define(&mut self, term: &str, definition: &Value) -> Result<(), Error> {
        if term == "@vocab" {
            self.vocab = match definition.as_str() {
                Some(v) => Some(self.expand_iri(v, true).unwrap_or_else(|| v.to_owned())),
                None => None,
            };
            return Ok(());
        }
        if term.starts_with('@') {
            return Ok(());
        }

        match definition {
            Value::Null => {
                self.terms.remove(term);
            }
            // keyword aliases such as `"id": "@id"` are always honoured
            Value::String(id) if id.starts_with('@') => {}
            Value::String(id) => {
                self.terms.insert(
                    term.to_owned(),
                    TermDefinition { id: id.clone(), type_mapping: None, context: None },
                );
            }
            Value::Object(def) => {
                let id = def.get("@id").and_then(Value::as_str).unwrap_or(term);
                self.terms.insert(
                    term.to_owned(),
                    TermDefinition {
                        id: id.to_owned(),
                        type_mapping: def.get("@type").and_then(Value::as_str).map(str::to_owned),
                        context: def.get("@context").cloned(),
                    },
                );
            }
            other => return Err(Error::InvalidDocument(format!("invalid definition for term {}: {}", term, other))),
        }
        Ok(())
    }

    fn expand_iri(&self, value: &str, vocab: bool) -> Option<String> {
        self.expand_iri_at(value, vocab, 0)
    }

    fn expand_iri_at(&self, value: &str, vocab: bool, depth: usize) -> Option<String> {
        if depth > MAX_CONTEXT_DEPTH {
            return None;
        }
        if value.starts_with('@') {
            return Some(value.to_owned());
        }

        if vocab {
            if let Some(def) = self.terms.get(value) {
                if def.id != value {
                    return self.expand_iri_at(&def.id, true, depth + 1);
                }
            }
        }

        if let Some((prefix, suffix)) = value.split_once(':') {
            if prefix == "_" || suffix.starts_with("//") {
                return Some(value.to_owned());
            }
            if let Some(def) = self.terms.get(prefix) {
                let base = self.expand_iri_at(&def.id, true, depth + 1)?;
                return Some(format!("{}{}", base, suffix));
            }
            return Some(value.to_owned());
        }

        match (&self.vocab, vocab) {
            (Some(v), true) => Some(format!("{}{}", v, value)),
            _ => None,
        }
    }

    fn expand_datatype(&self, datatype: &str) -> Result<String, Error> {
        self.expand_iri(datatype, true)
            .filter(|iri| iri.contains(':'))
            .ok_or_else(|| Error::InvalidDocument(format!("undefined datatype: {}", datatype)))
    }
}

struct Emitter<'a> {
    loader: &'a dyn DocumentLoader,
    statements: Vec<String>,
}

impl Emitter<'_> {
    fn push(&mut self, subject: &str, predicate: &str, object: &str) {
        self.statements.push(format!("{} <{}> {} .", subject, predicate, object));
    }

    fn emit_node(&mut self, node: &Map<String, Value>, parent: &ActiveContext) -> Result<String, Error> {
        let mut ctx = parent.clone();
        if let Some(local) = node.get("@context") {
            ctx.process(local, self.loader, 0)?;
        }

        let types = node_types(node)?;

        let mut scoped: Vec<&String> = types.iter().collect();
        scoped.sort();
        for t in scoped {
            if let Some(context) = ctx.terms.get(t.as_str()).and_then(|d| d.context.clone()) {
                ctx.process(&context, self.loader, 0)?;
            }
        }

        let id = node
            .get("@id")
            .or_else(|| node.get("id"))
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidDocument("node identifier must be a string".to_owned()))?;
        let subject = node_reference(id, &ctx)?;

        for t in &types {
            let iri = ctx
                .expand_iri(t, true)
                .filter(|iri| iri.contains(':'))
                .ok_or_else(|| Error::InvalidDocument(format!("undefined type: {}", t)))?;
            self.push(&subject, RDF_TYPE, &format!("<{}>", iri));
        }

        let mut keys: Vec<&String> = node
            .keys()
            .filter(|k| !matches!(k.as_str(), "@context" | "id" | "@id" | "type" | "@type"))
            .collect();
        keys.sort();

        for key in keys {
            if key.starts_with('@') {
                return Err(Error::InvalidDocument(format!("unsupported keyword: {}", key)));
            }

            let predicate = ctx
                .expand_iri(key, true)
                .filter(|iri| iri.contains(':'))
                .ok_or_else(|| Error::InvalidDocument(format!("undefined term: {}", key)))?;

            let definition = ctx.terms.get(key.as_str()).cloned();
            let mut value_ctx = ctx.clone();
            if let Some(context) = definition.as_ref().and_then(|d| d.context.as_ref()) {
                value_ctx.process(context, self.loader, 0)?;
            }
            let type_mapping = definition.and_then(|d| d.type_mapping);

            let values = match &node[key.as_str()] {
                Value::Array(items) => items.iter().collect::<Vec<_>>(),
                single => vec![single],
            };
            for value in values {
                if let Some(object) = self.emit_value(value, type_mapping.as_deref(), &value_ctx)? {
                    self.push(&subject, &predicate, &object);
                }
            }
        }

        Ok(subject)
    }

    fn emit_value(&mut self, value: &Value, type_mapping: Option<&str>, ctx: &ActiveContext) -> Result<Option<String>, Error> {
        let datatype = match type_mapping {
            Some(t) if !t.starts_with('@') => Some(ctx.expand_datatype(t)?),
            _ => None,
        };

        let object = match value {
            Value::Null => return Ok(None),
            Value::Bool(b) => literal(&b.to_string(), Some(datatype.as_deref().unwrap_or(&xsd("boolean")))),
            Value::Number(n) => match (&datatype, n.as_f64()) {
                (Some(dt), _) => literal(&n.to_string(), Some(dt)),
                _ if n.is_i64() || n.is_u64() => literal(&n.to_string(), Some(&xsd("integer"))),
                (None, Some(f)) => literal(&format!("{:E}", f), Some(&xsd("double"))),
                (None, None) => return Err(Error::InvalidDocument(format!("unsupported number: {}", n))),
            },
            Value::String(s) => match type_mapping {
                Some("@id") => node_reference(s, ctx)?,
                Some("@vocab") => match ctx.expand_iri(s, true) {
                    Some(iri) if iri.contains(':') => format!("<{}>", iri),
                    _ => return Err(Error::InvalidDocument(format!("undefined vocabulary term: {}", s))),
                },
                _ => literal(s, datatype.as_deref()),
            },
            Value::Object(map) if is_value_object(map) => value_object(map, ctx)?,
            Value::Object(map) if map.contains_key("@list") || map.contains_key("@set") => {
                return Err(Error::InvalidDocument("lists and sets are not supported".to_owned()))
            }
            Value::Object(map) => self.emit_node(map, ctx)?,
            Value::Array(_) => return Err(Error::InvalidDocument("nested arrays are not supported".to_owned())),
        };
        Ok(Some(object))
    }
}

fn node_types(node: &Map<String, Value>) -> Result<Vec<String>, Error> {
    let mut types = Vec::new();
    for key in ["type", "@type"] {
        match node.get(key) {
            None => {}
            Some(Value::String(t)) => types.push(t.clone()),
            Some(Value::Array(items)) => {
                for item in items {
                    let t = item
                        .as_str()
                        .ok_or_else(|| Error::InvalidDocument(format!("type must be a string, got {}", item)))?;
                    types.push(t.to_owned());
                }
            }
            Some(other) => return Err(Error::InvalidDocument(format!("type must be a string, got {}", other))),
        }
    }
    Ok(types)
}

fn node_reference(id: &str, ctx: &ActiveContext) -> Result<String, Error> {
    if let Some(blank) = id.strip_prefix(BNID_PREFIX).filter(|b| b.starts_with("_:")) {
        return Ok(blank.to_owned());
    }
    if id.starts_with("_:") {
        return Ok(id.to_owned());
    }
    match ctx.expand_iri(id, false) {
        Some(iri) if iri.contains(':') => Ok(format!("<{}>", iri)),
        _ => Err(Error::InvalidDocument(format!("relative identifier: {}", id))),
    }
}

fn value_object(map: &Map<String, Value>, ctx: &ActiveContext) -> Result<String, Error> {
    let value = match &map["@value"] {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => return Err(Error::InvalidDocument(format!("invalid @value: {}", other))),
    };

    if let Some(language) = map.get("@language").and_then(Value::as_str) {
        return Ok(format!("\"{}\"@{}", escape(&value), language.to_lowercase()));
    }

    let datatype = match map.get("@type").and_then(Value::as_str) {
        Some(t) => Some(ctx.expand_datatype(t)?),
        None => None,
    };
    Ok(literal(&value, datatype.as_deref()))
}

fn xsd(name: &str) -> String {
    format!("{}{}", XSD_PREFIX, name)
}

fn literal(value: &str, datatype: Option<&str>) -> String {
    match datatype {
        Some(dt) if dt != xsd("string") => format!("\"{}\"^^<{}>", escape(value), dt),
        _ => format!("\"{}\"", escape(value)),
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            c => escaped.push(c),
        }
    }
    escaped
}
