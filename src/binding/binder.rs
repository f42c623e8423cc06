//! Binder that turns annotations into rule sets.

use super::error::BindingError;
use crate::document::{Annotation, Document, NodeId, Position};
use crate::rules::{kind_name, Combinator, Mode, PredicateRegistry, Rule, RuleSet};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, trace};

const DESCRIPTION_KEY: &str = "description";

/// Rule sets bound to one node. `assert` and `validate` rules are never
/// merged.
#[derive(Clone, Debug, Default)]
pub struct NodeRuleSets {
    fail_fast: Option<RuleSet>,
    deferred: Option<RuleSet>,
}

impl NodeRuleSets {
    pub fn fail_fast(&self) -> Option<&RuleSet> {
        self.fail_fast.as_ref()
    }

    pub fn deferred(&self) -> Option<&RuleSet> {
        self.deferred.as_ref()
    }

    pub fn get(&self, mode: Mode) -> Option<&RuleSet> {
        match mode {
            Mode::FailFast => self.fail_fast(),
            Mode::Deferred => self.deferred(),
        }
    }
}

/// Side table from node identity to its rule sets.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    sets: BTreeMap<NodeId, NodeRuleSets>,
}

impl Bindings {
    pub fn get(&self, node: NodeId) -> Option<&NodeRuleSets> {
        self.sets.get(&node)
    }

    /// Rule set of the given mode bound to `node`, if any.
    pub fn rule_set(&self, node: NodeId, mode: Mode) -> Option<&RuleSet> {
        self.sets.get(&node).and_then(|sets| sets.get(mode))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &NodeRuleSets)> {
        self.sets.iter().map(|(id, sets)| (*id, sets))
    }

    /// Number of nodes with at least one rule set.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

/// Rules gathered for one mode on one node.
#[derive(Default)]
struct Pending {
    rules: Vec<Rule>,
    declared_at: Option<Position>,
}

impl Pending {
    fn add(&mut self, annotation: &Annotation, rules: Vec<Rule>) {
        if self.declared_at.is_none() {
            self.declared_at = Some(annotation.position().clone());
        }
        self.rules.extend(rules);
    }

    fn finish(self, mode: Mode) -> Option<RuleSet> {
        if self.rules.is_empty() {
            return None;
        }
        Some(RuleSet::new(
            mode,
            self.rules,
            self.declared_at.unwrap_or_default(),
        ))
    }
}

/// Binds validation annotations to rule sets.
///
/// # Example
///
/// ```rust
/// use docval::binding::Binder;
/// use docval::document::{Annotation, DocumentBuilder, Position};
/// use docval::rules::{Mode, PredicateRegistry};
/// use serde_json::json;
///
/// let mut b = DocumentBuilder::new();
/// let port = b.scalar(json!(80), Position::new("values.yml", 1));
/// b.annotate(port, Annotation::new("assert", vec![json!({"min": 1024})]));
/// let doc = b.build(port).unwrap();
///
/// let registry = PredicateRegistry::with_builtins();
/// let bindings = Binder::new(&registry).bind(&doc).unwrap();
/// assert!(bindings.rule_set(doc.root(), Mode::FailFast).is_some());
/// ```
pub struct Binder<'a> {
    registry: &'a PredicateRegistry,
    assert_annotation: String,
    validate_annotation: String,
    predicate_shorthand: bool,
}

impl<'a> Binder<'a> {
    pub fn new(registry: &'a PredicateRegistry) -> Self {
        Self {
            registry,
            assert_annotation: "assert".to_string(),
            validate_annotation: "validate".to_string(),
            predicate_shorthand: true,
        }
    }

    /// Annotation names that declare fail-fast and deferred rules.
    pub fn annotation_names(
        mut self,
        assert_annotation: impl Into<String>,
        validate_annotation: impl Into<String>,
    ) -> Self {
        self.assert_annotation = assert_annotation.into();
        self.validate_annotation = validate_annotation.into();
        self
    }

    /// Whether an annotation named after a predicate binds as a deferred leaf.
    pub fn predicate_shorthand(mut self, enabled: bool) -> Self {
        self.predicate_shorthand = enabled;
        self
    }

    /// Bind every annotated node, stopping at the first malformed one in
    /// document order.
    pub fn bind(&self, document: &Document) -> Result<Bindings, BindingError> {
        let mut bindings = Bindings::default();

        for id in document.pre_order() {
            let node = document.node(id);
            let position = node.position();
            let mut fail_fast = Pending::default();
            let mut deferred = Pending::default();

            for annotation in node.annotations() {
                let name = annotation.name();
                if name == self.assert_annotation {
                    fail_fast.add(annotation, self.annotation_rules(annotation, position)?);
                } else if name == self.validate_annotation {
                    deferred.add(annotation, self.annotation_rules(annotation, position)?);
                } else if self.predicate_shorthand && self.registry.contains(name) {
                    let rule = self.leaf(name, annotation.args().to_vec(), position)?;
                    deferred.add(annotation, vec![rule]);
                } else {
                    trace!(node = %id, annotation = name, "ignoring unrelated annotation");
                }
            }

            let sets = NodeRuleSets {
                fail_fast: fail_fast.finish(Mode::FailFast),
                deferred: deferred.finish(Mode::Deferred),
            };
            if sets.fail_fast.is_some() || sets.deferred.is_some() {
                trace!(node = %id, %position, "bound rule sets");
                bindings.sets.insert(id, sets);
            }
        }

        debug!(
            nodes = document.len(),
            bound = bindings.len(),
            "bound validation annotations"
        );
        Ok(bindings)
    }

    fn annotation_rules(
        &self,
        annotation: &Annotation,
        position: &Position,
    ) -> Result<Vec<Rule>, BindingError> {
        if annotation.args().is_empty() {
            return Err(BindingError::EmptyAnnotation {
                position: position.clone(),
                annotation: annotation.name().to_string(),
            });
        }

        annotation
            .args()
            .iter()
            .map(|spec| self.parse_rule(spec, position))
            .collect()
    }

    /// Interpret one resolved rule spec.
    ///
    /// `"name"` is a leaf without arguments; `{"name": args}` a leaf with
    /// arguments (`null` for none, a sequence for several, anything else for
    /// one); `{"and"|"or"|"one_of"|"not": [specs]}` a composite. Objects may
    /// also carry a `"description"` string.
    fn parse_rule(&self, spec: &Value, position: &Position) -> Result<Rule, BindingError> {
        match spec {
            Value::String(name) => self.leaf(name, Vec::new(), position),
            Value::Object(entries) => self.parse_object(entries, position),
            other => Err(malformed(
                position,
                format!("expected a rule name or mapping, found {}", kind_name(other)),
            )),
        }
    }

    fn parse_object(
        &self,
        entries: &Map<String, Value>,
        position: &Position,
    ) -> Result<Rule, BindingError> {
        let description = match entries.get(DESCRIPTION_KEY) {
            None => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(other) => {
                return Err(malformed(
                    position,
                    format!("description must be a string, found {}", kind_name(other)),
                ))
            }
        };

        let keys: Vec<(&String, &Value)> = entries
            .iter()
            .filter(|(key, _)| key.as_str() != DESCRIPTION_KEY)
            .collect();
        let (key, body) = match keys.as_slice() {
            [entry] => *entry,
            [] => return Err(malformed(position, "mapping names no rule".to_string())),
            many => {
                let names: Vec<&str> = many.iter().map(|(k, _)| k.as_str()).collect();
                return Err(malformed(
                    position,
                    format!("mapping names more than one rule: {}", names.join(", ")),
                ));
            }
        };

        let rule = match Combinator::from_keyword(key) {
            Some(combinator) => {
                let Value::Array(specs) = body else {
                    return Err(malformed(
                        position,
                        format!("'{key}' expects a sequence of rules, found {}", kind_name(body)),
                    ));
                };
                let children = specs
                    .iter()
                    .map(|child| self.parse_rule(child, position))
                    .collect::<Result<Vec<_>, _>>()?;
                Rule::composite(combinator, children).map_err(|source| {
                    BindingError::InvalidRule {
                        position: position.clone(),
                        source,
                    }
                })?
            }
            None => {
                let args = match body {
                    Value::Null => Vec::new(),
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                self.leaf(key, args, position)?
            }
        };

        Ok(match description {
            Some(text) => rule.with_description(text),
            None => rule,
        })
    }

    fn leaf(&self, name: &str, args: Vec<Value>, position: &Position) -> Result<Rule, BindingError> {
        let predicate = self
            .registry
            .get(name)
            .ok_or_else(|| BindingError::UnknownPredicate {
                position: position.clone(),
                name: name.to_string(),
            })?;

        Rule::leaf(predicate.clone(), args).map_err(|source| BindingError::InvalidRule {
            position: position.clone(),
            source,
        })
    }
}

fn malformed(position: &Position, reason: String) -> BindingError {
    BindingError::MalformedRule {
        position: position.clone(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBuilder;
    use crate::rules::{Arity, ParamKind, RuleError};
    use serde_json::json;

    fn single(annotations: Vec<Annotation>) -> Document {
        let mut b = DocumentBuilder::new();
        let leaf = b.scalar(json!("value"), Position::new("values.yml", 1));
        for annotation in annotations {
            b.annotate(leaf, annotation);
        }
        b.build(leaf).unwrap()
    }

    fn bind(doc: &Document) -> Result<Bindings, BindingError> {
        let registry = PredicateRegistry::with_builtins();
        Binder::new(&registry).bind(doc)
    }

    #[test]
    fn unannotated_documents_bind_nothing() {
        let doc = single(vec![]);
        assert!(bind(&doc).unwrap().is_empty());
    }

    #[test]
    fn assert_and_validate_bind_separately() {
        let doc = single(vec![
            Annotation::new("assert", vec![json!("not_null")]),
            Annotation::new("validate", vec![json!("non_empty"), json!({"max_len": 3})]),
        ]);

        let bindings = bind(&doc).unwrap();
        let sets = bindings.get(doc.root()).unwrap();

        let fail_fast = sets.fail_fast().unwrap();
        assert_eq!(fail_fast.mode(), Mode::FailFast);
        assert_eq!(fail_fast.len(), 1);

        let deferred = sets.deferred().unwrap();
        assert_eq!(deferred.mode(), Mode::Deferred);
        assert_eq!(deferred.len(), 2);
    }

    #[test]
    fn repeated_annotations_append_in_order() {
        let doc = single(vec![
            Annotation::new("validate", vec![json!("non_empty")])
                .at(Position::new("values.yml", 7)),
            Annotation::new("validate", vec![json!({"min_len": 2})]),
        ]);

        let bindings = bind(&doc).unwrap();
        let deferred = bindings.rule_set(doc.root(), Mode::Deferred).unwrap();

        let descriptions: Vec<&str> = deferred.rules().iter().map(Rule::description).collect();
        assert_eq!(descriptions, vec!["non-empty", "length greater or equal to 2"]);
        assert_eq!(deferred.declared_at(), &Position::new("values.yml", 7));
    }

    #[test]
    fn predicate_named_annotations_are_shorthand() {
        let doc = single(vec![Annotation::new("min_len", vec![json!(2)])]);

        let bindings = bind(&doc).unwrap();
        assert_eq!(
            bindings.rule_set(doc.root(), Mode::Deferred).unwrap().len(),
            1
        );
    }

    #[test]
    fn shorthand_can_be_disabled() {
        let doc = single(vec![Annotation::new("min_len", vec![json!(2)])]);
        let registry = PredicateRegistry::with_builtins();

        let bindings = Binder::new(&registry)
            .predicate_shorthand(false)
            .bind(&doc)
            .unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn unrelated_annotations_are_ignored() {
        let doc = single(vec![Annotation::new("overlay/match", vec![json!({"by": "name"})])]);
        assert!(bind(&doc).unwrap().is_empty());
    }

    #[test]
    fn custom_annotation_names() {
        let doc = single(vec![Annotation::new("schema/validation", vec![json!("non_empty")])]);
        let registry = PredicateRegistry::with_builtins();

        let bindings = Binder::new(&registry)
            .annotation_names("assert/check", "schema/validation")
            .bind(&doc)
            .unwrap();
        assert!(bindings.rule_set(doc.root(), Mode::Deferred).is_some());
    }

    #[test]
    fn unknown_predicate_is_a_binding_error() {
        let doc = single(vec![Annotation::new("validate", vec![json!("no_such_rule")])]);

        assert_eq!(
            bind(&doc).unwrap_err(),
            BindingError::UnknownPredicate {
                position: Position::new("values.yml", 1),
                name: "no_such_rule".to_string()
            }
        );
    }

    #[test]
    fn not_with_two_children_is_a_binding_error() {
        let doc = single(vec![Annotation::new(
            "validate",
            vec![json!({"not": ["not_null", "non_empty"]})],
        )]);

        assert_eq!(
            bind(&doc).unwrap_err(),
            BindingError::InvalidRule {
                position: Position::new("values.yml", 1),
                source: RuleError::MalformedNot { found: 2 }
            }
        );
    }

    #[test]
    fn empty_and_is_a_binding_error() {
        let doc = single(vec![Annotation::new("assert", vec![json!({"and": []})])]);

        assert!(matches!(
            bind(&doc).unwrap_err(),
            BindingError::InvalidRule {
                source: RuleError::EmptyComposite { combinator: "and" },
                ..
            }
        ));
    }

    #[test]
    fn wrong_arity_is_a_binding_error() {
        let doc = single(vec![Annotation::new("validate", vec![json!("min_len")])]);

        assert!(matches!(
            bind(&doc).unwrap_err(),
            BindingError::InvalidRule {
                source: RuleError::ArityMismatch {
                    expected: Arity::Exactly(1),
                    found: 0,
                    ..
                },
                ..
            }
        ));
    }

    #[test]
    fn wrong_argument_kind_is_a_binding_error() {
        let doc = single(vec![Annotation::new("validate", vec![json!({"min": "ten"})])]);

        assert!(matches!(
            bind(&doc).unwrap_err(),
            BindingError::InvalidRule {
                source: RuleError::InvalidArgument { index: 0, .. },
                ..
            }
        ));
    }

    #[test]
    fn unknown_kind_name_is_a_binding_error() {
        let doc = single(vec![Annotation::new("validate", vec![json!({"kind": "integer"})])]);

        let err = bind(&doc).unwrap_err();
        assert_eq!(
            err,
            BindingError::InvalidRule {
                position: Position::new("values.yml", 1),
                source: RuleError::InvalidArgument {
                    predicate: "kind".to_string(),
                    index: 0,
                    expected: ParamKind::KindName,
                    reason: "found string \"integer\"".to_string(),
                },
            }
        );
    }

    #[test]
    fn empty_annotation_is_a_binding_error() {
        let doc = single(vec![Annotation::new("assert", vec![])]);

        let err = bind(&doc).unwrap_err();
        assert_eq!(err.to_string(), "values.yml:1: @assert requires at least one rule");
    }

    #[test]
    fn malformed_specs_are_binding_errors() {
        for spec in [
            json!(42),
            json!({}),
            json!({"min": 1, "max": 2}),
            json!({"and": "non_empty"}),
            json!({"non_empty": null, "description": 3}),
        ] {
            let doc = single(vec![Annotation::new("validate", vec![spec.clone()])]);
            assert!(
                matches!(bind(&doc).unwrap_err(), BindingError::MalformedRule { .. }),
                "spec {spec} should be malformed"
            );
        }
    }

    #[test]
    fn description_override_applies() {
        let doc = single(vec![Annotation::new(
            "validate",
            vec![json!({"or": ["not_null", {"enum": ["a", "b"]}], "description": "a or b"})],
        )]);

        let bindings = bind(&doc).unwrap();
        let set = bindings.rule_set(doc.root(), Mode::Deferred).unwrap();
        assert_eq!(set.rules()[0].description(), "a or b");
    }

    #[test]
    fn first_malformed_node_in_document_order_is_reported() {
        let mut b = DocumentBuilder::new();
        let first = b.scalar(json!(1), Position::new("values.yml", 2));
        let second = b.scalar(json!(2), Position::new("values.yml", 3));
        b.annotate(second, Annotation::new("validate", vec![json!("bogus_b")]));
        b.annotate(first, Annotation::new("validate", vec![json!("bogus_a")]));
        let root = b.sequence(vec![first, second], Position::new("values.yml", 1));
        let doc = b.build(root).unwrap();

        let err = bind(&doc).unwrap_err();
        assert_eq!(err.position(), &Position::new("values.yml", 2));
    }
}
