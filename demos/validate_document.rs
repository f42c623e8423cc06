//! Validating a Templated Document
//!
//! This demo walks through both validation passes over a small document.
//!
//! Key concepts:
//! - `assert` annotations checked fail-fast right after templating
//! - `validate` annotations collected into one report
//! - Composite rules (`and`, `or`, `one_of`, `not`)
//! - Custom predicates and JSON-loaded settings
//!
//! Run with: cargo run --example validate_document

use docval::document::{Annotation, Document, DocumentBuilder, Position};
use docval::engine::{Validator, ValidatorConfig};
use docval::rules::{Arity, Predicate};
use serde_json::json;

/// ```yaml
/// #@validate ...
/// name: ""
/// #@assert ...
/// replicas: 0
/// #@validate ...
/// env: prod
/// ports:
///   #@validate port
///   - 8080
///   - 70000
/// ```
fn deployment(replicas_annotation: Annotation) -> Result<Document, Box<dyn std::error::Error>> {
    let file = "values.yml";
    let mut b = DocumentBuilder::new();

    let name = b.scalar(json!(""), Position::new(file, 2));
    b.annotate(
        name,
        Annotation::new("validate", vec![json!("non_empty"), json!({"max_len": 63})])
            .at(Position::new(file, 1)),
    );

    let replicas = b.scalar(json!(0), Position::new(file, 4));
    b.annotate(replicas, replicas_annotation.at(Position::new(file, 3)));

    let env = b.scalar(json!("prod"), Position::new(file, 6));
    b.annotate(
        env,
        Annotation::new(
            "validate",
            vec![json!({
                "or": [{"enum": ["dev", "staging"]}, {"matches": "^prod-[a-z]+$"}],
                "description": "a known environment"
            })],
        )
        .at(Position::new(file, 5)),
    );

    let first = b.scalar(json!(8080), Position::new(file, 9));
    let second = b.scalar(json!(70000), Position::new(file, 10));
    for port in [first, second] {
        b.annotate(
            port,
            Annotation::new("validate", vec![json!("port")]).at(Position::new(file, 8)),
        );
    }
    let ports = b.sequence(vec![first, second], Position::new(file, 7));

    let root = b.mapping(
        vec![
            ("name".to_string(), name),
            ("replicas".to_string(), replicas),
            ("env".to_string(), env),
            ("ports".to_string(), ports),
        ],
        Position::new(file, 1),
    );
    Ok(b.build(root)?)
}

fn port() -> Predicate {
    Predicate::new("port", Arity::Exactly(0), |_, value| match value.as_u64() {
        Some(n) if (1..=65535).contains(&n) => Ok(()),
        Some(n) => Err(format!("{n} is outside 1..65535")),
        None => Err("expected an integer".to_string()),
    })
    .describe_with(|_| "a TCP port".to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Validating a Templated Document ===\n");

    let config = ValidatorConfig::from_json_str(
        r#"{ "header": "Template values were invalid" }"#,
    )?;
    let validator = Validator::builder().config(config).predicate(port()).build()?;
    let names: Vec<&str> = validator.registry().names().collect();
    println!("Registered predicates: {}\n", names.join(", "));

    // Example 1: a failing assert stops everything
    println!("Example 1: Fail-fast assertions");
    let doc = deployment(Annotation::new(
        "assert",
        vec![json!({"min": 1}), json!({"max": 10})],
    ))?;
    match validator.process_assert_validate_anns(&doc) {
        Ok(()) => println!("  assertions held"),
        Err(err) => println!("  {err}"),
    }
    println!();

    // Example 2: deferred validation reports every violation
    println!("Example 2: Deferred validation");
    let doc = deployment(Annotation::new("assert", vec![json!("not_null")]))?;
    validator.process_assert_validate_anns(&doc)?;
    let report = validator.run(&doc, "post-template")?;
    println!("{report}\n");

    // Example 3: the same report as JSON
    println!("Example 3: Report as JSON");
    println!("{}\n", serde_json::to_string_pretty(&report)?);

    // Example 4: malformed annotations are not violations
    println!("Example 4: Binding errors");
    let doc = deployment(Annotation::new(
        "validate",
        vec![json!({"not": ["not_null", "non_empty"]})],
    ))?;
    match validator.run(&doc, "post-template") {
        Ok(report) => println!("  unexpected report with {} violations", report.len()),
        Err(err) => println!("  {err}"),
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
