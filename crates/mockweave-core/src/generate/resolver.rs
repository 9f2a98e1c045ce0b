//! # Field Value Resolver
//!
//! Produces one value for one field. Strategies are tried in a fixed order:
//! enum values, custom scalars (user registered, then built in), format hint,
//! model context and related-field derivation, name patterns, and finally the
//! field's basic type.

use chrono::{Duration as ChronoDuration, NaiveDateTime, Timelike};
use fake::faker::internet::en::FreeEmailProvider;
use fake::Fake;
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

use crate::classify::rules::{
    classify_custom_scalar, classify_field, classify_format, normalize_field_name, type_fallback,
};
use crate::classify::semantic::SemanticType;
use crate::generate::providers::{generate_value, random_uuid, slugify};
use crate::generate::value::{Record, Value};
use crate::schema::types::{Field, ScalarKind};

/// User-registered generator for a custom scalar type.
pub type CustomScalarFn = Arc<dyn Fn(&mut StdRng, &GenerationContext<'_>) -> Value + Send + Sync>;

/// Per-request context for resolving a single field value.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub model_name: &'a str,
    pub record_index: usize,
    /// Fields already generated on the current record.
    pub related_fields: &'a Record,
    /// Records of the same model generated so far.
    pub existing_data: Option<&'a [Record]>,
}

impl<'a> GenerationContext<'a> {
    pub fn new(model_name: &'a str, record_index: usize, related_fields: &'a Record) -> Self {
        Self {
            model_name,
            record_index,
            related_fields,
            existing_data: None,
        }
    }

    pub fn with_existing(mut self, existing: &'a [Record]) -> Self {
        self.existing_data = Some(existing);
        self
    }

    /// An already generated field whose normalized name is one of `names`.
    fn related(&self, names: &[&str]) -> Option<&'a Value> {
        self.related_fields
            .iter()
            .find(|(key, value)| {
                !value.is_null() && names.contains(&normalize_field_name(key).as_str())
            })
            .map(|(_, value)| value)
    }
}

pub struct FieldResolver {
    base_time: NaiveDateTime,
    custom_scalars: HashMap<String, CustomScalarFn>,
}

impl FieldResolver {
    /// `base_time` anchors all temporal values.
    pub fn new(base_time: NaiveDateTime) -> Self {
        Self {
            base_time,
            custom_scalars: HashMap::new(),
        }
    }

    /// A resolver anchored at the current time, truncated to whole seconds.
    pub fn now() -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self::new(now.with_nanosecond(0).unwrap_or(now))
    }

    pub fn base_time(&self) -> NaiveDateTime {
        self.base_time
    }

    pub fn set_base_time(&mut self, base_time: NaiveDateTime) {
        self.base_time = base_time;
    }

    /// Register a generator for a declared type name. Registered generators
    /// take precedence over the built-in custom scalar table. Basic scalar
    /// types (`String`, `Int`, ...) never consult them.
    pub fn register_custom_scalar(
        &mut self,
        type_name: impl Into<String>,
        generator: impl Fn(&mut StdRng, &GenerationContext<'_>) -> Value + Send + Sync + 'static,
    ) {
        self.custom_scalars
            .insert(type_name.into(), Arc::new(generator));
    }

    /// Resolve a scalar field. Array fields get one to three values.
    pub fn resolve(&self, field: &Field, ctx: &GenerationContext<'_>, rng: &mut StdRng) -> Value {
        if field.is_array {
            let len = rng.random_range(1..=3);
            return Value::Array(
                (0..len)
                    .map(|_| self.resolve_single(field, ctx, rng))
                    .collect(),
            );
        }
        self.resolve_single(field, ctx, rng)
    }

    fn resolve_single(&self, field: &Field, ctx: &GenerationContext<'_>, rng: &mut StdRng) -> Value {
        if let Some(values) = field.enum_values.as_deref().filter(|v| !v.is_empty()) {
            return Value::owned(values[rng.random_range(0..values.len())].clone());
        }

        let kind = field.scalar_kind();
        if kind == ScalarKind::Other {
            if let Some(generator) = self.custom_scalars.get(&field.type_name) {
                return generator(rng, ctx);
            }
        }

        let semantic = self.semantic_for(field, ctx.model_name);
        let value = derive_from_related(semantic, ctx, rng)
            .unwrap_or_else(|| generate_value(semantic, rng, ctx.record_index, self.base_time));

        match conform(value, kind) {
            Some(value) => value,
            None => {
                let fallback = generate_value(type_fallback(kind), rng, ctx.record_index, self.base_time);
                conform(fallback, kind).unwrap_or(Value::Null)
            }
        }
    }

    /// The semantic type a field resolves through, ignoring enums and
    /// user-registered scalars.
    pub fn semantic_for(&self, field: &Field, model_name: &str) -> SemanticType {
        classify_custom_scalar(&field.type_name)
            .or_else(|| field.format.as_deref().and_then(classify_format))
            .unwrap_or_else(|| classify_field(&field.name, model_name, field.scalar_kind()))
    }

    /// Identifier value: integer types count up from 1, every other type gets
    /// a UUID v4 drawn from `rng`.
    pub fn generate_id(&self, field: &Field, record_index: usize, rng: &mut StdRng) -> Value {
        if field.scalar_kind().is_integer() {
            Value::Int(record_index as i64 + 1)
        } else {
            Value::Uuid(random_uuid(rng))
        }
    }
}

impl Default for FieldResolver {
    fn default() -> Self {
        Self::now()
    }
}

/// Values that must agree with fields generated earlier on the same record.
fn derive_from_related(
    semantic: SemanticType,
    ctx: &GenerationContext<'_>,
    rng: &mut StdRng,
) -> Option<Value> {
    let text = |names: &[&str]| ctx.related(names).and_then(Value::as_str);
    let time = |names: &[&str]| ctx.related(names).and_then(Value::as_timestamp);

    match semantic {
        SemanticType::Email => {
            let first = text(&["first_name", "given_name"])?;
            let last = text(&["last_name", "family_name", "surname"])?;
            let domain: String = FreeEmailProvider().fake_with_rng(rng);
            let local = format!("{}.{}", slugify(first), slugify(last)).replace('-', "");
            Some(Value::owned(format!(
                "{}{}@{}",
                local, ctx.record_index, domain
            )))
        }
        SemanticType::FullName => {
            let first = text(&["first_name", "given_name"])?;
            let last = text(&["last_name", "family_name", "surname"])?;
            Some(Value::owned(format!("{} {}", first, last)))
        }
        SemanticType::Username => {
            let first = text(&["first_name", "given_name"])?;
            Some(Value::owned(format!(
                "{}{}",
                slugify(first).replace('-', ""),
                ctx.record_index
            )))
        }
        SemanticType::Slug => {
            let source = text(&["title", "name", "headline", "subject"])?;
            Some(Value::owned(format!("{}-{}", slugify(source), ctx.record_index)))
        }
        SemanticType::UpdatedAt | SemanticType::DeletedAt => {
            let created = time(&["created_at", "created", "date_created", "created_on"])?;
            let offset = ChronoDuration::days(rng.random_range(0..30))
                + ChronoDuration::minutes(rng.random_range(0..1440));
            Some(Value::Timestamp(created + offset))
        }
        SemanticType::EndDate => {
            let start = time(&["start_date", "start_at", "starts_at", "start", "valid_from"])?;
            Some(Value::Timestamp(
                start + ChronoDuration::days(rng.random_range(1..90)),
            ))
        }
        _ => None,
    }
}

/// Fit a generated value to the field's declared type, or `None` when the
/// value cannot represent that type.
fn conform(value: Value, kind: ScalarKind) -> Option<Value> {
    match (kind, value) {
        (ScalarKind::Other, v) => Some(v),
        (ScalarKind::String, v @ Value::String(_)) => Some(v),
        (ScalarKind::String, v) => Some(Value::owned(v.to_string())),
        (ScalarKind::Int | ScalarKind::BigInt, v @ Value::Int(_)) => Some(v),
        (ScalarKind::Int | ScalarKind::BigInt, Value::Float(f)) => Some(Value::Int(f.round() as i64)),
        (ScalarKind::Float | ScalarKind::Decimal, v @ Value::Float(_)) => Some(v),
        (ScalarKind::Float | ScalarKind::Decimal, Value::Int(i)) => Some(Value::Float(i as f64)),
        (ScalarKind::Boolean, v @ Value::Bool(_)) => Some(v),
        (ScalarKind::DateTime, v @ Value::Timestamp(_)) => Some(v),
        (ScalarKind::DateTime, Value::Date(d)) => d.and_hms_opt(0, 0, 0).map(Value::Timestamp),
        (ScalarKind::Date, v @ Value::Date(_)) => Some(v),
        (ScalarKind::Date, Value::Timestamp(ts)) => Some(Value::Date(ts.date())),
        (ScalarKind::Time, v @ Value::String(_)) => Some(v),
        (ScalarKind::Json, v @ Value::Json(_)) => Some(v),
        (ScalarKind::Json, v) => Some(Value::Json(v.to_json())),
        (ScalarKind::Bytes, v @ Value::Bytes(_)) => Some(v),
        (ScalarKind::Uuid, v @ Value::Uuid(_)) => Some(v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn resolver() -> FieldResolver {
        FieldResolver::new(
            chrono::NaiveDate::from_ymd_opt(2025, 6, 15)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    fn resolve(field: &Field, model: &str, related: &Record) -> Value {
        let mut rng = StdRng::seed_from_u64(42);
        let ctx = GenerationContext::new(model, 2, related);
        resolver().resolve(field, &ctx, &mut rng)
    }

    #[test]
    fn test_enum_values_win() {
        let field = Field::scalar("email", "String").with_enum(&["A", "B"]);
        let value = resolve(&field, "User", &Record::new());
        assert!(matches!(value.as_str(), Some("A") | Some("B")));
    }

    #[test]
    fn test_registered_custom_scalar_wins_over_builtin() {
        let mut resolver = resolver();
        resolver.register_custom_scalar("Email", |_, ctx| {
            Value::owned(format!("custom{}@test.dev", ctx.record_index))
        });
        let field = Field::scalar("contact", "Email");
        let related = Record::new();
        let ctx = GenerationContext::new("User", 7, &related);
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            resolver.resolve(&field, &ctx, &mut rng),
            Value::from("custom7@test.dev")
        );
    }

    #[test]
    fn test_builtin_custom_scalar() {
        let field = Field::scalar("accent", "HexColorCode");
        let value = resolve(&field, "Theme", &Record::new());
        let hex = value.as_str().unwrap();
        assert!(hex.starts_with('#') && hex.len() == 7);
    }

    #[test]
    fn test_format_hint_beats_name() {
        let field = Field::scalar("contact", "String").with_format("email");
        let value = resolve(&field, "Lead", &Record::new());
        assert!(value.as_str().unwrap().contains('@'));
    }

    #[test]
    fn test_email_derived_from_names() {
        let mut related = Record::new();
        related.insert("firstName".into(), Value::from("Ada"));
        related.insert("lastName".into(), Value::from("Lovelace"));
        let value = resolve(&Field::scalar("email", "String"), "User", &related);
        assert!(value.as_str().unwrap().starts_with("ada.lovelace2@"));
    }

    #[test]
    fn test_slug_derived_from_title() {
        let mut related = Record::new();
        related.insert("title".into(), Value::from("Hello Rust World"));
        let value = resolve(&Field::scalar("slug", "String"), "Post", &related);
        assert_eq!(value, Value::from("hello-rust-world-2"));
    }

    #[test]
    fn test_updated_at_not_before_created_at() {
        let created = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut related = Record::new();
        related.insert("createdAt".into(), Value::Timestamp(created));
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let ctx = GenerationContext::new("Post", 0, &related);
            let value = resolver().resolve(&Field::scalar("updatedAt", "DateTime"), &ctx, &mut rng);
            assert!(value.as_timestamp().unwrap() >= created);
        }
    }

    #[test]
    fn test_type_fallback_and_conformance() {
        assert!(matches!(
            resolve(&Field::scalar("flag", "Boolean"), "X", &Record::new()),
            Value::Bool(_)
        ));
        // Price rule yields a float; an Int field gets it rounded.
        assert!(matches!(
            resolve(&Field::scalar("price", "Int"), "Product", &Record::new()),
            Value::Int(_)
        ));
        assert!(matches!(
            resolve(&Field::scalar("whenever", "Date"), "X", &Record::new()),
            Value::Date(_)
        ));
    }

    #[test]
    fn test_scalar_array_has_one_to_three_values() {
        let field = Field::scalar("tags", "String").array();
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let related = Record::new();
            let ctx = GenerationContext::new("Post", 0, &related);
            let value = resolver().resolve(&field, &ctx, &mut rng);
            let len = value.as_array().unwrap().len();
            assert!((1..=3).contains(&len));
        }
    }

    #[test]
    fn test_id_policy() {
        let resolver = resolver();
        let mut rng = StdRng::seed_from_u64(42);
        assert_eq!(
            resolver.generate_id(&Field::scalar("id", "Int").id(), 4, &mut rng),
            Value::Int(5)
        );
        assert!(matches!(
            resolver.generate_id(&Field::scalar("id", "String").id(), 4, &mut rng),
            Value::Uuid(_)
        ));
    }
}
