use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::detect::{DetectionMethod, Relation};

/// The in-memory model map every schema-dialect parser produces.
///
/// Insertion order is significant: it is the tie-break order used by the
/// cycle resolver and the default generation order for unrelated models.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelMap {
    pub models: IndexMap<String, Model>,
}

impl ModelMap {
    pub fn new() -> Self {
        Self {
            models: IndexMap::new(),
        }
    }

    /// Insert a model keyed by its own name, replacing any previous entry.
    pub fn insert(&mut self, model: Model) {
        self.models.insert(model.name.clone(), model);
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn field_count(&self) -> usize {
        self.models.values().map(|m| m.fields.len()).sum()
    }

    /// True when the parser already marked at least one field as a relation.
    /// The relation detector only runs when this is false.
    pub fn has_explicit_relations(&self) -> bool {
        self.models
            .values()
            .any(|m| m.fields.iter().any(|f| f.is_relation))
    }

    /// Mark detected relations on the map so downstream stages treat them as
    /// relation fields.
    ///
    /// Singular foreign-key fields (`authorId`) carry their own id, so they get
    /// `relation_from_fields = [self]` and take part in unique-FK pools. Every
    /// other detected relation becomes an embedded id (or id array) field.
    /// Fields that are already relations are left untouched.
    pub fn apply_relations(&mut self, relations: &[Relation]) {
        for relation in relations {
            let Some(model) = self.models.get_mut(&relation.from) else {
                continue;
            };
            let Some(field) = model.fields.iter_mut().find(|f| f.name == relation.field) else {
                continue;
            };
            if field.is_relation {
                continue;
            }

            field.is_relation = true;
            field.is_scalar = false;
            field.relation_target = Some(relation.to.clone());
            if relation.detection_method == DetectionMethod::ForeignKey && !field.is_array {
                field.relation_from_fields = Some(vec![field.name.clone()]);
            }
        }
    }
}

/// A named entity type with an ordered list of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub name: String,
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub model_level_uniques: Vec<Vec<String>>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            model_level_uniques: Vec::new(),
        }
    }

    /// Builder-style field append, mostly for fixtures and tests.
    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The identifier field: `is_id`, falling back to a field named `id`.
    pub fn id_field(&self) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.is_id)
            .or_else(|| self.fields.iter().find(|f| f.name == "id"))
    }

    pub fn relation_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| f.is_relation)
    }

    /// Names of every local field that carries a relation's id.
    pub fn foreign_key_fields(&self) -> Vec<&str> {
        self.relation_fields()
            .filter_map(|f| f.relation_from_fields.as_ref())
            .flatten()
            .map(|s| s.as_str())
            .collect()
    }

    /// Whether the given foreign-key field set must not repeat across records:
    /// any carrier field marked unique, or a model-level unique on exactly
    /// those fields.
    pub fn is_unique_key(&self, fields: &[String]) -> bool {
        if fields
            .iter()
            .any(|name| self.field(name).is_some_and(|f| f.is_unique))
        {
            return true;
        }
        self.model_level_uniques.iter().any(|set| {
            set.len() == fields.len() && fields.iter().all(|name| set.contains(name))
        })
    }
}

/// A single field of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub raw_type: String,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_scalar: bool,
    #[serde(default)]
    pub is_relation: bool,
    #[serde(default)]
    pub is_id: bool,
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default)]
    pub has_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_from_fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_references: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_name: Option<String>,
    /// Target model when `type_name` is a plain scalar (detected FK fields).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_target: Option<String>,
    /// Format hint such as `email`, `uuid` or `date-time`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    /// Raw schema annotations, e.g. `@hasMany(Post)`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<String>,
}

impl Field {
    fn base(name: String, type_name: String) -> Self {
        Self {
            raw_type: type_name.clone(),
            name,
            type_name,
            is_array: false,
            is_optional: false,
            is_scalar: false,
            is_relation: false,
            is_id: false,
            is_unique: false,
            has_default: false,
            relation_from_fields: None,
            relation_references: None,
            relation_name: None,
            relation_target: None,
            format: None,
            enum_values: None,
            annotations: Vec::new(),
        }
    }

    pub fn scalar(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        let mut field = Self::base(name.into(), type_name.into());
        field.is_scalar = true;
        field
    }

    pub fn relation(name: impl Into<String>, target: impl Into<String>) -> Self {
        let mut field = Self::base(name.into(), target.into());
        field.is_relation = true;
        field
    }

    pub fn id(mut self) -> Self {
        self.is_id = true;
        self.is_unique = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.is_unique = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.is_optional = true;
        self
    }

    pub fn array(mut self) -> Self {
        self.is_array = true;
        self.raw_type = format!("{}[]", self.type_name);
        self
    }

    pub fn from_fields(mut self, fields: &[&str]) -> Self {
        self.relation_from_fields = Some(fields.iter().map(|s| s.to_string()).collect());
        self.relation_references = Some(vec!["id".to_string()]);
        self
    }

    pub fn references(mut self, fields: &[&str]) -> Self {
        self.relation_references = Some(fields.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn named(mut self, relation_name: impl Into<String>) -> Self {
        self.relation_name = Some(relation_name.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_enum(mut self, values: &[&str]) -> Self {
        self.enum_values = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// The model this relation field points at.
    pub fn target_model(&self) -> Option<&str> {
        if !self.is_relation {
            return None;
        }
        Some(self.relation_target.as_deref().unwrap_or(&self.type_name))
    }

    /// Relation expressed through explicit local foreign-key fields.
    pub fn carries_foreign_key(&self) -> bool {
        self.relation_from_fields
            .as_ref()
            .is_some_and(|f| !f.is_empty())
    }

    pub fn scalar_kind(&self) -> ScalarKind {
        ScalarKind::from_type_name(&self.type_name)
    }
}

/// Normalized scalar type covering the common schema dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    String,
    Int,
    BigInt,
    Float,
    Decimal,
    Boolean,
    DateTime,
    Date,
    Time,
    Json,
    Bytes,
    Uuid,
    /// Unknown or dialect-specific type name
    Other,
}

impl ScalarKind {
    /// Parse a declared type name (`String`, `int4`, `timestamptz`, ...).
    pub fn from_type_name(raw: &str) -> Self {
        let normalized = raw.trim().trim_end_matches("[]").to_lowercase();
        match normalized.as_str() {
            "string" | "text" | "varchar" | "char" | "character varying" | "citext" => {
                ScalarKind::String
            }
            "int" | "integer" | "int2" | "int4" | "int32" | "smallint" | "serial" | "smallserial" => {
                ScalarKind::Int
            }
            "bigint" | "int8" | "int64" | "long" | "bigserial" => ScalarKind::BigInt,
            "float" | "double" | "real" | "float4" | "float8" | "number" | "double precision" => {
                ScalarKind::Float
            }
            "decimal" | "numeric" | "money" => ScalarKind::Decimal,
            "boolean" | "bool" => ScalarKind::Boolean,
            "datetime" | "timestamp" | "timestamptz" | "date-time" | "instant" => {
                ScalarKind::DateTime
            }
            "date" => ScalarKind::Date,
            "time" | "timetz" => ScalarKind::Time,
            "json" | "jsonb" | "object" | "map" => ScalarKind::Json,
            "bytes" | "bytea" | "blob" | "binary" | "buffer" => ScalarKind::Bytes,
            "uuid" | "guid" | "objectid" => ScalarKind::Uuid,
            _ => ScalarKind::Other,
        }
    }

    /// Integer types get sequential identifiers; everything else gets UUIDs.
    pub fn is_integer(&self) -> bool {
        matches!(self, ScalarKind::Int | ScalarKind::BigInt)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarKind::Int | ScalarKind::BigInt | ScalarKind::Float | ScalarKind::Decimal
        )
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScalarKind::String => "String",
            ScalarKind::Int => "Int",
            ScalarKind::BigInt => "BigInt",
            ScalarKind::Float => "Float",
            ScalarKind::Decimal => "Decimal",
            ScalarKind::Boolean => "Boolean",
            ScalarKind::DateTime => "DateTime",
            ScalarKind::Date => "Date",
            ScalarKind::Time => "Time",
            ScalarKind::Json => "Json",
            ScalarKind::Bytes => "Bytes",
            ScalarKind::Uuid => "Uuid",
            ScalarKind::Other => "Other",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::RelationType;

    #[test]
    fn test_id_field_fallback_to_named_id() {
        let model = Model::new("Post")
            .with_field(Field::scalar("id", "String"))
            .with_field(Field::scalar("title", "String"));
        assert_eq!(model.id_field().map(|f| f.name.as_str()), Some("id"));

        let explicit = Model::new("Tag")
            .with_field(Field::scalar("id", "String"))
            .with_field(Field::scalar("slug", "String").id());
        assert_eq!(explicit.id_field().map(|f| f.name.as_str()), Some("slug"));
    }

    #[test]
    fn test_deserialize_camel_case_field() {
        let json = r#"{
            "name": "Post",
            "fields": [
                {"name": "id", "type": "String", "isScalar": true, "isId": true},
                {"name": "authorId", "type": "String", "isScalar": true, "isUnique": true},
                {"name": "author", "type": "User", "isRelation": true,
                 "relationFromFields": ["authorId"], "relationReferences": ["id"]}
            ]
        }"#;
        let model: Model = serde_json::from_str(json).unwrap();
        let author = model.field("author").unwrap();
        assert!(author.carries_foreign_key());
        assert_eq!(author.target_model(), Some("User"));
        assert!(model.is_unique_key(&["authorId".to_string()]));
        assert_eq!(model.foreign_key_fields(), vec!["authorId"]);
    }

    #[test]
    fn test_model_level_unique_key() {
        let mut model = Model::new("Membership")
            .with_field(Field::scalar("userId", "String"))
            .with_field(Field::scalar("groupId", "String"));
        model.model_level_uniques = vec![vec!["groupId".to_string(), "userId".to_string()]];

        assert!(model.is_unique_key(&["userId".to_string(), "groupId".to_string()]));
        assert!(!model.is_unique_key(&["userId".to_string()]));
    }

    #[test]
    fn test_apply_relations_marks_foreign_key_carrier() {
        let mut models = ModelMap::new();
        models.insert(Model::new("User").with_field(Field::scalar("id", "String").id()));
        models.insert(
            Model::new("Post")
                .with_field(Field::scalar("id", "String").id())
                .with_field(Field::scalar("authorId", "String"))
                .with_field(Field::scalar("tagIds", "String").array()),
        );
        models.insert(Model::new("Tag").with_field(Field::scalar("id", "String").id()));
        assert!(!models.has_explicit_relations());

        models.apply_relations(&[
            Relation {
                from: "Post".into(),
                to: "User".into(),
                field: "authorId".into(),
                relation_type: RelationType::OneToOne,
                foreign_key: Some("authorId".into()),
                confidence: 0.9,
                detection_method: DetectionMethod::ForeignKey,
            },
            Relation {
                from: "Post".into(),
                to: "Tag".into(),
                field: "tagIds".into(),
                relation_type: RelationType::ManyToMany,
                foreign_key: Some("tagIds".into()),
                confidence: 0.85,
                detection_method: DetectionMethod::ForeignKey,
            },
        ]);

        let post = models.get("Post").unwrap();
        let author = post.field("authorId").unwrap();
        assert!(author.is_relation && !author.is_scalar);
        assert_eq!(author.target_model(), Some("User"));
        assert_eq!(author.relation_from_fields, Some(vec!["authorId".to_string()]));

        let tags = post.field("tagIds").unwrap();
        assert_eq!(tags.target_model(), Some("Tag"));
        assert!(!tags.carries_foreign_key());
        assert!(models.has_explicit_relations());
    }

    #[test]
    fn test_scalar_kind_parsing() {
        assert_eq!(ScalarKind::from_type_name("Int"), ScalarKind::Int);
        assert_eq!(ScalarKind::from_type_name("bigserial"), ScalarKind::BigInt);
        assert_eq!(ScalarKind::from_type_name("DateTime"), ScalarKind::DateTime);
        assert_eq!(ScalarKind::from_type_name("String[]"), ScalarKind::String);
        assert_eq!(ScalarKind::from_type_name("Post"), ScalarKind::Other);
        assert!(ScalarKind::Int.is_integer());
        assert!(!ScalarKind::Uuid.is_integer());
    }
}
