use std::sync::LazyLock;

use regex::Regex;

use crate::detect::{DetectionMethod, DetectorOptions, RelationType};
use crate::schema::types::{Field, ModelMap};

/// What a strategy needs to look at besides the field itself.
pub struct DetectionContext<'a> {
    pub models: &'a ModelMap,
    pub options: &'a DetectorOptions,
}

/// How closely a name resolved to a model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchQuality {
    /// Case/separator-insensitive equality.
    Exact,
    /// Equal after singularizing the candidate.
    Singular,
    /// Only a trailing word of a compound name matched (`parentCategory`).
    Partial,
}

/// A positive match, before scoring.
#[derive(Debug, Clone)]
pub struct StrategyMatch {
    pub target: String,
    pub relation_type: RelationType,
    pub foreign_key: Option<String>,
    pub quality: MatchQuality,
    /// Strategy-specific base confidence for the pattern that fired.
    pub base: f64,
}

/// One tier of the detection cascade: a match predicate plus a scorer.
pub trait DetectionStrategy: Send + Sync {
    fn method(&self) -> DetectionMethod;

    fn enabled(&self, _options: &DetectorOptions) -> bool {
        true
    }

    fn matches(&self, field: &Field, ctx: &DetectionContext<'_>) -> Option<StrategyMatch>;

    fn score(&self, matched: &StrategyMatch) -> f64;
}

/// The cascade in priority order. Iteration order is significant.
pub fn default_strategies() -> Vec<Box<dyn DetectionStrategy>> {
    vec![
        Box::new(DirectReference),
        Box::new(SchemaAnnotation),
        Box::new(ForeignKeyPattern),
        Box::new(NamingConvention),
        Box::new(Inference),
    ]
}

fn cardinality(is_array: bool) -> RelationType {
    if is_array {
        RelationType::OneToMany
    } else {
        RelationType::OneToOne
    }
}

// === Tier 1: direct reference ===

pub struct DirectReference;

impl DetectionStrategy for DirectReference {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Direct
    }

    fn matches(&self, field: &Field, ctx: &DetectionContext<'_>) -> Option<StrategyMatch> {
        let target = field.target_model().unwrap_or(field.type_name.as_str());
        if !ctx.models.contains(target) {
            return None;
        }
        Some(StrategyMatch {
            target: target.to_string(),
            relation_type: cardinality(field.is_array),
            foreign_key: field
                .relation_from_fields
                .as_ref()
                .and_then(|f| f.first().cloned()),
            quality: MatchQuality::Exact,
            base: 1.0,
        })
    }

    fn score(&self, _matched: &StrategyMatch) -> f64 {
        1.0
    }
}

// === Tier 2: schema annotation ===

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^@?(relation|ref|has_?many|has_?one|belongs_?to|many_?to_?many)\s*\(\s*["']?([A-Za-z_][A-Za-z0-9_]*)["']?"#,
    )
    .expect("annotation pattern must be valid")
});

pub struct SchemaAnnotation;

impl DetectionStrategy for SchemaAnnotation {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::SchemaAnnotation
    }

    fn enabled(&self, options: &DetectorOptions) -> bool {
        options.enable_schema_annotations
    }

    fn matches(&self, field: &Field, ctx: &DetectionContext<'_>) -> Option<StrategyMatch> {
        field.annotations.iter().find_map(|annotation| {
            let caps = ANNOTATION_RE.captures(annotation.trim())?;
            let kind = caps[1].to_lowercase().replace('_', "");
            let (target, quality) = resolve_model(&caps[2], ctx.models)?;
            let relation_type = match kind.as_str() {
                "hasmany" => RelationType::OneToMany,
                "hasone" | "belongsto" => RelationType::OneToOne,
                "manytomany" => RelationType::ManyToMany,
                _ => cardinality(field.is_array),
            };
            Some(StrategyMatch {
                target,
                relation_type,
                foreign_key: None,
                quality,
                base: 0.9,
            })
        })
    }

    fn score(&self, _matched: &StrategyMatch) -> f64 {
        0.9
    }
}

// === Tier 3: foreign-key naming ===

struct KeyPattern {
    pattern: Regex,
    plural: bool,
    advanced: bool,
    base: f64,
}

static KEY_PATTERNS: LazyLock<Vec<KeyPattern>> = LazyLock::new(|| {
    let raw: &[(&str, bool, bool, f64)] = &[
        // plural id lists: many-to-many
        (r"^(?P<stem>[A-Za-z0-9]+?)_ids$", true, false, 0.85),
        (r"^(?P<stem>[a-z][A-Za-z0-9]*?)Ids$", true, false, 0.85),
        // singular ids
        (r"^(?P<stem>[A-Za-z0-9]+?)_id$", false, false, 0.9),
        (r"^(?P<stem>[a-z][A-Za-z0-9]*?)Id$", false, false, 0.9),
        // advanced suffix families
        (r"^(?P<stem>[A-Za-z0-9]+?)_?(?:Ref|_ref)$", false, true, 0.8),
        (r"^(?P<stem>[A-Za-z0-9]+?)_?(?:Fk|FK|_fk)$", false, true, 0.8),
        (r"^(?P<stem>[A-Za-z0-9]+?)_?(?:Key|_key)$", false, true, 0.75),
    ];
    raw.iter()
        .map(|(pattern, plural, advanced, base)| KeyPattern {
            pattern: Regex::new(pattern).expect("foreign key pattern must be valid"),
            plural: *plural,
            advanced: *advanced,
            base: *base,
        })
        .collect()
});

pub struct ForeignKeyPattern;

impl DetectionStrategy for ForeignKeyPattern {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::ForeignKey
    }

    fn matches(&self, field: &Field, ctx: &DetectionContext<'_>) -> Option<StrategyMatch> {
        for key in KEY_PATTERNS.iter() {
            if key.advanced && !ctx.options.enable_advanced_patterns {
                continue;
            }
            let Some(caps) = key.pattern.captures(&field.name) else {
                continue;
            };
            let stem = &caps["stem"];
            let Some((target, quality)) = resolve_model(stem, ctx.models) else {
                continue;
            };
            let relation_type = if key.plural {
                RelationType::ManyToMany
            } else {
                RelationType::OneToOne
            };
            return Some(StrategyMatch {
                target,
                relation_type,
                foreign_key: Some(field.name.clone()),
                quality,
                base: key.base,
            });
        }
        None
    }

    fn score(&self, matched: &StrategyMatch) -> f64 {
        penalize(matched.base, matched.quality).clamp(0.6, 0.9)
    }
}

// === Tier 4: naming convention ===

const COLLECTION_SUFFIXES: &[&str] = &["list", "array", "collection"];
const LINK_SUFFIXES: &[&str] = &["relation", "ref", "link"];

pub struct NamingConvention;

impl DetectionStrategy for NamingConvention {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::NamingConvention
    }

    fn matches(&self, field: &Field, ctx: &DetectionContext<'_>) -> Option<StrategyMatch> {
        let name = field.name.as_str();

        if let Some(target) = find_exact(name, ctx.models) {
            return Some(StrategyMatch {
                target,
                relation_type: cardinality(field.is_array),
                foreign_key: None,
                quality: MatchQuality::Exact,
                base: 0.9,
            });
        }

        let lower = name.to_lowercase();
        if let Some(stem) = name.strip_suffix('s') {
            if let Some(target) = find_exact(stem, ctx.models) {
                return Some(StrategyMatch {
                    target,
                    relation_type: RelationType::OneToMany,
                    foreign_key: None,
                    quality: MatchQuality::Exact,
                    base: 0.8,
                });
            }
        }

        if !ctx.options.enable_advanced_patterns {
            return None;
        }

        for (suffixes, base, collection) in [
            (COLLECTION_SUFFIXES, 0.75, true),
            (LINK_SUFFIXES, 0.7, false),
        ] {
            for suffix in suffixes {
                let Some(stem) = lower.strip_suffix(suffix) else {
                    continue;
                };
                // keep the original casing so compound names still split
                let stem = if name.is_ascii() { &name[..stem.len()] } else { stem };
                let stem = stem.trim_end_matches('_');
                if stem.is_empty() {
                    continue;
                }
                let Some((target, quality)) = resolve_model(stem, ctx.models) else {
                    continue;
                };
                let relation_type = if collection {
                    RelationType::OneToMany
                } else {
                    cardinality(field.is_array)
                };
                return Some(StrategyMatch {
                    target,
                    relation_type,
                    foreign_key: None,
                    quality,
                    base,
                });
            }
        }
        None
    }

    fn score(&self, matched: &StrategyMatch) -> f64 {
        penalize(matched.base, matched.quality).clamp(0.6, 0.9)
    }
}

// === Tier 5: inference ===

const RELATION_KEYWORDS: &[&str] = &["relation", "link", "ref", "key", "id"];

pub struct Inference;

impl DetectionStrategy for Inference {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::Inferred
    }

    fn enabled(&self, options: &DetectorOptions) -> bool {
        options.enable_inference
    }

    fn matches(&self, field: &Field, ctx: &DetectionContext<'_>) -> Option<StrategyMatch> {
        let lower = field.name.to_lowercase();
        if !RELATION_KEYWORDS.iter().any(|k| lower.contains(k)) {
            return None;
        }

        let mut stem = lower.replace(['_', '-'], "");
        for keyword in RELATION_KEYWORDS {
            stem = stem.replace(keyword, "");
        }
        if stem.len() < 3 {
            return None;
        }

        let candidates: Vec<&str> = ctx
            .models
            .names()
            .filter(|model| {
                let m = normalize(model);
                m.len() >= 3 && (stem.contains(&m) || m.contains(&stem))
            })
            .collect();
        if candidates.len() != 1 {
            return None;
        }

        let plural_cue = stem.ends_with('s') || lower.contains("list") || lower.contains("many");
        Some(StrategyMatch {
            target: candidates[0].to_string(),
            relation_type: cardinality(field.is_array || plural_cue),
            foreign_key: None,
            quality: MatchQuality::Partial,
            base: 0.5,
        })
    }

    fn score(&self, matched: &StrategyMatch) -> f64 {
        matched.base
    }
}

// === Name resolution helpers ===

fn penalize(base: f64, quality: MatchQuality) -> f64 {
    match quality {
        MatchQuality::Exact => base,
        MatchQuality::Singular => base - 0.1,
        MatchQuality::Partial => base - 0.2,
    }
}

/// Lowercase and drop separators so `blog_post`, `blogPost` and `BlogPost` agree.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn find_exact(candidate: &str, models: &ModelMap) -> Option<String> {
    let wanted = normalize(candidate);
    if wanted.is_empty() {
        return None;
    }
    models
        .names()
        .find(|name| normalize(name) == wanted)
        .map(|s| s.to_string())
}

fn singularize(word: &str) -> Option<String> {
    if let Some(stem) = word.strip_suffix("ies") {
        return Some(format!("{}y", stem));
    }
    if let Some(stem) = word.strip_suffix("ses") {
        return Some(format!("{}s", stem));
    }
    word.strip_suffix('s').map(|s| s.to_string())
}

/// Split a camelCase or snake_case name into lowercase words.
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Resolve a name fragment to a model: exact, then singular, then a trailing
/// word run of a compound name.
fn resolve_model(candidate: &str, models: &ModelMap) -> Option<(String, MatchQuality)> {
    if let Some(target) = find_exact(candidate, models) {
        return Some((target, MatchQuality::Exact));
    }
    if let Some(target) = singularize(&normalize(candidate)).and_then(|s| find_exact(&s, models)) {
        return Some((target, MatchQuality::Singular));
    }
    let words = split_words(candidate);
    for start in 1..words.len() {
        let tail = words[start..].concat();
        if let Some(target) = find_exact(&tail, models) {
            return Some((target, MatchQuality::Partial));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::Model;

    fn models() -> ModelMap {
        let mut models = ModelMap::new();
        for name in ["User", "BlogPost", "Category", "Comment"] {
            models.insert(Model::new(name).with_field(Field::scalar("id", "Int").id()));
        }
        models
    }

    fn ctx_run(strategy: &dyn DetectionStrategy, field: &Field) -> Option<(StrategyMatch, f64)> {
        let models = models();
        let options = DetectorOptions::default();
        let ctx = DetectionContext {
            models: &models,
            options: &options,
        };
        strategy.matches(field, &ctx).map(|m| {
            let score = strategy.score(&m);
            (m, score)
        })
    }

    #[test]
    fn test_annotation_has_many() {
        let field = Field::scalar("entries", "String").annotated("@hasMany(\"BlogPost\")");
        let (m, score) = ctx_run(&SchemaAnnotation, &field).unwrap();
        assert_eq!(m.target, "BlogPost");
        assert_eq!(m.relation_type, RelationType::OneToMany);
        assert_eq!(score, 0.9);
    }

    #[test]
    fn test_annotation_requires_existing_model() {
        let field = Field::scalar("owner", "String").annotated("@belongsTo(Account)");
        assert!(ctx_run(&SchemaAnnotation, &field).is_none());
    }

    #[test]
    fn test_foreign_key_snake_and_camel() {
        let (m, score) = ctx_run(&ForeignKeyPattern, &Field::scalar("user_id", "Int")).unwrap();
        assert_eq!(m.target, "User");
        assert_eq!(score, 0.9);

        let (m, _) = ctx_run(&ForeignKeyPattern, &Field::scalar("blogPostId", "Int")).unwrap();
        assert_eq!(m.target, "BlogPost");

        let (m, _) = ctx_run(&ForeignKeyPattern, &Field::scalar("comment_ids", "Int")).unwrap();
        assert_eq!(m.relation_type, RelationType::ManyToMany);
    }

    #[test]
    fn test_foreign_key_partial_match_is_penalized() {
        let (m, score) =
            ctx_run(&ForeignKeyPattern, &Field::scalar("parentCategoryId", "Int")).unwrap();
        assert_eq!(m.target, "Category");
        assert_eq!(m.quality, MatchQuality::Partial);
        assert!((score - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_foreign_key_advanced_suffix() {
        let (m, score) = ctx_run(&ForeignKeyPattern, &Field::scalar("userRef", "String")).unwrap();
        assert_eq!(m.target, "User");
        assert_eq!(score, 0.8);
    }

    #[test]
    fn test_naming_convention_variants() {
        let (m, score) = ctx_run(&NamingConvention, &Field::scalar("user", "String")).unwrap();
        assert_eq!(m.target, "User");
        assert_eq!(score, 0.9);

        let (m, score) =
            ctx_run(&NamingConvention, &Field::scalar("comments", "String").array()).unwrap();
        assert_eq!(m.relation_type, RelationType::OneToMany);
        assert_eq!(score, 0.8);

        let (m, _) = ctx_run(&NamingConvention, &Field::scalar("categoryList", "String")).unwrap();
        assert_eq!(m.target, "Category");
        assert_eq!(m.relation_type, RelationType::OneToMany);
    }

    #[test]
    fn test_inference_needs_unique_candidate() {
        let (m, score) = ctx_run(&Inference, &Field::scalar("commentlinkage", "String")).unwrap();
        assert_eq!(m.target, "Comment");
        assert_eq!(score, 0.5);

        assert!(ctx_run(&Inference, &Field::scalar("id", "String")).is_none());
        assert!(ctx_run(&Inference, &Field::scalar("title", "String")).is_none());
    }

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("parentCategoryId"), vec!["parent", "category", "id"]);
        assert_eq!(split_words("blog_post"), vec!["blog", "post"]);
    }
}
