use std::sync::LazyLock;

use regex::Regex;

use crate::classify::semantic::SemanticType;
use crate::schema::types::ScalarKind;

/// A pre-compiled classification rule with ready-to-use regex patterns.
struct CompiledRule {
    pattern: Regex,
    type_constraint: Option<&'static [ScalarKind]>,
    model_pattern: Option<Regex>,
    semantic_type: SemanticType,
}

fn compile(rules: &[ClassificationRule]) -> Vec<CompiledRule> {
    rules
        .iter()
        .map(|r| CompiledRule {
            pattern: Regex::new(r.pattern).expect("classification pattern must be valid"),
            type_constraint: r.type_constraint,
            model_pattern: r
                .model_pattern
                .map(|p| Regex::new(p).expect("model pattern must be valid")),
            semantic_type: r.semantic_type,
        })
        .collect()
}

/// Pre-compiled model-context rules, built once on first access.
static COMPILED_CONTEXT_RULES: LazyLock<Vec<CompiledRule>> =
    LazyLock::new(|| compile(CONTEXT_RULES));

/// Pre-compiled general rules, built once on first access.
static COMPILED_GENERAL_RULES: LazyLock<Vec<CompiledRule>> =
    LazyLock::new(|| compile(GENERAL_RULES));

/// A classification rule: regex pattern + optional type constraint + optional model context.
struct ClassificationRule {
    /// Regex to match against the normalized field name
    pattern: &'static str,
    /// Optional scalar type constraint (field must have one of these kinds)
    type_constraint: Option<&'static [ScalarKind]>,
    /// Optional model name pattern (restricts rule to matching models)
    model_pattern: Option<&'static str>,
    /// The semantic type to assign if matched
    semantic_type: SemanticType,
}

impl CompiledRule {
    fn accepts(&self, normalized: &str, kind: ScalarKind) -> bool {
        self.pattern.is_match(normalized)
            && self
                .type_constraint
                .is_none_or(|types| types.contains(&kind))
    }
}

/// Built-in custom scalar names (GraphQL-style declared types) and what they hold.
///
/// Only consulted for type names that are not basic scalars; `DateTime`,
/// `Date`, `Json` and friends go through the name rules and the type fallback
/// so that `createdAt`/`updatedAt` keep their temporal meaning.
static CUSTOM_SCALARS: &[(&str, SemanticType)] = &[
    ("email", SemanticType::Email),
    ("emailaddress", SemanticType::Email),
    ("url", SemanticType::Url),
    ("uri", SemanticType::Url),
    ("phonenumber", SemanticType::Phone),
    ("phone", SemanticType::Phone),
    ("ipv4", SemanticType::IpAddress),
    ("ip", SemanticType::IpAddress),
    ("mac", SemanticType::MacAddress),
    ("hexcolorcode", SemanticType::HexColor),
    ("hexcolor", SemanticType::HexColor),
    ("latitude", SemanticType::Latitude),
    ("longitude", SemanticType::Longitude),
    ("positiveint", SemanticType::PositiveInt),
    ("nonnegativeint", SemanticType::PositiveInt),
    ("unsignedint", SemanticType::PositiveInt),
    ("currency", SemanticType::Currency),
    ("countrycode", SemanticType::CountryCode),
    ("postalcode", SemanticType::ZipCode),
    ("locale", SemanticType::Locale),
    ("timezone", SemanticType::Timezone),
    ("jwt", SemanticType::Token),
    ("timestamp", SemanticType::Timestamp),
    ("localdate", SemanticType::DateOnly),
    ("localtime", SemanticType::TimeOnly),
    ("jsonobject", SemanticType::JsonData),
];

/// Look up a declared type in the built-in custom scalar table.
pub fn classify_custom_scalar(type_name: &str) -> Option<SemanticType> {
    if ScalarKind::from_type_name(type_name) != ScalarKind::Other {
        return None;
    }
    let key = type_name.trim().to_lowercase();
    CUSTOM_SCALARS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, semantic)| *semantic)
}

/// Map a format hint (`email`, `uuid`, `date-time`, ...) to a semantic type.
pub fn classify_format(format: &str) -> Option<SemanticType> {
    let semantic = match format.trim().to_lowercase().as_str() {
        "email" | "idn-email" => SemanticType::Email,
        "uri" | "url" | "iri" | "uri-reference" => SemanticType::Url,
        "uuid" | "guid" => SemanticType::Uuid,
        "date-time" | "datetime" | "timestamp" => SemanticType::Timestamp,
        "date" => SemanticType::DateOnly,
        "time" => SemanticType::TimeOnly,
        "ipv4" | "ip" => SemanticType::IpAddress,
        "hostname" | "idn-hostname" => SemanticType::DomainName,
        "phone" | "tel" => SemanticType::Phone,
        "password" => SemanticType::PasswordHash,
        "byte" | "binary" => SemanticType::Bytes,
        "int32" | "int64" | "integer" => SemanticType::Integer,
        "float" | "double" | "decimal" => SemanticType::Decimal,
        "color" | "hex-color" => SemanticType::HexColor,
        "slug" => SemanticType::Slug,
        _ => return None,
    };
    Some(semantic)
}

/// Model-aware rules: the same field name means different things in
/// different models (`name` on a User vs. on a Company).
pub fn classify_contextual(
    field_name: &str,
    model_name: &str,
    kind: ScalarKind,
) -> Option<SemanticType> {
    let normalized = normalize_field_name(field_name);
    COMPILED_CONTEXT_RULES
        .iter()
        .filter(|rule| {
            rule.model_pattern
                .as_ref()
                .is_none_or(|re| re.is_match(model_name))
        })
        .find(|rule| rule.accepts(&normalized, kind))
        .map(|rule| rule.semantic_type)
}

/// General name-pattern rules on the normalized field name.
pub fn classify_by_name(field_name: &str, kind: ScalarKind) -> Option<SemanticType> {
    let normalized = normalize_field_name(field_name);
    COMPILED_GENERAL_RULES
        .iter()
        .find(|rule| rule.accepts(&normalized, kind))
        .map(|rule| rule.semantic_type)
}

/// Classify a field by name, model context and type, in that order of
/// precedence: model-context rules, general name rules, type fallback.
pub fn classify_field(field_name: &str, model_name: &str, kind: ScalarKind) -> SemanticType {
    classify_contextual(field_name, model_name, kind)
        .or_else(|| classify_by_name(field_name, kind))
        .unwrap_or_else(|| type_fallback(kind))
}

/// Normalize a field name for pattern matching:
/// - camelCase to snake_case (e.g., firstName → first_name)
/// - lowercase (Unicode-safe)
/// - replace hyphens with underscores
///
/// Uses explicit previous-character tracking instead of byte indexing
/// to avoid UTF-8 multi-byte footguns with non-ASCII field names.
pub fn normalize_field_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    let mut prev_char: Option<char> = None;

    for ch in name.chars() {
        if ch.is_uppercase() {
            if let Some(p) = prev_char {
                if p.is_lowercase() || p.is_ascii_digit() {
                    result.push('_');
                }
            }
        }
        for lower_ch in ch.to_lowercase() {
            result.push(lower_ch);
        }
        prev_char = Some(ch);
    }
    result.replace('-', "_")
}

/// Fallback classification based purely on the scalar kind.
pub fn type_fallback(kind: ScalarKind) -> SemanticType {
    match kind {
        ScalarKind::String | ScalarKind::Other => SemanticType::Unknown,
        ScalarKind::Int | ScalarKind::BigInt => SemanticType::Integer,
        ScalarKind::Float | ScalarKind::Decimal => SemanticType::Decimal,
        ScalarKind::Boolean => SemanticType::BooleanFlag,
        ScalarKind::DateTime => SemanticType::Timestamp,
        ScalarKind::Date => SemanticType::DateOnly,
        ScalarKind::Time => SemanticType::TimeOnly,
        ScalarKind::Json => SemanticType::JsonData,
        ScalarKind::Bytes => SemanticType::Bytes,
        ScalarKind::Uuid => SemanticType::Uuid,
    }
}

/// Integer kinds, used as a type constraint for Age, SortOrder, etc.
static INTEGER_TYPES: &[ScalarKind] = &[ScalarKind::Int, ScalarKind::BigInt];

/// Numeric kinds, used for Quantity, Rating, etc.
static NUMERIC_TYPES: &[ScalarKind] = &[
    ScalarKind::Int,
    ScalarKind::BigInt,
    ScalarKind::Float,
    ScalarKind::Decimal,
];

/// Kinds that can hold arbitrary text.
static TEXT_TYPES: &[ScalarKind] = &[ScalarKind::String, ScalarKind::Other];

/// Kinds that can hold a point in time.
static TEMPORAL_TYPES: &[ScalarKind] = &[
    ScalarKind::DateTime,
    ScalarKind::Date,
    ScalarKind::String,
    ScalarKind::Other,
];

// === Model-context rules (higher priority, model-specific) ===

static CONTEXT_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        pattern: r"^name$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: Some(
            r"(?i)(users?|people|persons?|members?|employees?|staff|contacts?|customers?|accounts?|profiles?|authors?|students?|teachers?|patients?)",
        ),
        semantic_type: SemanticType::FullName,
    },
    ClassificationRule {
        pattern: r"^name$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: Some(
            r"(?i)(compan(y|ies)|organi[sz]ations?|businesses|business|vendors?|suppliers?|brands?|teams?|stores?|shops?)",
        ),
        semantic_type: SemanticType::CompanyName,
    },
    ClassificationRule {
        pattern: r"^name$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: Some(r"(?i)(products?|items?|goods|catalog|skus?)"),
        semantic_type: SemanticType::ProductName,
    },
    ClassificationRule {
        pattern: r"^name$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: Some(r"(?i)(categor(y|ies)|tags?|labels?|topics?|genres?)"),
        semantic_type: SemanticType::Category,
    },
    ClassificationRule {
        pattern: r"^name$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: Some(r"(?i)(cit(y|ies)|locations?|places?)"),
        semantic_type: SemanticType::City,
    },
    ClassificationRule {
        pattern: r"^title$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: Some(r"(?i)(users?|people|persons?|members?|employees?|staff)"),
        semantic_type: SemanticType::JobTitle,
    },
    ClassificationRule {
        pattern: r"^(content|body|text)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: Some(r"(?i)(comments?|messages?|replies|reply|reviews?)"),
        semantic_type: SemanticType::Sentence,
    },
    ClassificationRule {
        pattern: r"^(status|state)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: Some(r"(?i)(orders?|shipments?|payments?)"),
        semantic_type: SemanticType::Status,
    },
];

// === General name-based rules ===

static GENERAL_RULES: &[ClassificationRule] = &[
    // === Identity ===
    ClassificationRule {
        pattern: r"^(first_?name|given_?name|fname)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::FirstName,
    },
    ClassificationRule {
        pattern: r"^(last_?name|family_?name|surname|lname)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::LastName,
    },
    ClassificationRule {
        pattern: r"^(full_?name|display_?name|real_?name|author_?name|name)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::FullName,
    },
    ClassificationRule {
        pattern: r"^(user_?name|login|handle|screen_?name|nick_?name)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Username,
    },
    // === Contact ===
    ClassificationRule {
        pattern: r"^(e?_?mail(_?(address|addr))?|.+_email)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Email,
    },
    ClassificationRule {
        pattern: r"^(phone(_?(number|num))?|telephone|mobile|cell(_?phone)?|fax)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Phone,
    },
    // === Address ===
    ClassificationRule {
        pattern: r"^(street(_?(address|addr|line))?|address(_?line)?_?[12]?|addr)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::StreetAddress,
    },
    ClassificationRule {
        pattern: r"^(city|town|municipality)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::City,
    },
    ClassificationRule {
        pattern: r"^(state|province|region|prefecture)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::State,
    },
    ClassificationRule {
        pattern: r"^(zip(_?code)?|postal_?code|post_?code)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::ZipCode,
    },
    ClassificationRule {
        pattern: r"^(country)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Country,
    },
    ClassificationRule {
        pattern: r"^(country_?code|country_?iso|iso_?country)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::CountryCode,
    },
    ClassificationRule {
        pattern: r"^(lat(itude)?)$",
        type_constraint: None,
        model_pattern: None,
        semantic_type: SemanticType::Latitude,
    },
    ClassificationRule {
        pattern: r"^(lng|lon(gitude)?)$",
        type_constraint: None,
        model_pattern: None,
        semantic_type: SemanticType::Longitude,
    },
    // === Company ===
    ClassificationRule {
        pattern: r"^(company(_?name)?|organization(_?name)?|org(_?name)?|employer)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::CompanyName,
    },
    ClassificationRule {
        pattern: r"^(job_?title|position|occupation|role_?title)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::JobTitle,
    },
    ClassificationRule {
        pattern: r"^(department|dept|division)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Department,
    },
    // === Internet ===
    ClassificationRule {
        pattern: r"^(url|link|href|website|web_?url|homepage|.+_url)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Url,
    },
    ClassificationRule {
        pattern: r"^(domain(_?name)?|host(_?name)?)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::DomainName,
    },
    ClassificationRule {
        pattern: r"^(ip(_?address)?|ip_?addr|remote_?addr)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::IpAddress,
    },
    ClassificationRule {
        pattern: r"^(mac(_?address)?|mac_?addr|hw_?addr)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::MacAddress,
    },
    ClassificationRule {
        pattern: r"^(user_?agent|ua)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::UserAgent,
    },
    ClassificationRule {
        pattern: r"^slug$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Slug,
    },
    // === Media ===
    // Before the content rules so `cover_image` does not read as text.
    ClassificationRule {
        pattern: r"^(image(_?url)?|img(_?url)?|photo(_?url)?|picture(_?url)?|cover(_?image)?|thumbnail)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::ImageUrl,
    },
    ClassificationRule {
        pattern: r"^(avatar(_?url)?|profile_?(image|photo|pic|picture)(_?url)?)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::AvatarUrl,
    },
    ClassificationRule {
        pattern: r"^(file_?name|filename|original_?name)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::FileName,
    },
    ClassificationRule {
        pattern: r"^(mime_?type|content_?type|media_?type)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::MimeType,
    },
    // === Content ===
    ClassificationRule {
        pattern: r"^(title|subject|heading|headline)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Title,
    },
    ClassificationRule {
        pattern: r"^(description|desc|summary|excerpt|blurb|abstract|overview)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Description,
    },
    ClassificationRule {
        pattern: r"^(bio(graphy)?|about(_?me)?)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Bio,
    },
    ClassificationRule {
        pattern: r"^(body|content|text|message|comment|note|notes|remarks?)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Paragraph,
    },
    // === Financial ===
    ClassificationRule {
        pattern: r"^(price|cost|amount|total|subtotal|sub_?total|unit_?price|sale_?price|list_?price|balance|salary)$",
        type_constraint: Some(NUMERIC_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Price,
    },
    ClassificationRule {
        pattern: r"^(currency(_?code)?)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Currency,
    },
    ClassificationRule {
        pattern: r"^(percentage|percent|pct|ratio|rate|discount)$",
        type_constraint: Some(NUMERIC_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Percentage,
    },
    // === Temporal ===
    ClassificationRule {
        pattern: r"^(created_?(at|on|date|time|timestamp)?|date_?created|insert(ed)?_?(at|on))$",
        type_constraint: Some(TEMPORAL_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::CreatedAt,
    },
    ClassificationRule {
        pattern: r"^(updated_?(at|on|date|time|timestamp)?|modified_?(at|on|date)?|date_?updated|changed_?(at|on)|last_?modified)$",
        type_constraint: Some(TEMPORAL_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::UpdatedAt,
    },
    ClassificationRule {
        pattern: r"^(deleted_?(at|on|date)?|removed_?(at|on))$",
        type_constraint: Some(TEMPORAL_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::DeletedAt,
    },
    ClassificationRule {
        pattern: r"^(start(s)?_?(date|time|at)?|begin_?(date|time|at)?|valid_?from|published_?at)$",
        type_constraint: Some(TEMPORAL_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::StartDate,
    },
    ClassificationRule {
        pattern: r"^(end(s)?_?(date|time|at)?|finish_?(date|time|at)?|valid_?(to|until)|expires?_?(at|on|date)?|expir(y|ation)(_?date)?|due_?(date|at))$",
        type_constraint: Some(TEMPORAL_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::EndDate,
    },
    ClassificationRule {
        pattern: r"^(birth_?(date|day)?|date_?of_?birth|dob|birthday)$",
        type_constraint: Some(TEMPORAL_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::BirthDate,
    },
    ClassificationRule {
        pattern: r"_(at|on)$",
        type_constraint: Some(&[ScalarKind::DateTime, ScalarKind::Date]),
        model_pattern: None,
        semantic_type: SemanticType::Timestamp,
    },
    // === Auth/Security ===
    ClassificationRule {
        pattern: r"^(password(_?hash)?|hashed_?password|encrypted_?password|password_?digest|passwd)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::PasswordHash,
    },
    ClassificationRule {
        pattern: r"^(token|access_?token|refresh_?token|auth_?token|session_?token|api_?key|secret(_?key)?)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Token,
    },
    // === Identifiers ===
    ClassificationRule {
        pattern: r"^(uuid|guid)$",
        type_constraint: None,
        model_pattern: None,
        semantic_type: SemanticType::Uuid,
    },
    ClassificationRule {
        pattern: r"^(sku|product_?code|item_?code|part_?number)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Sku,
    },
    ClassificationRule {
        pattern: r"^(order_?(number|num|no|code|ref))$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::OrderNumber,
    },
    // === Status/Enum ===
    ClassificationRule {
        pattern: r"^(status)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Status,
    },
    ClassificationRule {
        pattern: r"^(role|user_?role|account_?type)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Role,
    },
    ClassificationRule {
        pattern: r"^(priority|urgency|severity)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Priority,
    },
    ClassificationRule {
        pattern: r"^(category|type|kind|group|class|genre)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Category,
    },
    ClassificationRule {
        pattern: r"^(tags?|labels?|keywords?)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Tag,
    },
    ClassificationRule {
        pattern: r"^(is_|has_|can_|should_|was_|allow(s|ed)?_|enable[ds]?_|active|verified|visible|published|featured|archived|locked|blocked|banned|approved|confirmed|completed|deleted|disabled|hidden|draft|public|private|premium)",
        type_constraint: Some(&[ScalarKind::Boolean]),
        model_pattern: None,
        semantic_type: SemanticType::BooleanFlag,
    },
    // === Numeric ===
    // These rules require numeric types so that a String field named
    // "age" does not receive an integer.
    ClassificationRule {
        pattern: r"^(quantity|qty|count|stock|inventory|.+_count|number_?of_.+)$",
        type_constraint: Some(NUMERIC_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Quantity,
    },
    ClassificationRule {
        pattern: r"^(rating|stars|score|grade)$",
        type_constraint: Some(NUMERIC_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Rating,
    },
    ClassificationRule {
        pattern: r"^(age)$",
        type_constraint: Some(INTEGER_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Age,
    },
    ClassificationRule {
        pattern: r"^(sort_?order|position|display_?order|rank|seq(uence)?|ordinal|index)$",
        type_constraint: Some(INTEGER_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::SortOrder,
    },
    ClassificationRule {
        pattern: r"^(views?|view_?count|likes?|followers?|votes?|clicks?)$",
        type_constraint: Some(INTEGER_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::PositiveInt,
    },
    // === Data ===
    ClassificationRule {
        pattern: r"^(hex_?colou?r|colou?r_?hex|colou?r_?code)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::HexColor,
    },
    ClassificationRule {
        pattern: r"^(colou?r)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Color,
    },
    ClassificationRule {
        pattern: r"^(locale|lang(uage)?(_?code)?)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Locale,
    },
    ClassificationRule {
        pattern: r"^(time_?zone|tz)$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::Timezone,
    },
    ClassificationRule {
        pattern: r"^(metadata|meta|settings|preferences|config|payload|attributes|extra)$",
        type_constraint: Some(&[ScalarKind::Json, ScalarKind::String]),
        model_pattern: None,
        semantic_type: SemanticType::JsonData,
    },
    // === Catch-all: _id suffix ===
    // Must be last. Text fields ending in _id that are not relations are
    // treated as opaque external identifiers instead of random words.
    ClassificationRule {
        pattern: r"_id$",
        type_constraint: Some(TEXT_TYPES),
        model_pattern: None,
        semantic_type: SemanticType::ExternalId,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_email() {
        assert_eq!(
            classify_field("email", "User", ScalarKind::String),
            SemanticType::Email
        );
        assert_eq!(
            classify_field("contactEmail", "Store", ScalarKind::String),
            SemanticType::Email
        );
    }

    #[test]
    fn test_camel_case_first_name() {
        assert_eq!(
            classify_field("firstName", "User", ScalarKind::String),
            SemanticType::FirstName
        );
    }

    #[test]
    fn test_context_name_per_model() {
        assert_eq!(
            classify_field("name", "User", ScalarKind::String),
            SemanticType::FullName
        );
        assert_eq!(
            classify_field("name", "Company", ScalarKind::String),
            SemanticType::CompanyName
        );
        assert_eq!(
            classify_field("name", "Product", ScalarKind::String),
            SemanticType::ProductName
        );
        assert_eq!(
            classify_field("name", "Category", ScalarKind::String),
            SemanticType::Category
        );
    }

    #[test]
    fn test_title_in_user_is_job_title() {
        assert_eq!(
            classify_field("title", "Employee", ScalarKind::String),
            SemanticType::JobTitle
        );
        assert_eq!(
            classify_field("title", "Post", ScalarKind::String),
            SemanticType::Title
        );
    }

    #[test]
    fn test_temporal_names() {
        assert_eq!(
            classify_field("createdAt", "Post", ScalarKind::DateTime),
            SemanticType::CreatedAt
        );
        assert_eq!(
            classify_field("updated_at", "Post", ScalarKind::DateTime),
            SemanticType::UpdatedAt
        );
        assert_eq!(
            classify_field("lastLoginAt", "User", ScalarKind::DateTime),
            SemanticType::Timestamp
        );
    }

    #[test]
    fn test_age_on_string_should_not_match() {
        assert_eq!(
            classify_field("age", "User", ScalarKind::String),
            SemanticType::Unknown
        );
        assert_eq!(
            classify_field("age", "User", ScalarKind::Int),
            SemanticType::Age
        );
    }

    #[test]
    fn test_type_fallbacks() {
        assert_eq!(
            classify_field("payloadBlob", "Event", ScalarKind::Bytes),
            SemanticType::Bytes
        );
        assert_eq!(
            classify_field("flag", "Event", ScalarKind::Boolean),
            SemanticType::BooleanFlag
        );
        assert_eq!(
            classify_field("whatever", "Event", ScalarKind::Float),
            SemanticType::Decimal
        );
    }

    #[test]
    fn test_external_id_catch_all() {
        assert_eq!(
            classify_field("stripe_id", "Customer", ScalarKind::String),
            SemanticType::ExternalId
        );
    }

    #[test]
    fn test_custom_scalar_table() {
        assert_eq!(classify_custom_scalar("Email"), Some(SemanticType::Email));
        assert_eq!(classify_custom_scalar("HexColorCode"), Some(SemanticType::HexColor));
        assert_eq!(classify_custom_scalar("PositiveInt"), Some(SemanticType::PositiveInt));
        // Basic scalars never count as custom.
        assert_eq!(classify_custom_scalar("DateTime"), None);
        assert_eq!(classify_custom_scalar("String"), None);
        assert_eq!(classify_custom_scalar("Money2"), None);
    }

    #[test]
    fn test_format_hints() {
        assert_eq!(classify_format("email"), Some(SemanticType::Email));
        assert_eq!(classify_format("date-time"), Some(SemanticType::Timestamp));
        assert_eq!(classify_format("UUID"), Some(SemanticType::Uuid));
        assert_eq!(classify_format("currency-ish"), None);
    }

    #[test]
    fn test_normalize_camel_case() {
        assert_eq!(normalize_field_name("firstName"), "first_name");
        assert_eq!(normalize_field_name("createdAt"), "created_at");
        assert_eq!(normalize_field_name("already_snake"), "already_snake");
        assert_eq!(normalize_field_name("kebab-case"), "kebab_case");
        assert_eq!(normalize_field_name("ID"), "id");
    }
}
