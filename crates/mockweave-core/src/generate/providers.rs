use chrono::{Duration as ChronoDuration, NaiveDateTime};
use fake::faker::address::en::*;
use fake::faker::company::en::*;
use fake::faker::internet::en::*;
use fake::faker::lorem::en::*;
use fake::faker::name::en::*;
use fake::faker::phone_number::en::*;
use fake::Fake;
use rand::Rng;
use uuid::Uuid;

use crate::classify::semantic::SemanticType;
use crate::generate::value::Value;

/// Generate a value for a given semantic type.
///
/// `base_time` anchors every temporal value so that a seeded run with the
/// same anchor reproduces the same timestamps.
pub fn generate_value(
    semantic_type: SemanticType,
    rng: &mut impl Rng,
    record_index: usize,
    base_time: NaiveDateTime,
) -> Value {
    match semantic_type {
        // === Identity ===
        SemanticType::FirstName => Value::owned(FirstName().fake_with_rng::<String, _>(rng)),
        SemanticType::LastName => Value::owned(LastName().fake_with_rng::<String, _>(rng)),
        SemanticType::FullName => Value::owned(Name().fake_with_rng::<String, _>(rng)),
        SemanticType::Username => {
            let user: String = Username().fake_with_rng(rng);
            Value::owned(format!("{}{}", user, record_index))
        }

        // === Contact ===
        SemanticType::Email => {
            let email: String = SafeEmail().fake_with_rng(rng);
            match email.split_once('@') {
                Some((local, domain)) => {
                    Value::owned(format!("{}.{}@{}", local, record_index, domain))
                }
                None => Value::owned(format!("user{}@example.com", record_index)),
            }
        }
        SemanticType::Phone => Value::owned(PhoneNumber().fake_with_rng::<String, _>(rng)),

        // === Address ===
        SemanticType::StreetAddress => {
            let number = rng.random_range(1..9999);
            let street: String = StreetName().fake_with_rng(rng);
            Value::owned(format!("{} {}", number, street))
        }
        SemanticType::City => Value::owned(CityName().fake_with_rng::<String, _>(rng)),
        SemanticType::State => Value::owned(StateName().fake_with_rng::<String, _>(rng)),
        SemanticType::ZipCode => Value::owned(ZipCode().fake_with_rng::<String, _>(rng)),
        SemanticType::Country => Value::owned(CountryName().fake_with_rng::<String, _>(rng)),
        SemanticType::CountryCode => Value::owned(CountryCode().fake_with_rng::<String, _>(rng)),
        SemanticType::Latitude => Value::Float(round_to(rng.random_range(-90.0..=90.0), 6)),
        SemanticType::Longitude => Value::Float(round_to(rng.random_range(-180.0..=180.0), 6)),

        // === Company ===
        SemanticType::CompanyName => Value::owned(CompanyName().fake_with_rng::<String, _>(rng)),
        SemanticType::JobTitle => Value::owned(Profession().fake_with_rng::<String, _>(rng)),
        SemanticType::Department => {
            let depts = [
                "Engineering",
                "Sales",
                "Marketing",
                "Product",
                "Design",
                "HR",
                "Finance",
                "Legal",
                "Operations",
                "Support",
            ];
            Value::borrowed(depts[rng.random_range(0..depts.len())])
        }

        // === Internet ===
        SemanticType::Url => {
            let domain: String = DomainSuffix().fake_with_rng(rng);
            Value::owned(format!("https://example-{}.{}", record_index, domain))
        }
        SemanticType::DomainName => {
            let word: String = Word().fake_with_rng(rng);
            let suffix: String = DomainSuffix().fake_with_rng(rng);
            Value::owned(format!("{}{}.{}", word, record_index, suffix))
        }
        SemanticType::IpAddress => Value::owned(IPv4().fake_with_rng::<String, _>(rng)),
        SemanticType::MacAddress => Value::owned(MACAddress().fake_with_rng::<String, _>(rng)),
        SemanticType::UserAgent => Value::owned(UserAgent().fake_with_rng::<String, _>(rng)),
        SemanticType::Slug => {
            let words: Vec<String> = Words(2..4).fake_with_rng(rng);
            Value::owned(format!("{}-{}", words.join("-"), record_index))
        }

        // === Content ===
        SemanticType::Title => {
            let words: Vec<String> = Words(3..8).fake_with_rng(rng);
            Value::owned(capitalize(&words.join(" ")))
        }
        SemanticType::ProductName => {
            let words: Vec<String> = Words(1..3).fake_with_rng(rng);
            let title: Vec<String> = words.iter().map(|w| capitalize(w)).collect();
            Value::owned(title.join(" "))
        }
        SemanticType::Description => {
            let sentences: Vec<String> = Sentences(2..4).fake_with_rng(rng);
            Value::owned(sentences.join(" "))
        }
        SemanticType::Bio => {
            let sentences: Vec<String> = Sentences(1..3).fake_with_rng(rng);
            Value::owned(sentences.join(" "))
        }
        SemanticType::Paragraph => {
            let paragraphs: Vec<String> = Paragraphs(1..3).fake_with_rng(rng);
            Value::owned(paragraphs.join("\n\n"))
        }
        SemanticType::Sentence => Value::owned(Sentence(5..12).fake_with_rng::<String, _>(rng)),

        // === Media ===
        SemanticType::ImageUrl => Value::owned(format!(
            "https://picsum.photos/seed/{}/800/600",
            record_index
        )),
        SemanticType::AvatarUrl => Value::owned(format!(
            "https://api.dicebear.com/7.x/avataaars/svg?seed={}",
            record_index
        )),
        SemanticType::FileName => {
            let words: Vec<String> = Words(1..3).fake_with_rng(rng);
            let exts = ["pdf", "docx", "xlsx", "png", "jpg", "csv", "txt"];
            Value::owned(format!(
                "{}.{}",
                words.join("_"),
                exts[rng.random_range(0..exts.len())]
            ))
        }
        SemanticType::MimeType => {
            let types = [
                "application/pdf",
                "image/png",
                "image/jpeg",
                "text/plain",
                "application/json",
                "text/html",
            ];
            Value::borrowed(types[rng.random_range(0..types.len())])
        }

        // === Financial ===
        SemanticType::Price => Value::Float(round_to(rng.random_range(0.01..=999.99), 2)),
        SemanticType::Currency => {
            let currencies = ["USD", "EUR", "GBP", "JPY", "CAD", "AUD", "CHF"];
            Value::borrowed(currencies[rng.random_range(0..currencies.len())])
        }
        SemanticType::Percentage => Value::Float(round_to(rng.random_range(0.0..100.0), 2)),

        // === Temporal ===
        SemanticType::CreatedAt | SemanticType::Timestamp => {
            let days_ago = rng.random_range(1..365);
            let hours = rng.random_range(0..24);
            let minutes = rng.random_range(0..60);
            Value::Timestamp(
                base_time - ChronoDuration::days(days_ago)
                    + ChronoDuration::hours(hours)
                    + ChronoDuration::minutes(minutes),
            )
        }
        SemanticType::UpdatedAt => {
            let days_ago = rng.random_range(0..30);
            Value::Timestamp(base_time - ChronoDuration::days(days_ago))
        }
        SemanticType::DeletedAt => {
            let days_ago = rng.random_range(0..7);
            Value::Timestamp(base_time - ChronoDuration::days(days_ago))
        }
        SemanticType::StartDate => {
            let days_from_now = rng.random_range(-30..90);
            Value::Timestamp(base_time + ChronoDuration::days(days_from_now))
        }
        SemanticType::EndDate => {
            let days_from_now = rng.random_range(30..180);
            Value::Timestamp(base_time + ChronoDuration::days(days_from_now))
        }
        SemanticType::BirthDate => {
            let years_ago = rng.random_range(18..80);
            let days_extra = rng.random_range(0..365);
            Value::Date(base_time.date() - ChronoDuration::days(years_ago * 365 + days_extra))
        }
        SemanticType::DateOnly => {
            let days_offset = rng.random_range(-365..365);
            Value::Date(base_time.date() + ChronoDuration::days(days_offset))
        }
        SemanticType::TimeOnly => Value::owned(format!(
            "{:02}:{:02}:{:02}",
            rng.random_range(0..24),
            rng.random_range(0..60),
            rng.random_range(0..60)
        )),

        // === Security ===
        SemanticType::PasswordHash => Value::owned(format!(
            "$2b$12${}",
            random_alphanumeric(rng, 53)
        )),
        SemanticType::Token => Value::owned(random_alphanumeric(rng, 32)),

        // === Identifiers ===
        SemanticType::Uuid => Value::Uuid(random_uuid(rng)),
        SemanticType::ExternalId => {
            Value::owned(format!("ext_{}", random_alphanumeric(rng, 12)))
        }
        SemanticType::Sku => Value::owned(format!("SKU-{:06}", record_index + 1)),
        SemanticType::OrderNumber => Value::owned(format!("ORD-{:08}", record_index + 1)),

        // === Status ===
        SemanticType::Status => {
            let statuses = ["active", "inactive", "pending", "suspended"];
            Value::borrowed(statuses[rng.random_range(0..statuses.len())])
        }
        SemanticType::Role => {
            let roles = ["admin", "user", "moderator", "editor", "viewer"];
            Value::borrowed(roles[rng.random_range(0..roles.len())])
        }
        SemanticType::Priority => {
            let priorities = ["low", "medium", "high", "critical"];
            Value::borrowed(priorities[rng.random_range(0..priorities.len())])
        }
        SemanticType::Category => {
            let word: String = Word().fake_with_rng(rng);
            Value::owned(capitalize(&word))
        }
        SemanticType::Tag => {
            let words: Vec<String> = Words(1..3).fake_with_rng(rng);
            Value::owned(words.join("-"))
        }
        SemanticType::BooleanFlag => Value::Bool(rng.random_bool(0.7)),

        // === Numeric ===
        SemanticType::Quantity => Value::Int(rng.random_range(1..=100)),
        SemanticType::Rating => Value::Float(round_to(rng.random_range(1.0..5.0), 1)),
        SemanticType::Age => Value::Int(rng.random_range(18..90)),
        SemanticType::SortOrder => Value::Int(record_index as i64),
        SemanticType::PositiveInt => Value::Int(rng.random_range(1..=10_000)),
        SemanticType::Integer => Value::Int(rng.random_range(0..=1_000)),
        SemanticType::Decimal => Value::Float(round_to(rng.random_range(0.0..1_000.0), 2)),

        // === Data ===
        SemanticType::Color => {
            let colors = [
                "red", "blue", "green", "yellow", "purple", "orange", "pink", "black", "white",
                "gray", "brown", "teal",
            ];
            Value::borrowed(colors[rng.random_range(0..colors.len())])
        }
        SemanticType::HexColor => Value::owned(format!(
            "#{:02x}{:02x}{:02x}",
            rng.random_range(0..=255u8),
            rng.random_range(0..=255u8),
            rng.random_range(0..=255u8)
        )),
        SemanticType::Locale => {
            let locales = [
                "en_US", "en_GB", "de_DE", "fr_FR", "es_ES", "ja_JP", "zh_CN", "pt_BR",
            ];
            Value::borrowed(locales[rng.random_range(0..locales.len())])
        }
        SemanticType::Timezone => {
            let tzs = [
                "America/New_York",
                "America/Chicago",
                "America/Los_Angeles",
                "Europe/London",
                "Europe/Berlin",
                "Asia/Tokyo",
                "Australia/Sydney",
            ];
            Value::borrowed(tzs[rng.random_range(0..tzs.len())])
        }
        SemanticType::JsonData => {
            let keys = ["metadata", "preferences", "flags", "settings"];
            let key = keys[rng.random_range(0..keys.len())];
            Value::Json(serde_json::json!({
                key: random_alphanumeric(rng, 8),
                "enabled": rng.random_bool(0.8),
                "version": rng.random_range(1u32..5u32)
            }))
        }
        SemanticType::Bytes => {
            let len = rng.random_range(8..32);
            Value::Bytes((0..len).map(|_| rng.random::<u8>()).collect())
        }

        // === Catch-all ===
        SemanticType::Unknown => Value::owned(Word().fake_with_rng::<String, _>(rng)),
    }
}

/// A version-4 UUID drawn from `rng`, so seeded runs reproduce it.
pub fn random_uuid(rng: &mut impl Rng) -> Uuid {
    uuid::Builder::from_random_bytes(rng.random()).into_uuid()
}

pub fn random_alphanumeric(rng: &mut impl Rng, len: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    (0..len)
        .map(|_| CHARS[rng.random_range(0..CHARS.len())] as char)
        .collect()
}

/// Lowercase, ASCII-alphanumeric words joined by single dashes.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_base_time() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_generate_email() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_value(SemanticType::Email, &mut rng, 3, test_base_time());
        let email = value.as_str().unwrap();
        assert!(email.contains('@'));
        assert!(email.contains(".3@"));
    }

    #[test]
    fn test_generate_uuid_is_seeded() {
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let a = random_uuid(&mut rng1);
        let b = random_uuid(&mut rng2);
        assert_eq!(a, b);
        assert_eq!(a.get_version_num(), 4);
    }

    #[test]
    fn test_generate_boolean() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_value(SemanticType::BooleanFlag, &mut rng, 0, test_base_time());
        assert!(matches!(value, Value::Bool(_)));
    }

    #[test]
    fn test_temporal_determinism() {
        let bt = test_base_time();
        let mut rng1 = StdRng::seed_from_u64(99);
        let mut rng2 = StdRng::seed_from_u64(99);

        let v1 = generate_value(SemanticType::CreatedAt, &mut rng1, 0, bt);
        let v2 = generate_value(SemanticType::CreatedAt, &mut rng2, 0, bt);
        assert_eq!(v1, v2);
        assert!(v1.as_timestamp().unwrap() < bt);
    }

    #[test]
    fn test_json_data_is_object() {
        let mut rng = StdRng::seed_from_u64(42);
        let value = generate_value(SemanticType::JsonData, &mut rng, 0, test_base_time());
        match value {
            Value::Json(j) => assert!(j.as_object().is_some_and(|o| o.len() >= 2)),
            other => panic!("Expected Json variant, got {:?}", other),
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!  Again"), "hello-world-again");
        assert_eq!(slugify("--"), "");
    }
}
