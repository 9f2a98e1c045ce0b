use serde::{Deserialize, Serialize};
use std::fmt;

/// What a field's values mean, independent of how they are stored.
///
/// Every value the field resolver produces goes through one of these; the
/// classification rules decide which one applies to a given field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    // Identity
    FirstName,
    LastName,
    FullName,
    Username,

    // Contact
    Email,
    Phone,

    // Address
    StreetAddress,
    City,
    State,
    ZipCode,
    Country,
    CountryCode,
    Latitude,
    Longitude,

    // Company
    CompanyName,
    JobTitle,
    Department,

    // Internet
    Url,
    DomainName,
    IpAddress,
    MacAddress,
    UserAgent,
    Slug,

    // Content
    Title,
    ProductName,
    Description,
    Bio,
    Paragraph,
    Sentence,

    // Media
    ImageUrl,
    AvatarUrl,
    FileName,
    MimeType,

    // Financial
    Price,
    Currency,
    Percentage,

    // Temporal
    CreatedAt,
    UpdatedAt,
    DeletedAt,
    StartDate,
    EndDate,
    BirthDate,
    Timestamp,
    DateOnly,
    TimeOnly,

    // Security
    PasswordHash,
    Token,

    // Identifiers
    Uuid,
    ExternalId,
    Sku,
    OrderNumber,

    // Status
    Status,
    Role,
    Priority,
    Category,
    Tag,
    BooleanFlag,

    // Numeric
    Quantity,
    Rating,
    Age,
    SortOrder,
    PositiveInt,
    Integer,
    Decimal,

    // Data
    Color,
    HexColor,
    Locale,
    Timezone,
    JsonData,
    Bytes,

    /// No rule matched and the type gave no hint.
    Unknown,
}

impl SemanticType {
    /// Temporal kinds produce `Timestamp`/`Date` values.
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            SemanticType::CreatedAt
                | SemanticType::UpdatedAt
                | SemanticType::DeletedAt
                | SemanticType::StartDate
                | SemanticType::EndDate
                | SemanticType::BirthDate
                | SemanticType::Timestamp
                | SemanticType::DateOnly
        )
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Debug names are already the readable CamelCase identifiers.
        write!(f, "{:?}", self)
    }
}
