//! Line formats for the flat text files.
//!
//! ```text
//! usuarios.txt   <id>,<name>
//! recursos.txt   <TYPE>,<id>,<title>,<extra>      TYPE = LIBRO | REVISTA | DVD
//! prestamos.txt  <resource_id>,<user_id>,<loaned_at>,<returned_at or empty>
//! ```
//!
//! Fields are split on commas with a fixed maximum count, so only the last
//! field may contain commas. Nothing is escaped: a comma inside an id or a
//! title shifts the fields and the row no longer reads back.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Loan, Resource, ResourceKind, ResourceType, User};

pub const TAG_BOOK: &str = "LIBRO";
pub const TAG_MAGAZINE: &str = "REVISTA";
pub const TAG_DVD: &str = "DVD";

const USER_FIELDS: usize = 2;
const RESOURCE_FIELDS: usize = 4;
const LOAN_FIELDS: usize = 4;

/// Why a persisted line could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("unknown resource type '{0}'")]
    UnknownType(String),

    #[error("line is not valid UTF-8")]
    InvalidEncoding,

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("invalid date '{0}'")]
    InvalidDate(String),

    #[error("stray line break in {0}")]
    LineBreak(&'static str),

    #[error("duplicate id '{0}'")]
    DuplicateId(String),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("resource '{0}' already has an open loan or is not available")]
    StateConflict(String),
}

impl RecordError {
    /// Numeric fields of magazines and DVDs that failed to parse
    pub fn is_invalid_number(&self) -> bool {
        matches!(self, Self::InvalidNumber(_))
    }
}

/// File tag for a resource type (always upper case)
pub fn type_tag(resource_type: ResourceType) -> &'static str {
    match resource_type {
        ResourceType::Book => TAG_BOOK,
        ResourceType::Magazine => TAG_MAGAZINE,
        ResourceType::Dvd => TAG_DVD,
    }
}

/// Parse a file tag, ignoring case
pub fn parse_type_tag(tag: &str) -> Result<ResourceType, RecordError> {
    match tag.to_uppercase().as_str() {
        TAG_BOOK => Ok(ResourceType::Book),
        TAG_MAGAZINE => Ok(ResourceType::Magazine),
        TAG_DVD => Ok(ResourceType::Dvd),
        _ => Err(RecordError::UnknownType(tag.to_string())),
    }
}

fn split_fields(line: &str, expected: usize) -> Result<Vec<&str>, RecordError> {
    let parts: Vec<&str> = line.splitn(expected, ',').collect();
    if parts.len() < expected {
        return Err(RecordError::FieldCount {
            expected,
            found: parts.len(),
        });
    }
    Ok(parts)
}

fn parse_number(text: &str) -> Result<i32, RecordError> {
    text.parse()
        .map_err(|_| RecordError::InvalidNumber(text.to_string()))
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, RecordError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| RecordError::InvalidDate(text.to_string()))
}

pub fn format_user(user: &User) -> String {
    format!("{},{}", user.id, user.name)
}

/// Parse `id,name`; the name is the rest of the line
pub fn parse_user(line: &str) -> Result<User, RecordError> {
    let fields = split_fields(line, USER_FIELDS)?;
    Ok(User::new(fields[0], fields[1]))
}

pub fn format_resource(resource: &Resource) -> String {
    let extra = match resource.kind() {
        ResourceKind::Book { author } => author.clone(),
        ResourceKind::Magazine { issue_number } => issue_number.to_string(),
        ResourceKind::Dvd { duration_minutes } => duration_minutes.to_string(),
    };
    format!(
        "{},{},{},{}",
        type_tag(resource.resource_type()),
        resource.id(),
        resource.title(),
        extra
    )
}

/// Parse `TYPE,id,title,extra` into a fresh, available resource
pub fn parse_resource(line: &str) -> Result<Resource, RecordError> {
    let fields = split_fields(line, RESOURCE_FIELDS)?;
    let (id, title, extra) = (fields[1], fields[2], fields[3]);

    let resource = match parse_type_tag(fields[0])? {
        ResourceType::Book => Resource::book(id, title, extra),
        ResourceType::Magazine => Resource::magazine(id, title, parse_number(extra)?),
        ResourceType::Dvd => Resource::dvd(id, title, parse_number(extra)?),
    };
    Ok(resource)
}

pub fn format_loan(loan: &Loan) -> String {
    let returned = loan
        .returned_at
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default();
    format!(
        "{},{},{},{}",
        loan.resource_id,
        loan.user_id,
        loan.loaned_at.to_rfc3339(),
        returned
    )
}

/// Parse `resource_id,user_id,loaned_at,returned_at`; empty `returned_at` means open
pub fn parse_loan(line: &str) -> Result<Loan, RecordError> {
    let fields = split_fields(line, LOAN_FIELDS)?;

    let mut loan = Loan::at(fields[0], fields[1], parse_timestamp(fields[2])?);
    let returned = fields[3].trim();
    if !returned.is_empty() {
        loan.mark_returned_at(parse_timestamp(returned)?);
    }
    Ok(loan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResourceState;

    #[test]
    fn test_parse_user_name_keeps_commas() {
        let user = parse_user("u1,Lovelace, Ada").unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.name, "Lovelace, Ada");
    }

    #[test]
    fn test_parse_user_missing_name() {
        assert_eq!(
            parse_user("u1").unwrap_err(),
            RecordError::FieldCount {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_parse_resource_variants() {
        let book = parse_resource("LIBRO,b1,Dune,Herbert").unwrap();
        assert_eq!(book, Resource::book("b1", "Dune", "Herbert"));

        let magazine = parse_resource("revista,m1,Wired,42").unwrap();
        assert_eq!(magazine, Resource::magazine("m1", "Wired", 42));

        let dvd = parse_resource("Dvd,d1,Alien,117").unwrap();
        assert_eq!(dvd, Resource::dvd("d1", "Alien", 117));
        assert_eq!(dvd.state(), ResourceState::Available);
    }

    #[test]
    fn test_parse_resource_author_is_rest_of_line() {
        let book = parse_resource("LIBRO,b2,Good Omens,Pratchett, Gaiman").unwrap();
        assert_eq!(
            book.kind(),
            &ResourceKind::Book {
                author: "Pratchett, Gaiman".to_string()
            }
        );
    }

    #[test]
    fn test_parse_resource_invalid_number() {
        let err = parse_resource("REVISTA,m1,Wired,notanumber").unwrap_err();
        assert!(err.is_invalid_number());
        assert_eq!(err, RecordError::InvalidNumber("notanumber".to_string()));
    }

    #[test]
    fn test_parse_resource_errors() {
        assert!(matches!(
            parse_resource("LIBRO,b1,Dune").unwrap_err(),
            RecordError::FieldCount { found: 3, .. }
        ));
        assert_eq!(
            parse_resource("VINYL,v1,Abbey Road,47").unwrap_err(),
            RecordError::UnknownType("VINYL".to_string())
        );
    }

    #[test]
    fn test_format_resource_uses_upper_tags() {
        assert_eq!(
            format_resource(&Resource::magazine("m1", "Wired", 42)),
            "REVISTA,m1,Wired,42"
        );
        assert_eq!(format_resource(&Resource::dvd("d1", "Alien", 117)), "DVD,d1,Alien,117");
        assert_eq!(
            format_resource(&Resource::book("b1", "Dune", "Herbert")),
            "LIBRO,b1,Dune,Herbert"
        );
    }

    #[test]
    fn test_loan_line() {
        let open = parse_loan("b1,u1,2024-03-01T10:00:00+00:00,").unwrap();
        assert!(!open.is_returned());
        assert_eq!(format_loan(&open), "b1,u1,2024-03-01T10:00:00+00:00,");

        let closed =
            parse_loan("b1,u1,2024-03-01T10:00:00+00:00,2024-03-05T09:30:00+00:00").unwrap();
        assert!(closed.is_returned());

        assert_eq!(
            parse_loan("b1,u1,yesterday,").unwrap_err(),
            RecordError::InvalidDate("yesterday".to_string())
        );
    }
}
